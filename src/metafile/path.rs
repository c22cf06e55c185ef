/// 元数据路径解析
///
/// 从约定格式的游戏路径中还原物品类别、槽位、数字 ID 以及同目录的 IMC 路径。
///
/// 支持两种路径形态（按顺序尝试，第一个匹配生效）：
/// - 角色相关：`chara/<类型>/<代码><ID>[/obj/<子类型>/<代码><ID>]/..._<槽位>.meta`
/// - 房屋：`bgcommon/hou/<类型>/general/<ID>/....meta`
use regex::{Captures, Regex};
use serde::Serialize;
use std::sync::OnceLock;

use crate::utils::MetaError;

/// 物品类别
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum ItemType {
    #[default]
    Invalid,
    Equipment,
    Accessory,
    Housing,
}

/// 骨骼覆盖表类别
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum EstType {
    #[default]
    Invalid,
    Face,
    Hair,
    Head,
    Body,
}

/// 路径形态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathShape {
    Character,
    Housing,
}

/// 从路径中解析出的身份信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PathIdentity {
    pub item_type: ItemType,
    pub est_type: EstType,
    /// 小写的主类型（如 "equipment", "human"）
    pub primary_type: String,
    /// 小写的子类型（如 "hair"），没有时为空
    pub secondary_type: String,
    pub primary_id: u16,
    pub secondary_id: u16,
    pub slot_index: usize,
    pub eqp_entry_size: usize,
    pub eqp_entry_offset: usize,
    /// 同目录下的 IMC 路径；房屋路径没有对应的 IMC，为空
    pub target_imc_path: String,
}

impl PathIdentity {
    /// 主类型是否为装备或饰品（与槽位是否识别无关）
    pub fn is_gear_category(&self) -> bool {
        matches!(self.primary_type.as_str(), "equipment" | "accessory")
    }
}

/// 槽位映射表行
struct SlotInfo {
    slot: &'static str,
    item_type: ItemType,
    slot_index: usize,
    eqp_entry_size: usize,
    eqp_entry_offset: usize,
    est_type: EstType,
}

const fn slot(
    slot: &'static str,
    item_type: ItemType,
    slot_index: usize,
    eqp: (usize, usize),
    est_type: EstType,
) -> SlotInfo {
    SlotInfo {
        slot,
        item_type,
        slot_index,
        eqp_entry_size: eqp.0,
        eqp_entry_offset: eqp.1,
        est_type,
    }
}

/// 槽位后缀 → (类别, 槽位序号, EQP (大小, 偏移), 骨骼表)
const SLOTS: &[SlotInfo] = &[
    slot("met", ItemType::Equipment, 0, (3, 5), EstType::Head),
    slot("top", ItemType::Equipment, 1, (2, 0), EstType::Body),
    slot("glv", ItemType::Equipment, 2, (1, 3), EstType::Invalid),
    slot("dwn", ItemType::Equipment, 3, (1, 2), EstType::Invalid),
    slot("sho", ItemType::Equipment, 4, (1, 4), EstType::Invalid),
    slot("ear", ItemType::Accessory, 0, (0, 0), EstType::Invalid),
    slot("nek", ItemType::Accessory, 1, (0, 0), EstType::Invalid),
    slot("wrs", ItemType::Accessory, 2, (0, 0), EstType::Invalid),
    slot("rir", ItemType::Accessory, 3, (0, 0), EstType::Invalid),
    slot("ril", ItemType::Accessory, 4, (0, 0), EstType::Invalid),
];

fn character_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // prefix 一直捕获到文件所在目录（含末尾斜杠）
        Regex::new(concat!(
            r"(?i)^(?P<prefix>chara",
            r"/(?P<primary_type>[a-z]+)",
            r"/(?P<primary_code>[a-z])(?P<primary_id>[0-9]+)",
            r"(?:/obj/(?P<secondary_type>[a-z]+)/(?P<secondary_code>[a-z])(?P<secondary_id>[0-9]+))?",
            r"/(?:.*/)?)",
            r"[^/]*?(?:_(?P<slot>[a-z]{3}))?\.meta$",
        ))
        .expect("character meta path pattern is valid")
    })
}

fn housing_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"(?i)^(?P<prefix>bgcommon/hou",
            r"/(?P<primary_type>[a-z]+)",
            r"/general/(?P<primary_id>[0-9]+)/)",
            r".*\.meta$",
        ))
        .expect("housing meta path pattern is valid")
    })
}

/// 按名称取捕获组，不存在时为空字符串
fn group<'t>(caps: &Captures<'t>, name: &str) -> &'t str {
    caps.name(name).map(|m| m.as_str()).unwrap_or("")
}

fn parse_id(text: &str) -> Result<u16, MetaError> {
    if text.is_empty() {
        return Ok(0);
    }
    text.parse::<u16>()
        .map_err(|_| MetaError::format(format!("id out of range: {}", text)))
}

/// 由角色路径的捕获组构造 IMC 路径：有子组件时使用子组件的代码和 ID
fn imc_path(caps: &Captures<'_>) -> String {
    let (code, id) = if caps.name("secondary_id").is_some() {
        (group(caps, "secondary_code"), group(caps, "secondary_id"))
    } else {
        (group(caps, "primary_code"), group(caps, "primary_id"))
    };
    format!("{}{}{}.imc", group(caps, "prefix"), code, id)
}

/// 解析目标路径
///
/// # 错误
/// 两种形态都不匹配时返回 `MetaError::Format("unsupported meta file")`
pub fn parse_target_path(path: &str) -> Result<PathIdentity, MetaError> {
    let patterns = [
        (PathShape::Character, character_pattern()),
        (PathShape::Housing, housing_pattern()),
    ];

    let (shape, caps) = patterns
        .iter()
        .find_map(|(shape, pattern)| pattern.captures(path).map(|caps| (*shape, caps)))
        .ok_or_else(|| MetaError::format(format!("unsupported meta file: {}", path)))?;

    let mut identity = PathIdentity {
        primary_type: group(&caps, "primary_type").to_lowercase(),
        secondary_type: group(&caps, "secondary_type").to_lowercase(),
        primary_id: parse_id(group(&caps, "primary_id"))?,
        secondary_id: parse_id(group(&caps, "secondary_id"))?,
        ..Default::default()
    };

    match shape {
        PathShape::Character => {
            identity.target_imc_path = imc_path(&caps);

            match identity.primary_type.as_str() {
                "equipment" | "accessory" => {
                    let slot = group(&caps, "slot").to_lowercase();
                    if let Some(info) = SLOTS.iter().find(|info| info.slot == slot) {
                        identity.item_type = info.item_type;
                        identity.slot_index = info.slot_index;
                        identity.eqp_entry_size = info.eqp_entry_size;
                        identity.eqp_entry_offset = info.eqp_entry_offset;
                        identity.est_type = info.est_type;
                    }
                }
                "human" => {
                    identity.est_type = match identity.secondary_type.as_str() {
                        "hair" => EstType::Hair,
                        "face" => EstType::Face,
                        _ => EstType::Invalid,
                    };
                }
                _ => {}
            }
        }
        PathShape::Housing => {
            identity.item_type = ItemType::Housing;
        }
    }

    Ok(identity)
}

/// 由嵌入的来源路径推导来源 IMC 路径（只接受角色形态）
pub fn parse_source_imc_path(path: &str) -> Result<String, MetaError> {
    character_pattern()
        .captures(path)
        .map(|caps| imc_path(&caps))
        .ok_or_else(|| MetaError::format(format!("unsupported source path in meta file: {}", path)))
}
