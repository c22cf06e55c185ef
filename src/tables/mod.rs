/// 目标表抽象层
///
/// 元数据补丁修改的是游戏的派生数据表（IMC、EQDP、EQP、GMP、EST）。
/// 这些表的完整二进制格式不在本库范围内，本模块只定义补丁引擎需要的窄接口，
/// 调用方负责按路径定位、加载和保存实际的表。
///
/// # 架构设计
///
/// - **VariantTable**: IMC 变体表（扩容 + 按索引写入）
/// - **DeformerTable**: EQDP 变形器表（每个 ID 一个位打包值）
/// - **ParameterTable**: EQP/GMP 参数表（每个 ID 一个 8 字节条目）
/// - **SkeletonTable**: EST 骨骼覆盖表（整表读取 / 整表替换）
/// - **memory**: 以上接口的内存实现，可用于测试
mod memory;

use serde::Serialize;
use std::collections::BTreeMap;

use crate::metafile::{EstType, ImcEntry, ItemType};

pub use memory::{
    MemoryDeformerTable, MemoryParameterTable, MemorySkeletonTable, MemoryTargets,
    MemoryVariantTable,
};

/// 装备参数表路径
pub const EQP_PATH: &str = "chara/xls/equipmentparameter/equipmentparameter.eqp";

/// 机关参数表路径
pub const GMP_PATH: &str = "chara/xls/equipmentparameter/gimmickparameter.gmp";

/// 参数表条目大小
pub const PARAMETER_ENTRY_SIZE: usize = 8;

/// 获取变形器表路径
///
/// 只有装备和饰品有变形器表，其他类别返回 None。
pub fn eqdp_path(item_type: ItemType, race_code: u32) -> Option<String> {
    match item_type {
        ItemType::Equipment => Some(format!(
            "chara/xls/charadb/equipmentdeformerparameter/c{:04}.eqdp",
            race_code
        )),
        ItemType::Accessory => Some(format!(
            "chara/xls/charadb/accessorydeformerparameter/c{:04}.eqdp",
            race_code
        )),
        ItemType::Invalid | ItemType::Housing => None,
    }
}

/// 获取骨骼覆盖表路径
pub fn est_path(est_type: EstType) -> Option<&'static str> {
    match est_type {
        EstType::Face => Some("chara/xls/charadb/faceskeletontemplate.est"),
        EstType::Hair => Some("chara/xls/charadb/hairskeletontemplate.est"),
        EstType::Head => Some("chara/xls/charadb/extra_met.est"),
        EstType::Body => Some("chara/xls/charadb/extra_top.est"),
        EstType::Invalid => None,
    }
}

/// IMC 表的组织方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ImcKind {
    #[default]
    Unknown,
    /// 每组 5 个槽位（装备、饰品）
    Set,
    /// 每组 1 个条目
    NonSet,
}

impl ImcKind {
    /// 每个逻辑组包含的条目数
    pub fn entries_per_set(&self) -> usize {
        match self {
            ImcKind::Set => 5,
            ImcKind::Unknown | ImcKind::NonSet => 1,
        }
    }
}

/// IMC 变体表
///
/// 逻辑组数不包含第 0 组（基础组），因此条目总数为 `(set_count + 1) * entries_per_set`。
pub trait VariantTable {
    fn kind(&self) -> ImcKind;

    fn set_kind(&mut self, kind: ImcKind);

    /// 逻辑组数（不含基础组）
    fn set_count(&self) -> usize;

    /// 调整逻辑组数
    fn resize(&mut self, set_count: usize);

    fn entries_per_set(&self) -> usize {
        self.kind().entries_per_set()
    }

    /// 写入第 `index` 个条目（按组展开后的线性索引）
    fn set_entry(&mut self, index: usize, entry: ImcEntry);
}

/// EQDP 变形器表：每个装备 ID 一个 16 位值，每个槽位占 2 位
pub trait DeformerTable {
    fn get(&self, set_id: u16) -> u16;

    fn set(&mut self, set_id: u16, value: u16);
}

/// EQP/GMP 参数表：每个装备 ID 一个 8 字节条目
pub trait ParameterTable {
    fn entry_mut(&mut self, set_id: u16) -> &mut [u8; PARAMETER_ENTRY_SIZE];
}

/// EST 表的键
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct EstKey {
    pub set_id: u16,
    pub race_code: u16,
}

/// EST 骨骼覆盖表：(SetId, RaceCode) -> SkelId
///
/// 只支持整表读取和整表替换。
pub trait SkeletonTable {
    fn entries(&self) -> BTreeMap<EstKey, u16>;

    fn replace_entries(&mut self, entries: BTreeMap<EstKey, u16>);
}

/// 按路径获取（不存在时创建）目标表
///
/// 补丁引擎只通过该接口访问目标表，从不自行加载或保存。
pub trait MetaTargets {
    fn variant_table(&mut self, path: &str) -> &mut dyn VariantTable;

    fn deformer_table(&mut self, path: &str) -> &mut dyn DeformerTable;

    fn parameter_table(&mut self, path: &str) -> &mut dyn ParameterTable;

    fn skeleton_table(&mut self, path: &str) -> &mut dyn SkeletonTable;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eqdp_path() {
        assert_eq!(
            eqdp_path(ItemType::Equipment, 101).as_deref(),
            Some("chara/xls/charadb/equipmentdeformerparameter/c0101.eqdp")
        );
        assert_eq!(
            eqdp_path(ItemType::Accessory, 1801).as_deref(),
            Some("chara/xls/charadb/accessorydeformerparameter/c1801.eqdp")
        );
        assert_eq!(eqdp_path(ItemType::Housing, 101), None);
        assert_eq!(eqdp_path(ItemType::Invalid, 101), None);
    }

    #[test]
    fn test_est_path() {
        assert_eq!(est_path(EstType::Head), Some("chara/xls/charadb/extra_met.est"));
        assert_eq!(est_path(EstType::Body), Some("chara/xls/charadb/extra_top.est"));
        assert!(est_path(EstType::Face).is_some());
        assert!(est_path(EstType::Hair).is_some());
        assert_eq!(est_path(EstType::Invalid), None);
    }

    #[test]
    fn test_entries_per_set() {
        assert_eq!(ImcKind::Set.entries_per_set(), 5);
        assert_eq!(ImcKind::NonSet.entries_per_set(), 1);
        assert_eq!(ImcKind::Unknown.entries_per_set(), 1);
    }
}
