use serde::{Deserialize, Deserializer, Serialize};
use std::io::Read;
use std::ops::Range;

use crate::utils::MetaError;

/// 显式 null 与缺省字段同样取默认值
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 模组包来源信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PackageProvenance {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
}

/// 单个替换资源条目
///
/// `mod_offset`/`mod_size` 描述 `dat_file` 数据分区中的字节范围，
/// 其有效性由调用方负责检查。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ModEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(deserialize_with = "null_as_default")]
    pub full_path: String,
    #[serde(deserialize_with = "null_as_default")]
    pub mod_offset: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub mod_size: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub dat_file: String,
    #[serde(deserialize_with = "null_as_default")]
    pub is_default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mod_pack_entry: Option<PackageProvenance>,
}

impl ModEntry {
    /// 从 JSON 字符串解析单个条目
    pub fn from_json_str(json: &str) -> Result<Self, MetaError> {
        serde_json::from_str(json).map_err(document_error)
    }

    /// 条目在数据分区中的字节范围
    pub fn data_range(&self) -> Range<u64> {
        self.mod_offset..self.mod_offset.saturating_add(self.mod_size)
    }
}

/// 可选项（选项组中的一项）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ModOption {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub image_path: String,
    #[serde(deserialize_with = "null_as_default")]
    pub mods_jsons: Vec<ModEntry>,
    /// 仅供界面使用
    #[serde(deserialize_with = "null_as_default")]
    pub group_name: String,
    /// 仅供界面使用
    #[serde(deserialize_with = "null_as_default")]
    pub selection_type: String,
    /// 默认勾选提示，选择逻辑不使用
    #[serde(deserialize_with = "null_as_default")]
    pub is_checked: bool,
}

/// 选项组
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ModGroup {
    #[serde(deserialize_with = "null_as_default")]
    pub group_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub selection_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub option_list: Vec<ModOption>,
}

/// 选项页
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Page {
    #[serde(deserialize_with = "null_as_default")]
    pub page_index: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub mod_groups: Vec<ModGroup>,
}

/// 模组包模板（TTMPL）
///
/// - `mod_pack_pages`: 按用户选择安装的条目
/// - `simple_mods_list`: 总是安装的条目
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ModTemplate {
    #[serde(deserialize_with = "null_as_default")]
    pub minimum_framework_version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub format_version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub mod_pack_pages: Vec<Page>,
    #[serde(deserialize_with = "null_as_default")]
    pub simple_mods_list: Vec<ModEntry>,
}

impl ModTemplate {
    /// 从 JSON 字符串解析模板
    ///
    /// # 错误
    /// 文档不是对象（或嵌套位置需要对象却不是）时返回 `MetaError::Format`
    pub fn from_json_str(json: &str) -> Result<Self, MetaError> {
        serde_json::from_str(json).map_err(document_error)
    }

    /// 从读取器解析模板
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, MetaError> {
        serde_json::from_reader(reader).map_err(document_error)
    }

    /// 解析旧式简单模组包列表
    ///
    /// 每行一个 ModEntry 对象，空行忽略。结果模板没有选项页，
    /// 所有条目进入 `simple_mods_list`。
    pub fn from_legacy_lines(text: &str) -> Result<Self, MetaError> {
        let simple_mods_list = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ModEntry::from_json_str)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ModTemplate {
            simple_mods_list,
            ..Default::default()
        })
    }

    /// 序列化为紧凑 JSON
    pub fn to_json_string(&self) -> Result<String, MetaError> {
        Ok(serde_json::to_string(self)?)
    }

    /// 序列化为格式化 JSON
    pub fn to_json_string_pretty(&self) -> Result<String, MetaError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// 文档解析失败统一归为格式错误
fn document_error(e: serde_json::Error) -> MetaError {
    if e.is_io() {
        MetaError::JsonError(e)
    } else {
        MetaError::format(e.to_string())
    }
}
