/// TexTools 元数据补丁（.meta）
///
/// 二进制布局（小端）：
///
/// ```text
/// 0                 : Version            u32
/// 4                 : SourcePath         以 NUL 结尾的字符串
/// 紧随 SourcePath   : Header             EntryCount u32, HeaderSize u32, FirstEntryLocatorOffset u32
/// FirstEntryLocatorOffset : EntryLocator[EntryCount]  Type u32, Offset u32, Size u32
/// ```
///
/// 每个定位项指向缓冲区中的一个编辑块，由 `apply` 中的例程分发到对应的目标表。
mod apply;
mod path;
mod records;


use serde::Serialize;
use std::io::Cursor;
use std::ops::Range;

use crate::datatypes::{parse_zstring, read_u32, truncated};
use crate::io::AssetReader;
use crate::utils::MetaError;

pub use path::{parse_source_imc_path, parse_target_path, EstType, ItemType, PathIdentity};
pub use records::{EqdpEntry, EstEntry, ImcEntry, MetaDataType, MetaRecord, RecordSpan};

/// 当前 TexTools 写出的元数据版本
pub const META_VERSION: u32 = 2;

/// 元数据文件头
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetaHeader {
    pub entry_count: u32,
    pub header_size: u32,
    pub first_entry_locator_offset: u32,
}

/// 编辑块定位项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntryLocator {
    pub entry_type: MetaDataType,
    pub offset: u32,
    pub size: u32,
}

impl EntryLocator {
    /// 定位项对应的字节范围
    pub fn range(&self) -> Range<usize> {
        let start = self.offset as usize;
        start..start + self.size as usize
    }
}

/// 已解码的元数据补丁
///
/// 拥有整个文件缓冲区；`get_span` 返回的视图借用自该缓冲区。
#[derive(Debug, Clone)]
pub struct MetaFile {
    target_path: String,
    data: Vec<u8>,
    version: u32,
    source_path: String,
    header: MetaHeader,
    entries: Vec<EntryLocator>,
    identity: PathIdentity,
    source_imc_path: String,
}

/// 元数据摘要（用于展示）
#[derive(Debug, Clone, Serialize)]
pub struct MetaSummary<'a> {
    pub target_path: &'a str,
    pub source_path: &'a str,
    pub version: u32,
    pub header: MetaHeader,
    pub entries: &'a [EntryLocator],
    pub identity: &'a PathIdentity,
    pub source_imc_path: &'a str,
}

impl MetaFile {
    /// 从完整字节内容解码元数据补丁
    ///
    /// # 参数
    /// * `target_path` - 被修改的游戏路径（由调用方提供）
    /// * `data` - 元数据文件内容
    ///
    /// # 错误
    /// - 缓冲区被截断或定位项范围超出缓冲区
    /// - 目标路径或来源路径不是受支持的形态
    pub fn new(target_path: impl Into<String>, data: Vec<u8>) -> Result<Self, MetaError> {
        let target_path = target_path.into();

        let mut cursor = Cursor::new(&data[..]);
        let version = read_u32(&mut cursor).map_err(truncated("version"))?;

        let (source_path, header_offset) = parse_zstring(&data, 4)?;
        let source_path = source_path.to_string();

        cursor.set_position(header_offset as u64);
        let header = MetaHeader {
            entry_count: read_u32(&mut cursor).map_err(truncated("header"))?,
            header_size: read_u32(&mut cursor).map_err(truncated("header"))?,
            first_entry_locator_offset: read_u32(&mut cursor).map_err(truncated("header"))?,
        };

        let entries = Self::parse_locators(&data, &header)?;

        let identity = parse_target_path(&target_path)?;
        // 来源路径只按角色形态匹配，与目标形态无关；目标为房屋时不匹配，来源 IMC 路径留空
        let source_imc_path = if identity.item_type == ItemType::Housing {
            String::new()
        } else {
            parse_source_imc_path(&source_path)?
        };

        if version != META_VERSION {
            log::debug!("元数据版本 {} 与预期版本 {} 不同: {}", version, META_VERSION, target_path);
        }
        log::debug!(
            "已解码元数据 {}: 版本 {}, {} 个编辑块, 类别 {:?}, ID {}",
            target_path,
            version,
            entries.len(),
            identity.item_type,
            identity.primary_id
        );

        Ok(MetaFile {
            target_path,
            data,
            version,
            source_path,
            header,
            entries,
            identity,
            source_imc_path,
        })
    }

    /// 通过资源读取器加载目标路径对应的元数据文件
    pub fn load(reader: &dyn AssetReader, target_path: &str) -> Result<Self, MetaError> {
        let raw = reader.read(target_path)?;
        Self::new(target_path, raw.bytes)
    }

    /// 读取定位表并检查每一项的范围
    fn parse_locators(data: &[u8], header: &MetaHeader) -> Result<Vec<EntryLocator>, MetaError> {
        let mut cursor = Cursor::new(data);
        cursor.set_position(header.first_entry_locator_offset as u64);

        let mut entries = Vec::new();
        for _ in 0..header.entry_count {
            let locator = EntryLocator {
                entry_type: MetaDataType::from(read_u32(&mut cursor).map_err(truncated("entry locator"))?),
                offset: read_u32(&mut cursor).map_err(truncated("entry locator"))?,
                size: read_u32(&mut cursor).map_err(truncated("entry locator"))?,
            };

            if locator.range().end > data.len() {
                return Err(MetaError::format(format!(
                    "entry {:?} [{}, +{}) exceeds data length {}",
                    locator.entry_type,
                    locator.offset,
                    locator.size,
                    data.len()
                )));
            }
            if let MetaDataType::Unknown(code) = locator.entry_type {
                log::trace!("忽略未知编辑块类型 {}", code);
            }

            entries.push(locator);
        }

        Ok(entries)
    }

    /// 获取指定类型的第一个编辑块，按记录类型解释
    ///
    /// 没有该类型时返回空视图。
    pub fn get_span<T: MetaRecord>(&self, entry_type: MetaDataType) -> RecordSpan<'_, T> {
        self.entries
            .iter()
            .find(|locator| locator.entry_type == entry_type)
            .map(|locator| RecordSpan::new(&self.data[locator.range()]))
            .unwrap_or_else(RecordSpan::empty)
    }

    /// 是否包含指定类型的非空编辑块
    pub fn has_entry(&self, entry_type: MetaDataType) -> bool {
        !self.get_span::<u8>(entry_type).is_empty()
    }

    pub fn target_path(&self) -> &str {
        &self.target_path
    }

    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    /// 文件版本（只记录，不校验）
    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn header(&self) -> &MetaHeader {
        &self.header
    }

    pub fn entries(&self) -> &[EntryLocator] {
        &self.entries
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn identity(&self) -> &PathIdentity {
        &self.identity
    }

    pub fn item_type(&self) -> ItemType {
        self.identity.item_type
    }

    pub fn est_type(&self) -> EstType {
        self.identity.est_type
    }

    pub fn primary_id(&self) -> u16 {
        self.identity.primary_id
    }

    pub fn slot_index(&self) -> usize {
        self.identity.slot_index
    }

    pub fn target_imc_path(&self) -> &str {
        &self.identity.target_imc_path
    }

    pub fn source_imc_path(&self) -> &str {
        &self.source_imc_path
    }

    /// 生成摘要
    pub fn summary(&self) -> MetaSummary<'_> {
        MetaSummary {
            target_path: &self.target_path,
            source_path: &self.source_path,
            version: self.version,
            header: self.header,
            entries: &self.entries,
            identity: &self.identity,
            source_imc_path: &self.source_imc_path,
        }
    }
}
