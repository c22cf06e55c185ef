/// 元数据文件中的编辑记录类型
use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;
use std::marker::PhantomData;

/// 条目定位表中的编辑块类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MetaDataType {
    Invalid,
    Imc,
    Eqdp,
    Eqp,
    Est,
    Gmp,
    /// 未知类型，保留原值但不会被任何应用例程匹配
    Unknown(u32),
}

impl From<u32> for MetaDataType {
    fn from(value: u32) -> Self {
        match value {
            0 => MetaDataType::Invalid,
            1 => MetaDataType::Imc,
            2 => MetaDataType::Eqdp,
            3 => MetaDataType::Eqp,
            4 => MetaDataType::Est,
            5 => MetaDataType::Gmp,
            other => MetaDataType::Unknown(other),
        }
    }
}

impl From<MetaDataType> for u32 {
    fn from(value: MetaDataType) -> Self {
        match value {
            MetaDataType::Invalid => 0,
            MetaDataType::Imc => 1,
            MetaDataType::Eqdp => 2,
            MetaDataType::Eqp => 3,
            MetaDataType::Est => 4,
            MetaDataType::Gmp => 5,
            MetaDataType::Unknown(other) => other,
        }
    }
}

/// 固定大小的小端记录
pub trait MetaRecord: Sized {
    /// 记录字节数
    const SIZE: usize;

    /// 从恰好 `SIZE` 字节解析记录
    fn from_bytes(bytes: &[u8]) -> Self;
}

impl MetaRecord for u8 {
    const SIZE: usize = 1;

    fn from_bytes(bytes: &[u8]) -> Self {
        bytes[0]
    }
}

/// 变体表（IMC）条目
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImcEntry {
    pub material_id: u8,
    pub decal_id: u8,
    /// 低 10 位为属性掩码，高 6 位为音效 ID
    pub attribute_and_sound: u16,
    pub vfx_id: u8,
    pub material_animation_id: u8,
}

impl ImcEntry {
    pub fn attribute_mask(&self) -> u16 {
        self.attribute_and_sound & 0x3FF
    }

    pub fn sound_id(&self) -> u8 {
        (self.attribute_and_sound >> 10) as u8
    }
}

impl MetaRecord for ImcEntry {
    const SIZE: usize = 6;

    fn from_bytes(bytes: &[u8]) -> Self {
        ImcEntry {
            material_id: bytes[0],
            decal_id: bytes[1],
            attribute_and_sound: LittleEndian::read_u16(&bytes[2..4]),
            vfx_id: bytes[4],
            material_animation_id: bytes[5],
        }
    }
}

/// 变形器（EQDP）编辑记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EqdpEntry {
    pub race_code: u32,
    /// 仅低 2 位有效
    pub value: u8,
}

impl MetaRecord for EqdpEntry {
    const SIZE: usize = 5;

    fn from_bytes(bytes: &[u8]) -> Self {
        EqdpEntry {
            race_code: LittleEndian::read_u32(&bytes[0..4]),
            value: bytes[4] & 0b11,
        }
    }
}

/// 骨骼覆盖（EST）编辑记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EstEntry {
    pub race_code: u16,
    pub set_id: u16,
    /// 0 表示恢复默认（删除覆盖）
    pub skel_id: u16,
}

impl MetaRecord for EstEntry {
    const SIZE: usize = 6;

    fn from_bytes(bytes: &[u8]) -> Self {
        EstEntry {
            race_code: LittleEndian::read_u16(&bytes[0..2]),
            set_id: LittleEndian::read_u16(&bytes[2..4]),
            skel_id: LittleEndian::read_u16(&bytes[4..6]),
        }
    }
}

/// 元数据缓冲区上的只读记录视图
///
/// 记录数为字节长度整除记录大小，多余的尾部字节被忽略。
#[derive(Debug, Clone, Copy)]
pub struct RecordSpan<'a, T> {
    bytes: &'a [u8],
    _marker: PhantomData<T>,
}

impl<'a, T: MetaRecord> RecordSpan<'a, T> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        let whole = bytes.len() / T::SIZE * T::SIZE;
        RecordSpan {
            bytes: &bytes[..whole],
            _marker: PhantomData,
        }
    }

    pub(crate) fn empty() -> Self {
        Self::new(&[])
    }

    /// 记录数量
    pub fn len(&self) -> usize {
        self.bytes.len() / T::SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// 视图覆盖的原始字节（仅包含完整记录）
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn get(&self, index: usize) -> Option<T> {
        let start = index.checked_mul(T::SIZE)?;
        self.bytes.get(start..start + T::SIZE).map(T::from_bytes)
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + 'a
    where
        T: 'a,
    {
        self.bytes.chunks_exact(T::SIZE).map(T::from_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_codes() {
        assert_eq!(MetaDataType::from(1), MetaDataType::Imc);
        assert_eq!(MetaDataType::from(5), MetaDataType::Gmp);
        assert_eq!(MetaDataType::from(77), MetaDataType::Unknown(77));
        assert_eq!(u32::from(MetaDataType::Est), 4);
        assert_eq!(u32::from(MetaDataType::Unknown(77)), 77);
    }

    #[test]
    fn test_imc_entry_layout() {
        let entry = ImcEntry::from_bytes(&[3, 1, 0xFF, 0x0F, 7, 9]);
        assert_eq!(entry.material_id, 3);
        assert_eq!(entry.decal_id, 1);
        assert_eq!(entry.attribute_and_sound, 0x0FFF);
        assert_eq!(entry.attribute_mask(), 0x3FF);
        assert_eq!(entry.sound_id(), 3);
        assert_eq!(entry.vfx_id, 7);
        assert_eq!(entry.material_animation_id, 9);
    }

    #[test]
    fn test_eqdp_value_masked() {
        let entry = EqdpEntry::from_bytes(&[0x65, 0x00, 0x00, 0x00, 0xFE]);
        assert_eq!(entry.race_code, 101);
        assert_eq!(entry.value, 0b10);
    }

    #[test]
    fn test_span_truncates_partial_record() {
        let data = [1u8, 0, 2, 0, 3, 0, 4, 0, 5, 0, 6, 0, 0xAA];
        let span = RecordSpan::<EstEntry>::new(&data);
        assert_eq!(span.len(), 2);
        assert_eq!(span.as_bytes().len(), 12);
        assert_eq!(
            span.get(1),
            Some(EstEntry { race_code: 4, set_id: 5, skel_id: 6 })
        );
        assert_eq!(span.get(2), None);
        assert_eq!(span.iter().count(), 2);
    }

    #[test]
    fn test_empty_span() {
        let span = RecordSpan::<ImcEntry>::empty();
        assert!(span.is_empty());
        assert_eq!(span.len(), 0);
        assert_eq!(span.iter().next(), None);

        let short = RecordSpan::<ImcEntry>::new(&[1, 2, 3]);
        assert!(short.is_empty());
    }
}
