use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use crate::utils::MetaError;

// 基础整数类型读取函数
pub fn read_u8(cursor: &mut Cursor<&[u8]>) -> Result<u8, std::io::Error> {
    cursor.read_u8()
}

pub fn read_u16(cursor: &mut Cursor<&[u8]>) -> Result<u16, std::io::Error> {
    cursor.read_u16::<LittleEndian>()
}

pub fn read_u32(cursor: &mut Cursor<&[u8]>) -> Result<u32, std::io::Error> {
    cursor.read_u32::<LittleEndian>()
}

/// 截断读取错误统一转为格式错误
pub fn truncated(what: &str) -> impl FnOnce(std::io::Error) -> MetaError + '_ {
    move |e| MetaError::format(format!("truncated {}: {}", what, e))
}

/// Z字符串解析(以null结尾)
///
/// 从 `start` 开始查找 NUL，返回字符串切片（借用自 `data`）以及 NUL 之后的偏移量。
pub fn parse_zstring(data: &[u8], start: usize) -> Result<(&str, usize), MetaError> {
    let tail = data
        .get(start..)
        .ok_or_else(|| MetaError::format("string offset beyond end of data"))?;
    let null_pos = tail
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| MetaError::format("unterminated string"))?;

    let text = std::str::from_utf8(&tail[..null_pos])
        .map_err(|e| MetaError::format(format!("embedded path is not valid UTF-8: {}", e)))?;

    Ok((text, start + null_pos + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_le() {
        let data: &[u8] = &[0x01, 0x02, 0x03, 0x04, 0xFF];
        let mut cursor = Cursor::new(data);
        assert_eq!(read_u32(&mut cursor).unwrap(), 0x0403_0201);
        assert_eq!(read_u8(&mut cursor).unwrap(), 0xFF);
        assert!(read_u16(&mut cursor).is_err());
    }

    #[test]
    fn test_parse_zstring() {
        let data = b"\x00\x00abc\x00rest";
        let (text, next) = parse_zstring(data, 2).unwrap();
        assert_eq!(text, "abc");
        assert_eq!(next, 6);

        let (empty, next) = parse_zstring(data, 0).unwrap();
        assert_eq!(empty, "");
        assert_eq!(next, 1);
    }

    #[test]
    fn test_parse_zstring_errors() {
        assert!(matches!(parse_zstring(b"abc", 0), Err(MetaError::Format(_))));
        assert!(matches!(parse_zstring(b"abc", 10), Err(MetaError::Format(_))));
        assert!(matches!(parse_zstring(b"\xFF\xFE\x00", 0), Err(MetaError::Format(_))));
    }
}
