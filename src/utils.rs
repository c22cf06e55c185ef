use thiserror::Error;

/// 自定义错误类型
#[derive(Error, Debug)]
pub enum MetaError {
    /// 文档结构、路径格式或二进制布局不符合预期
    #[error("Invalid format: {0}")]
    Format(String),

    /// 选择文档中的值无法转换为整数或整数序列
    #[error("Coercion error: {0}")]
    Coercion(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl MetaError {
    /// 构造格式错误
    pub fn format(message: impl Into<String>) -> Self {
        MetaError::Format(message.into())
    }

    /// 构造类型转换错误
    pub fn coercion(message: impl Into<String>) -> Self {
        MetaError::Coercion(message.into())
    }
}

/// 元数据文件扩展名
const META_SUFFIX: &str = ".meta";

/// 判断路径是否指向 TexTools 元数据文件（.meta，大小写不敏感）
pub fn is_textools_metadata(path: &str) -> bool {
    let bytes = path.as_bytes();
    if bytes.len() < META_SUFFIX.len() {
        return false;
    }
    bytes[bytes.len() - META_SUFFIX.len()..].eq_ignore_ascii_case(META_SUFFIX.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_textools_metadata() {
        assert!(is_textools_metadata("chara/equipment/e0001/model/c0101e0001_met.meta"));
        assert!(is_textools_metadata("CHARA/EQUIPMENT/E0001/C0101E0001_MET.META"));
        assert!(is_textools_metadata(".meta"));
        assert!(is_textools_metadata("x.MeTa"));

        assert!(!is_textools_metadata("meta"));
        assert!(!is_textools_metadata(""));
        assert!(!is_textools_metadata("chara/equipment/e0001/e0001.imc"));
        assert!(!is_textools_metadata("file.meta.bak"));
        assert!(!is_textools_metadata("filemeta"));
    }

    #[test]
    fn test_error_messages() {
        let err = MetaError::format("unsupported meta file");
        assert_eq!(err.to_string(), "Invalid format: unsupported meta file");

        let err = MetaError::coercion("expected integer");
        assert!(matches!(err, MetaError::Coercion(_)));
    }
}
