pub mod datatypes;
pub mod io;
pub mod metafile;
pub mod tables;
pub mod template;
pub mod utils;

// 重新导出主要结构
pub use metafile::{EstType, ItemType, MetaDataType, MetaFile, PathIdentity};
pub use tables::MetaTargets;
pub use template::{ModEntry, ModGroup, ModOption, ModTemplate, PackageProvenance, Page};
pub use utils::{is_textools_metadata, MetaError};

// 常量定义
pub const META_EXTENSION: &str = "meta";
