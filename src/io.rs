/// IO 抽象层模块
///
/// 该模块提供了资源读取的抽象接口，遵循依赖倒置原则。
/// 支持依赖注入、测试 mock 和替换 IO 实现（如归档读取、内存 IO 等）。
///
/// # 架构设计
///
/// - **traits**: 定义 AssetReader trait 接口
/// - **fs_io**: 基于解包目录的默认实现
///
/// # 使用示例
///
/// ```rust,ignore
/// use ttmp_meta::io::FsAssetReader;
/// use ttmp_meta::MetaFile;
///
/// let reader = FsAssetReader::new("extracted");
/// let meta = MetaFile::load(&reader, "chara/equipment/e0001/model/c0101e0001_met.meta")?;
/// ```
pub mod traits;
pub mod fs_io;

// === 导出 trait 定义 ===
pub use traits::{AssetReader, RawAssetData};

// === 导出默认实现 ===
pub use fs_io::FsAssetReader;
