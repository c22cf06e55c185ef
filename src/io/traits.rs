/// IO 抽象层 - trait 定义
///
/// 归档/文件系统层不在本库范围内，这里只定义按游戏路径读取字节流的接口，
/// 支持依赖注入和测试 mock。
use crate::utils::MetaError;

/// 资源原始数据
#[derive(Debug, Clone)]
pub struct RawAssetData {
    /// 文件的原始字节数据
    pub bytes: Vec<u8>,
}

/// 资源读取 trait
///
/// # 职责
/// - 按游戏路径（如 `chara/equipment/e0001/model/c0101e0001_met.meta`）读取原始字节
/// - 不负责解析，仅负责 IO
pub trait AssetReader {
    /// 读取资源的原始数据
    ///
    /// # 参数
    /// * `game_path` - 使用 `/` 分隔的游戏路径
    fn read(&self, game_path: &str) -> Result<RawAssetData, MetaError>;
}
