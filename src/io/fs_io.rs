/// 资源 IO 实现
///
/// 提供基于解包目录的默认资源读取实现
use std::path::{Path, PathBuf};

use super::traits::{AssetReader, RawAssetData};
use crate::utils::MetaError;

/// 默认的资源读取器（基于 std::fs）
///
/// 游戏路径相对于 `root` 解析，路径分隔符统一为 `/`。
#[derive(Debug, Clone)]
pub struct FsAssetReader {
    root: PathBuf,
}

impl FsAssetReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 游戏路径对应的本地路径
    pub fn resolve(&self, game_path: &str) -> PathBuf {
        game_path
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |path, part| path.join(part))
    }
}

impl AssetReader for FsAssetReader {
    fn read(&self, game_path: &str) -> Result<RawAssetData, MetaError> {
        let path = self.resolve(game_path);
        let bytes = std::fs::read(&path)?;
        Ok(RawAssetData { bytes })
    }
}
