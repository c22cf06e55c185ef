/// 模组包模板模块
///
/// - **model**: 模板数据结构及 JSON 编解码（字段级默认值）
/// - **select**: 根据用户选择文档遍历需要安装的条目
mod model;
mod select;


pub use model::{ModEntry, ModGroup, ModOption, ModTemplate, PackageProvenance, Page};
