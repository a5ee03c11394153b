//! Model trait 定义模块
//!
//! 定义模型的核心接口

use crate::model::field_types::ModelMeta;

/// 模型特征
///
/// 所有需要绑定图类型的模型都实现这个特征
pub trait Model: Send + Sync {
    /// 获取模型元数据
    fn meta() -> ModelMeta;

    /// 获取模型名
    fn model_name() -> String {
        Self::meta().name
    }

    /// 获取集合名
    fn collection_name() -> String {
        Self::meta().collection_name
    }
}
