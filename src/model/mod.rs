//! 模型定义系统模块
//!
//! 参考mongoengine的设计，描述文档模型的字段种类与元数据

pub mod convenience;
pub mod field_types;
pub mod traits;

pub use convenience::*;
pub use field_types::{EnumDefinition, FieldDefinition, FieldKind, ModelMeta};
pub use traits::Model;
