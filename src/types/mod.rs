//! 通用数据类型
//!
//! 定义文档、数据值与存储查询参数

pub mod data_value;
pub mod document;
pub mod query;

// 重新导出所有公共类型以保持API兼容性
pub use data_value::DataValue;
pub use document::{Document, DocumentRef};
pub use query::{PaginationConfig, QueryCondition, QueryOperator, QueryOptions, SortConfig, SortDirection};
