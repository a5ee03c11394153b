//! rat_quickgql - 文档模型到图查询模式的绑定与连接解析
//!
//! 把文档数据库的模型元数据转换为类型化的图查询模式，并按游标分页解析
//! 列表字段。存储访问通过 [`DocumentStore`] / [`AsyncDocumentStore`] 接口完成，
//! 查询语言的解析由宿主查询引擎负责

// 导出所有公共模块
pub mod config;
pub mod error;
pub mod i18n;
pub mod model;
pub mod resolver;
pub mod schema;
pub mod store;
pub mod types;

// 重新导出常用类型和函数
pub use config::{
    LogLevel, LoggingConfig, LoggingConfigBuilder, QuickGqlConfig, QuickGqlConfigBuilder,
    ResolverConfig, ResolverConfigBuilder,
};
pub use error::{QuickGqlError, QuickGqlResult};
pub use model::{
    boolean_field, datetime_field, dict_field, email_field, embedded_field, enum_field, float_field,
    generic_lazy_reference_field, generic_reference_field, integer_field, lazy_reference_field, list_field,
    point_field, reference_field, string_field, EnumDefinition, FieldDefinition, FieldKind, Model, ModelMeta,
};
pub use resolver::{
    decode_cursor, encode_cursor, from_global_id, get_node, get_node_async, to_global_id, Connection,
    ConnectionArgs, ConnectionSource, CursorArgs, Edge, ExecutionResult, FieldError, PageInfo, PageWindow,
    QueryContext, Selection,
};
pub use schema::{
    ExecutorMode, GraphField, GraphFieldType, GraphType, RegistryBuilder, RegistryKind, Schema, SchemaBuilder,
    TypeRegistry,
};
pub use store::{AsyncDocumentStore, DocumentStore, MemoryStore};
pub use types::*;

// 条件编译调试宏 - 只有在 debug 模式下才输出调试信息
#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        rat_logger::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        // 在 release 模式下不输出调试信息
    };
}

/// 初始化rat_quickgql库
///
/// 注册多语言错误消息并按环境变量选择语言
///
/// 注意：日志系统由调用者自行初始化，本库不会自动初始化日志
pub fn init() {
    i18n::ErrorMessageI18n::init();
}

/// 库版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 库名称
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// 获取库信息
pub fn get_info() -> String {
    format!("{} v{}", NAME, VERSION)
}
