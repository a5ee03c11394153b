//! 错误处理模块
//!
//! 定义模式绑定与连接解析过程中可能出现的全部错误类型

use thiserror::Error;

/// 统一错误类型
///
/// 按照发生时机分为三类：模式构建期错误（转换/注册/配置）、
/// 查询期用户错误（游标/计数/过滤值）以及存储层透传错误
#[derive(Error, Debug)]
pub enum QuickGqlError {
    /// 字段类型无法转换为图字段
    #[error("字段转换失败: {field} ({kind})")]
    ConversionError { field: String, kind: String },

    /// 类型注册失败
    #[error("类型注册失败: {type_name} - {message}")]
    RegistrationError { type_name: String, message: String },

    /// 模式构建期配置错误
    #[error("模式构建错误: {message}")]
    SchemaError { message: String },

    /// 游标解码失败
    #[error("无效的游标 '{cursor}': {message}")]
    CursorError { cursor: String, message: String },

    /// 请求了 last 但无法获取计数
    #[error("使用 last 参数时必须能够获取结果总数")]
    MissingCount,

    /// 过滤参数值无法转换
    #[error("过滤参数 '{argument}' 的值无效: {message}")]
    FilterValueError { argument: String, message: String },

    /// 全局ID解码失败
    #[error("无效的全局ID '{id}': {message}")]
    GlobalIdError { id: String, message: String },

    /// 存储层返回的错误
    #[error("存储操作失败: {message}")]
    StoreError { message: String },

    /// 配置错误
    #[error("配置错误: {message}")]
    ConfigError { message: String },

    /// 序列化错误
    #[error("数据序列化失败: {message}")]
    SerializationError { message: String },

    /// IO错误
    #[error("IO错误: {0}")]
    IoError(#[from] std::io::Error),

    /// 其他错误
    #[error("{0}")]
    Other(String),
}

/// 结果类型别名
pub type QuickGqlResult<T> = Result<T, QuickGqlError>;

impl QuickGqlError {
    /// 是否为查询期用户错误
    ///
    /// 用户错误只影响当前字段，不会中断同一查询中的兄弟字段
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            QuickGqlError::CursorError { .. }
                | QuickGqlError::MissingCount
                | QuickGqlError::FilterValueError { .. }
                | QuickGqlError::GlobalIdError { .. }
        )
    }

    /// 是否为模式构建期错误
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            QuickGqlError::ConversionError { .. }
                | QuickGqlError::RegistrationError { .. }
                | QuickGqlError::SchemaError { .. }
        )
    }

    /// 对应的多语言消息键
    pub fn i18n_key(&self) -> &'static str {
        match self {
            QuickGqlError::ConversionError { .. } => "error.conversion",
            QuickGqlError::RegistrationError { .. } => "error.registration",
            QuickGqlError::SchemaError { .. } => "error.schema",
            QuickGqlError::CursorError { .. } => "error.cursor",
            QuickGqlError::MissingCount => "error.missing_count",
            QuickGqlError::FilterValueError { .. } => "error.filter_value",
            QuickGqlError::GlobalIdError { .. } => "error.global_id",
            QuickGqlError::StoreError { .. } => "error.store",
            QuickGqlError::ConfigError { .. } => "error.config",
            QuickGqlError::SerializationError { .. } => "error.serialization",
            QuickGqlError::IoError(_) => "error.io",
            QuickGqlError::Other(_) => "error.other",
        }
    }

    /// 消息模板中的占位符参数
    pub fn i18n_args(&self) -> Vec<(&'static str, String)> {
        match self {
            QuickGqlError::ConversionError { field, kind } => {
                vec![("field", field.clone()), ("kind", kind.clone())]
            }
            QuickGqlError::RegistrationError { type_name, message } => {
                vec![("type_name", type_name.clone()), ("message", message.clone())]
            }
            QuickGqlError::CursorError { cursor, message } => {
                vec![("cursor", cursor.clone()), ("message", message.clone())]
            }
            QuickGqlError::FilterValueError { argument, message } => {
                vec![("argument", argument.clone()), ("message", message.clone())]
            }
            QuickGqlError::GlobalIdError { id, message } => {
                vec![("id", id.clone()), ("message", message.clone())]
            }
            QuickGqlError::SchemaError { message }
            | QuickGqlError::StoreError { message }
            | QuickGqlError::ConfigError { message }
            | QuickGqlError::SerializationError { message } => vec![("message", message.clone())],
            QuickGqlError::IoError(e) => vec![("message", e.to_string())],
            QuickGqlError::Other(message) => vec![("message", message.clone())],
            QuickGqlError::MissingCount => Vec::new(),
        }
    }
}

impl From<serde_json::Error> for QuickGqlError {
    fn from(err: serde_json::Error) -> Self {
        QuickGqlError::SerializationError {
            message: err.to_string(),
        }
    }
}

/// 快速构造错误的宏
#[macro_export]
macro_rules! quick_error {
    (conversion, $field:expr, $kind:expr) => {
        $crate::error::QuickGqlError::ConversionError {
            field: $field.to_string(),
            kind: $kind.to_string(),
        }
    };
    (registration, $type_name:expr, $msg:expr) => {
        $crate::error::QuickGqlError::RegistrationError {
            type_name: $type_name.to_string(),
            message: $msg.to_string(),
        }
    };
    (schema, $msg:expr) => {
        $crate::error::QuickGqlError::SchemaError {
            message: $msg.to_string(),
        }
    };
    (cursor, $cursor:expr, $msg:expr) => {
        $crate::error::QuickGqlError::CursorError {
            cursor: $cursor.to_string(),
            message: $msg.to_string(),
        }
    };
    (filter, $argument:expr, $msg:expr) => {
        $crate::error::QuickGqlError::FilterValueError {
            argument: $argument.to_string(),
            message: $msg.to_string(),
        }
    };
    (global_id, $id:expr, $msg:expr) => {
        $crate::error::QuickGqlError::GlobalIdError {
            id: $id.to_string(),
            message: $msg.to_string(),
        }
    };
    (store, $msg:expr) => {
        $crate::error::QuickGqlError::StoreError {
            message: $msg.to_string(),
        }
    };
    (config, $msg:expr) => {
        $crate::error::QuickGqlError::ConfigError {
            message: $msg.to_string(),
        }
    };
    (serialization, $msg:expr) => {
        $crate::error::QuickGqlError::SerializationError {
            message: $msg.to_string(),
        }
    };
}
