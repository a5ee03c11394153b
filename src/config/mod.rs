//! # 配置管理模块
//!
//! 提供统一的配置管理系统，支持构建器模式和链式配置
//! 构建器要求所有配置项显式设置

pub mod builders;
pub mod core;

pub use builders::{LoggingConfigBuilder, QuickGqlConfigBuilder, ResolverConfigBuilder};
pub use self::core::{LogLevel, LoggingConfig, QuickGqlConfig, ResolverConfig};
