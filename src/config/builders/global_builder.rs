//! # 顶层配置构建器模块
//!
//! 提供顶层配置的构建器实现，支持链式调用和严格验证

use crate::config::core::{LoggingConfig, QuickGqlConfig, ResolverConfig};
use crate::error::QuickGqlResult;
use rat_logger::info;

/// 顶层配置构建器
#[derive(Debug)]
pub struct QuickGqlConfigBuilder {
    resolver: Option<ResolverConfig>,
    logging: Option<LoggingConfig>,
}

impl QuickGqlConfigBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self {
            resolver: None,
            logging: None,
        }
    }

    /// 设置解析器配置
    pub fn resolver(mut self, resolver: ResolverConfig) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// 设置日志配置
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// 构建顶层配置
    ///
    /// # 错误
    ///
    /// 如果任何必需的配置项未设置，将返回错误
    pub fn build(self) -> QuickGqlResult<QuickGqlConfig> {
        let resolver = self
            .resolver
            .ok_or_else(|| crate::quick_error!(config, "解析器配置必须设置"))?;

        let logging = self
            .logging
            .ok_or_else(|| crate::quick_error!(config, "日志配置必须设置"))?;

        resolver.validate()?;

        info!(
            "创建顶层配置: 工作线程数={}, 日志级别={:?}",
            resolver.worker_pool_size, logging.level
        );

        Ok(QuickGqlConfig { resolver, logging })
    }
}

impl Default for QuickGqlConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
