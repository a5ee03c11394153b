//! # 解析器配置构建器模块
//!
//! 提供解析器配置的构建器实现，支持链式调用和严格验证

use crate::config::core::ResolverConfig;
use crate::error::QuickGqlResult;
use rat_logger::info;

/// 解析器配置构建器
#[derive(Debug)]
pub struct ResolverConfigBuilder {
    worker_pool_size: Option<usize>,
    default_max_distance: Option<f64>,
    reserved_accessors: Option<Vec<String>>,
}

impl ResolverConfigBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self {
            worker_pool_size: None,
            default_max_distance: None,
            reserved_accessors: None,
        }
    }

    /// 设置批量读取的工作线程数
    pub fn worker_pool_size(mut self, size: usize) -> Self {
        self.worker_pool_size = Some(size);
        self
    }

    /// 设置 `near` 过滤的默认最大距离
    pub fn default_max_distance(mut self, distance: f64) -> Self {
        self.default_max_distance = Some(distance);
        self
    }

    /// 设置存储保留的访问器名
    pub fn reserved_accessors(mut self, names: &[&str]) -> Self {
        self.reserved_accessors = Some(names.iter().map(|s| s.to_string()).collect());
        self
    }

    /// 构建解析器配置
    ///
    /// # 错误
    ///
    /// 如果任何必需的配置项未设置或取值非法，将返回错误
    pub fn build(self) -> QuickGqlResult<ResolverConfig> {
        let worker_pool_size = self
            .worker_pool_size
            .ok_or_else(|| crate::quick_error!(config, "工作线程数必须设置"))?;

        let default_max_distance = self
            .default_max_distance
            .ok_or_else(|| crate::quick_error!(config, "默认最大距离必须设置"))?;

        let reserved_accessors = self
            .reserved_accessors
            .ok_or_else(|| crate::quick_error!(config, "保留访问器名必须设置"))?;

        let config = ResolverConfig {
            worker_pool_size,
            default_max_distance,
            reserved_accessors,
        };
        config.validate()?;

        info!(
            "创建解析器配置: 工作线程数={}, 默认最大距离={}",
            config.worker_pool_size, config.default_max_distance
        );
        Ok(config)
    }
}

impl Default for ResolverConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
