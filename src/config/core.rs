//! # 配置管理模块 - 核心配置类型
//!
//! 解析器配置与日志配置。构建器要求所有配置项显式设置，
//! 只有 `ResolverConfig::default()` 提供一组文档化的默认值供测试与示例使用

use crate::error::{QuickGqlError, QuickGqlResult};
use rat_logger::info;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 顶层配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickGqlConfig {
    /// 解析器配置
    pub resolver: ResolverConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// 解析器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// 引用列表批量读取的工作线程数
    pub worker_pool_size: usize,
    /// `near` 过滤没有给出 `max_distance` 时使用的距离
    pub default_max_distance: f64,
    /// 存储保留的访问器名，不生成过滤参数
    pub reserved_accessors: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            worker_pool_size: 5,
            default_max_distance: 10000.0,
            reserved_accessors: vec!["objects".to_string(), "pk".to_string()],
        }
    }
}

impl ResolverConfig {
    /// 创建解析器配置构建器
    pub fn builder() -> super::builders::ResolverConfigBuilder {
        super::builders::ResolverConfigBuilder::new()
    }

    /// 校验配置取值
    pub fn validate(&self) -> QuickGqlResult<()> {
        if self.worker_pool_size == 0 {
            return Err(crate::quick_error!(config, "工作线程数不能为零"));
        }
        if !self.default_max_distance.is_finite() || self.default_max_distance <= 0.0 {
            return Err(crate::quick_error!(config, "默认最大距离必须是正数"));
        }
        Ok(())
    }
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: LogLevel,
    /// 是否输出到控制台
    pub console: bool,
    /// 日志文件路径
    pub file_path: Option<PathBuf>,
    /// 是否启用结构化日志
    pub structured: bool,
}

/// 日志级别
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// 错误级别
    Error,
    /// 警告级别
    Warn,
    /// 信息级别
    Info,
    /// 调试级别
    Debug,
    /// 跟踪级别
    Trace,
}

fn is_toml(path: &std::path::Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("toml")
}

impl QuickGqlConfig {
    /// 创建顶层配置构建器
    pub fn builder() -> super::builders::QuickGqlConfigBuilder {
        super::builders::QuickGqlConfigBuilder::new()
    }

    /// 从配置文件加载配置
    ///
    /// `.toml` 按 TOML 解析，其余按 JSON 解析；加载后会校验解析器配置
    pub fn from_file<P: AsRef<std::path::Path>>(config_path: P) -> QuickGqlResult<Self> {
        let content = std::fs::read_to_string(config_path.as_ref()).map_err(QuickGqlError::IoError)?;

        let config: QuickGqlConfig = if is_toml(config_path.as_ref()) {
            toml::from_str(&content)
                .map_err(|e| crate::quick_error!(config, format!("解析TOML配置文件失败: {}", e)))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| crate::quick_error!(config, format!("解析JSON配置文件失败: {}", e)))?
        };
        config.resolver.validate()?;

        info!("从文件加载配置: {:?}", config_path.as_ref());
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, config_path: P) -> QuickGqlResult<()> {
        let content = if is_toml(config_path.as_ref()) {
            toml::to_string_pretty(self)
                .map_err(|e| crate::quick_error!(config, format!("序列化TOML配置失败: {}", e)))?
        } else {
            serde_json::to_string_pretty(self)
                .map_err(|e| crate::quick_error!(config, format!("序列化JSON配置失败: {}", e)))?
        };

        std::fs::write(config_path.as_ref(), content).map_err(QuickGqlError::IoError)?;

        info!("保存配置到文件: {:?}", config_path.as_ref());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_resolver_config_is_valid() {
        let config = ResolverConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.worker_pool_size, 5);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ResolverConfig::default();
        config.worker_pool_size = 0;
        assert!(config.validate().is_err());

        let mut config = ResolverConfig::default();
        config.default_max_distance = -1.0;
        assert!(config.validate().is_err());
    }
}
