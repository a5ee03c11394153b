//! # 日志配置构建器模块
//!
//! 提供日志配置的构建器实现，支持链式调用和严格验证

use crate::config::core::{LogLevel, LoggingConfig};
use crate::error::QuickGqlResult;
use rat_logger::info;
use std::path::PathBuf;

/// 日志配置构建器
#[derive(Debug)]
pub struct LoggingConfigBuilder {
    level: Option<LogLevel>,
    console: Option<bool>,
    file_path: Option<PathBuf>,
    structured: Option<bool>,
}

impl LoggingConfigBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self {
            level: None,
            console: None,
            file_path: None,
            structured: None,
        }
    }

    /// 设置日志级别
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    /// 设置是否输出到控制台
    pub fn console(mut self, console: bool) -> Self {
        self.console = Some(console);
        self
    }

    /// 设置日志文件路径
    pub fn file_path<P: Into<PathBuf>>(mut self, file_path: Option<P>) -> Self {
        self.file_path = file_path.map(|p| p.into());
        self
    }

    /// 设置是否启用结构化日志
    pub fn structured(mut self, structured: bool) -> Self {
        self.structured = Some(structured);
        self
    }

    /// 构建日志配置
    ///
    /// # 错误
    ///
    /// 如果任何必需的配置项未设置，将返回错误
    pub fn build(self) -> QuickGqlResult<LoggingConfig> {
        let level = self
            .level
            .ok_or_else(|| crate::quick_error!(config, "日志级别必须设置"))?;

        let console = self
            .console
            .ok_or_else(|| crate::quick_error!(config, "控制台输出选项必须设置"))?;

        let structured = self
            .structured
            .ok_or_else(|| crate::quick_error!(config, "结构化日志选项必须设置"))?;

        if !console && self.file_path.is_none() {
            return Err(crate::quick_error!(config, "控制台与日志文件至少启用一个"));
        }

        info!("创建日志配置: 级别={:?}, 控制台={}, 结构化={}", level, console, structured);

        Ok(LoggingConfig {
            level,
            console,
            file_path: self.file_path,
            structured,
        })
    }
}

impl Default for LoggingConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
