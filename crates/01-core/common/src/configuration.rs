//! 引擎配置

use crate::errors::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// 对象空间配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 实例父链的最大深度
    pub max_resolution_depth: usize,
    /// 单个对象空间中允许的最大实例数量
    pub max_instances: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_resolution_depth: 64,
            max_instances: 1_000_000,
        }
    }
}

impl EngineConfig {
    /// 从 TOML 文本加载
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::ParseError {
            source: Box::new(e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文本加载
    pub fn from_json_str(text: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(text).map_err(|e| ConfigError::ParseError {
            source: Box::new(e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载，按扩展名选择格式
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        debug!("加载引擎配置: {}", path.display());

        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&text),
            Some("json") => Self::from_json_str(&text),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.display().to_string(),
            }),
        }
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_resolution_depth == 0 {
            return Err(ConfigError::ValidationError {
                message: "max_resolution_depth 必须大于 0".to_string(),
            });
        }
        if self.max_instances == 0 {
            return Err(ConfigError::ValidationError {
                message: "max_instances 必须大于 0".to_string(),
            });
        }
        Ok(())
    }
}
