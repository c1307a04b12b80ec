//! 程序配置
//!
//! 优先级：环境变量 > pipeline.toml > 默认值

use std::path::Path;

use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 后端服务地址
    pub api_base_url: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 文案长度上限（超出只警告，不拦截）
    pub caption_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            verbose_logging: false,
            caption_limit: 2000,
        }
    }
}

impl Config {
    /// 加载配置：先读 pipeline.toml（如果存在），再用环境变量覆盖
    pub fn load() -> Result<Self> {
        let mut config = match Self::from_file(Path::new("pipeline.toml")) {
            Ok(Some(file_config)) => file_config,
            Ok(None) => Self::default(),
            Err(e) => return Err(e),
        };
        config.apply_env();
        Ok(config)
    }

    /// 从 TOML 文件读取配置，文件不存在时返回 None
    pub fn from_file(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = toml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(Some(config))
    }

    /// 环境变量覆盖
    fn apply_env(&mut self) {
        if let Ok(value) = std::env::var("API_BASE_URL") {
            self.api_base_url = value;
        }
        if let Some(value) = std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()) {
            self.verbose_logging = value;
        }
        if let Some(value) = std::env::var("CAPTION_LIMIT").ok().and_then(|v| v.parse().ok()) {
            self.caption_limit = value;
        }
    }
}
