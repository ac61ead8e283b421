//! 配置管理模块
//! 支持从环境变量和配置文件加载配置

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::wallet::BIP44_MAX_GROUP_INDEX;

/// 配置结构体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "text"
}

/// 账户发现配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// 初始化钱包后立即执行发现
    #[serde(default)]
    pub discover_on_init: bool,
    /// 可创建/探测的最大分组索引
    #[serde(default = "default_max_group_index")]
    pub max_group_index: u32,
}

fn default_max_group_index() -> u32 {
    BIP44_MAX_GROUP_INDEX
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            format: std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".into()),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            discover_on_init: std::env::var("DISCOVERY_ON_INIT")
                .ok()
                .map(|v| v == "1")
                .unwrap_or(false),
            max_group_index: std::env::var("DISCOVERY_MAX_GROUP_INDEX")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(BIP44_MAX_GROUP_INDEX),
        }
    }
}

impl Config {
    /// 从环境变量加载配置（先读取 .env）
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            logging: LoggingConfig::default(),
            discovery: DiscoveryConfig::default(),
        })
    }

    /// 从配置文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file as TOML")?;

        Ok(config)
    }

    /// 从环境变量和配置文件合并加载（配置文件优先级更高）
    pub fn from_env_and_file<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut config = Self::from_env()?;

        if let Some(path) = path {
            if path.as_ref().exists() {
                config = Self::from_file(path)?;
            }
        }

        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!("LOG_LEVEL must be one of: {:?}", valid_levels);
        }

        if self.logging.format != "json" && self.logging.format != "text" {
            anyhow::bail!("LOG_FORMAT must be 'json' or 'text'");
        }

        if self.discovery.max_group_index > BIP44_MAX_GROUP_INDEX {
            anyhow::bail!(
                "DISCOVERY_MAX_GROUP_INDEX must not exceed {}",
                BIP44_MAX_GROUP_INDEX
            );
        }

        Ok(())
    }
}
