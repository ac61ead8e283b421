//! 日志系统配置模块
//! 支持结构化日志和日志级别配置

use anyhow::Result;
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

use crate::config::LoggingConfig;

/// 初始化日志系统
///
/// 全局订阅者已安装时返回错误
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    // RUST_LOG 优先于配置
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.format == "json" {
        Registry::default()
            .with(filter)
            .with(fmt::layer().json().with_timer(ChronoUtc::rfc_3339()))
            .try_init()?;
    } else {
        Registry::default()
            .with(filter)
            .with(
                fmt::layer()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(true),
            )
            .try_init()?;
    }

    Ok(())
}

/// 简化初始化（使用默认配置）
pub fn init_default_logging() {
    let config = LoggingConfig::default();
    if let Err(e) = init_logging(&config) {
        eprintln!("Failed to initialize logging: {}", e);
        // 回退到最基本的日志初始化
        let _ = tracing_subscriber::fmt().try_init();
    }
}
