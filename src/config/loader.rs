//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "TUMORLENS";

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `TUMORLENS_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `TUMORLENS_GATEWAY__URL=http://inference:8000`
/// - `TUMORLENS_POLLING__INTERVAL_MS=2000`
/// - `TUMORLENS_POLLING__MAX_ATTEMPTS=90`
/// - `TUMORLENS_LOG__LEVEL=debug`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("gateway.url", "http://localhost:8000")?
        .set_default("gateway.timeout_secs", 30)?
        .set_default("gateway.upload_max_retries", 0)?
        .set_default("gateway.upload_retry_backoff_ms", 500)?
        .set_default("polling.interval_ms", 2000)?
        .set_default("polling.max_attempts", 0)?
        .set_default("upload.enforce_extensions", false)?
        .set_default("log.level", "info")?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: TUMORLENS_GATEWAY__URL=http://inference:8000
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.gateway.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Gateway URL cannot be empty".to_string(),
        ));
    }

    if config.gateway.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Gateway timeout cannot be 0".to_string(),
        ));
    }

    if config.polling.interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "Polling interval cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Gateway URL: {}", config.gateway.url);
    tracing::info!("Gateway Timeout: {}s", config.gateway.timeout_secs);
    tracing::info!("Upload Max Retries: {}", config.gateway.upload_max_retries);
    tracing::info!("Poll Interval: {}ms", config.polling.interval_ms);
    if config.polling.max_attempts == 0 {
        tracing::info!("Poll Max Attempts: unlimited");
    } else {
        tracing::info!("Poll Max Attempts: {}", config.polling.max_attempts);
    }
    tracing::info!("Enforce Extensions: {}", config.upload.enforce_extensions);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
