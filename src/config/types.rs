//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::time::Duration;

use crate::application::{PollPolicy, SessionMachineConfig};
use crate::infrastructure::adapters::HttpGatewayClientConfig;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 分析后端配置
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// 轮询配置
    #[serde(default)]
    pub polling: PollingConfig,

    /// 上传配置
    #[serde(default)]
    pub upload: UploadConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// 状态机配置
    pub fn session_machine(&self) -> SessionMachineConfig {
        SessionMachineConfig {
            poll_policy: self.polling.policy(),
            enforce_extensions: self.upload.enforce_extensions,
        }
    }
}

/// 分析后端配置
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// 后端基础 URL
    #[serde(default = "default_gateway_url")]
    pub url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_gateway_timeout")]
    pub timeout_secs: u64,

    /// 上传最大重试次数，0 表示失败即返回
    #[serde(default)]
    pub upload_max_retries: u32,

    /// 上传重试初始退避（毫秒）
    #[serde(default = "default_upload_retry_backoff")]
    pub upload_retry_backoff_ms: u64,
}

fn default_gateway_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_gateway_timeout() -> u64 {
    30
}

fn default_upload_retry_backoff() -> u64 {
    500
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: default_gateway_url(),
            timeout_secs: default_gateway_timeout(),
            upload_max_retries: 0,
            upload_retry_backoff_ms: default_upload_retry_backoff(),
        }
    }
}

impl GatewayConfig {
    /// 转换为 HTTP 客户端配置
    pub fn client_config(&self) -> HttpGatewayClientConfig {
        HttpGatewayClientConfig::new(self.url.clone())
            .with_timeout(self.timeout_secs)
            .with_upload_retries(self.upload_max_retries, self.upload_retry_backoff_ms)
    }
}

/// 轮询配置
#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    /// 轮询间隔（毫秒）
    #[serde(default = "default_poll_interval")]
    pub interval_ms: u64,

    /// 最大查询次数，0 表示不限
    #[serde(default)]
    pub max_attempts: u32,
}

fn default_poll_interval() -> u64 {
    crate::application::DEFAULT_POLL_INTERVAL_MS
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval(),
            max_attempts: 0,
        }
    }
}

impl PollingConfig {
    pub fn policy(&self) -> PollPolicy {
        PollPolicy::fixed(Duration::from_millis(self.interval_ms))
            .with_max_attempts(self.max_attempts)
    }
}

/// 上传配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadConfig {
    /// 是否拒绝非 .nii / .nii.gz / .dcm 文件
    #[serde(default)]
    pub enforce_extensions: bool,
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
