//! Status Poller Port - 任务状态查询
//!
//! 单次查询的抽象接口；循环驱动见 application::polling

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::analysis::{JobHandle, JobStatus};

/// 状态查询错误
///
/// 注意：后端返回的 `failed` 状态是合法终态 (`JobStatus::Failed`)，不属于此错误
#[derive(Debug, Error)]
pub enum PollError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Status query timeout")]
    Timeout,

    #[error("Status query failed: HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("Invalid status response: {0}")]
    InvalidResponse(String),

    #[error("Unexpected analysis status: {0}")]
    UnexpectedStatus(String),

    #[error("Analysis still pending after {attempts} status queries")]
    AttemptsExhausted { attempts: u32 },
}

impl PollError {
    /// 日志用的错误分类
    pub fn kind(&self) -> &'static str {
        match self {
            PollError::NetworkError(_) => "network",
            PollError::Timeout => "timeout",
            PollError::HttpStatus { .. } => "http_status",
            PollError::InvalidResponse(_) => "invalid_response",
            PollError::UnexpectedStatus(_) => "unexpected_status",
            PollError::AttemptsExhausted { .. } => "attempts_exhausted",
        }
    }
}

/// Status Poller Port
#[async_trait]
pub trait StatusPollerPort: Send + Sync {
    /// 查询一次任务状态
    async fn poll(&self, handle: &JobHandle) -> Result<JobStatus, PollError>;
}
