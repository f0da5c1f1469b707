//! Upload Gateway Port - 影像上传
//!
//! 定义上传的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::analysis::{JobHandle, UploadRequest};

/// 上传错误
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Upload timeout")]
    Timeout,

    #[error("Upload rejected: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid upload response: {0}")]
    InvalidResponse(String),

    #[error("Invalid upload request: {0}")]
    InvalidRequest(String),
}

impl UploadError {
    /// 是否属于可重试的传输错误
    pub fn is_transient(&self) -> bool {
        matches!(self, UploadError::NetworkError(_) | UploadError::Timeout)
    }

    /// 日志用的错误分类
    pub fn kind(&self) -> &'static str {
        match self {
            UploadError::NetworkError(_) => "network",
            UploadError::Timeout => "timeout",
            UploadError::Rejected { .. } => "rejected",
            UploadError::InvalidResponse(_) => "invalid_response",
            UploadError::InvalidRequest(_) => "invalid_request",
        }
    }
}

/// Upload Gateway Port
///
/// 无状态：每次调用恰好发出一次上传请求（除非实现显式配置了重试）。
/// 同一会话不允许并发调用，由会话状态机保证。
#[async_trait]
pub trait UploadGatewayPort: Send + Sync {
    /// 上传影像文件，成功时返回任务句柄
    async fn submit(&self, request: UploadRequest) -> Result<JobHandle, UploadError>;

    /// 检查分析后端是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
