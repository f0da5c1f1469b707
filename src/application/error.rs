//! 应用层错误定义
//!
//! 会话状态机对调用方暴露的错误类型

use thiserror::Error;

use crate::domain::analysis::AnalysisError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 会话进行中，拒绝新的文件选择
    #[error("Session busy: cannot select a new file while {state}")]
    SessionBusy { state: &'static str },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl ApplicationError {
    /// 创建会话忙错误
    pub fn busy(state: &'static str) -> Self {
        Self::SessionBusy { state }
    }
}

impl From<AnalysisError> for ApplicationError {
    fn from(err: AnalysisError) -> Self {
        Self::ValidationError(err.to_string())
    }
}
