//! Status Polling Loop - 固定间隔轮询
//!
//! 对同一任务的查询严格串行：上一次查询返回（并等待固定间隔）之后才会发起下一次

use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{PollError, StatusPollerPort};
use crate::domain::analysis::{AnalysisResult, JobHandle, JobStatus};

/// 默认轮询间隔（毫秒）
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// 轮询策略
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    /// 两次查询之间的固定间隔
    pub interval: Duration,
    /// 最大查询次数，None 表示不限
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_attempts: None,
        }
    }
}

impl PollPolicy {
    pub fn fixed(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }

    /// 0 表示不限
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = (max_attempts > 0).then_some(max_attempts);
        self
    }
}

/// 轮询终止结果
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Completed(AnalysisResult),
    Failed(String),
    /// 会话被取代，未产生结果
    Cancelled,
}

/// 轮询直到终态
///
/// 第一次查询立即发出；每次 `Pending` 之后等待 `policy.interval` 再查询一次。
/// 取消令牌在查询或等待期间触发都会立即返回 `Cancelled`。
pub async fn poll_until_terminal(
    poller: &dyn StatusPollerPort,
    handle: &JobHandle,
    policy: &PollPolicy,
    cancel: &CancellationToken,
) -> Result<PollOutcome, PollError> {
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;

        let status = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(PollOutcome::Cancelled),
            status = poller.poll(handle) => status?,
        };

        tracing::debug!(
            job_id = %handle.job_id,
            attempt = attempts,
            terminal = status.is_terminal(),
            "Status polled"
        );

        match status {
            JobStatus::Completed(result) => return Ok(PollOutcome::Completed(result)),
            JobStatus::Failed(reason) => return Ok(PollOutcome::Failed(reason)),
            JobStatus::Pending => {}
        }

        if let Some(max) = policy.max_attempts {
            if attempts >= max {
                return Err(PollError::AttemptsExhausted { attempts });
            }
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(PollOutcome::Cancelled),
            _ = tokio::time::sleep(policy.interval) => {}
        }
    }
}
