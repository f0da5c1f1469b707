//! Fake Gateway - 用于测试的分析网关
//!
//! 不发起网络请求，按脚本返回上传结果与任务状态，并记录每次调用

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use crate::application::ports::{PollError, StatusPollerPort, UploadError, UploadGatewayPort};
use crate::domain::analysis::{JobHandle, JobId, JobStatus, UploadRequest};

/// Fake Gateway 配置
#[derive(Debug, Clone, Default)]
pub struct FakeGatewayConfig {
    /// 模拟上传耗时
    pub upload_delay: Duration,
    /// 模拟单次状态查询耗时
    pub poll_delay: Duration,
}

/// 一次状态查询的记录
#[derive(Debug, Clone)]
pub struct PollRecord {
    pub job_id: String,
    pub at: Instant,
}

/// Fake Gateway
///
/// - 上传脚本为空时，按 `{时间戳}_{文件名}` 生成任务 ID 并接受上传
/// - 某任务的状态脚本为空时，始终返回 `Pending`
pub struct FakeGateway {
    config: FakeGatewayConfig,
    uploads: Mutex<VecDeque<Result<String, UploadError>>>,
    statuses: Mutex<HashMap<String, VecDeque<Result<JobStatus, PollError>>>>,
    uploaded_files: Mutex<Vec<String>>,
    polls: Mutex<Vec<PollRecord>>,
}

impl FakeGateway {
    pub fn new(config: FakeGatewayConfig) -> Self {
        Self {
            config,
            uploads: Mutex::new(VecDeque::new()),
            statuses: Mutex::new(HashMap::new()),
            uploaded_files: Mutex::new(Vec::new()),
            polls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(FakeGatewayConfig::default())
    }

    /// 追加一次上传结果（Ok 为任务 ID）
    pub fn script_upload(&self, outcome: Result<&str, UploadError>) {
        self.uploads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(outcome.map(str::to_string));
    }

    /// 追加某任务的状态序列
    pub fn script_statuses(&self, job_id: &str, statuses: Vec<Result<JobStatus, PollError>>) {
        self.statuses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(job_id.to_string())
            .or_default()
            .extend(statuses);
    }

    /// 已上传的文件名
    pub fn uploaded_files(&self) -> Vec<String> {
        self.uploaded_files
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// 全部状态查询记录
    pub fn polls(&self) -> Vec<PollRecord> {
        self.polls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// 某任务的状态查询次数
    pub fn poll_count(&self, job_id: &str) -> usize {
        self.polls()
            .iter()
            .filter(|p| p.job_id == job_id)
            .count()
    }
}

#[async_trait]
impl UploadGatewayPort for FakeGateway {
    async fn submit(&self, request: UploadRequest) -> Result<JobHandle, UploadError> {
        if !self.config.upload_delay.is_zero() {
            tokio::time::sleep(self.config.upload_delay).await;
        }

        self.uploaded_files
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.file_name().to_string());

        let scripted = self
            .uploads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        let job_id = match scripted {
            Some(outcome) => outcome?,
            None => format!(
                "{}_{}",
                Utc::now().format("%Y%m%d_%H%M%S"),
                request.file_name()
            ),
        };

        tracing::debug!(job_id = %job_id, "FakeGateway: upload accepted");

        let job_id = JobId::new(job_id)
            .ok_or_else(|| UploadError::InvalidResponse("empty job id".to_string()))?;
        Ok(JobHandle::new(job_id))
    }
}

#[async_trait]
impl StatusPollerPort for FakeGateway {
    async fn poll(&self, handle: &JobHandle) -> Result<JobStatus, PollError> {
        let job_id = handle.job_id.as_str().to_string();
        self.polls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(PollRecord {
                job_id: job_id.clone(),
                at: Instant::now(),
            });

        if !self.config.poll_delay.is_zero() {
            tokio::time::sleep(self.config.poll_delay).await;
        }

        self.statuses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get_mut(&job_id)
            .and_then(|queue| queue.pop_front())
            .unwrap_or(Ok(JobStatus::Pending))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::{AnalysisResult, PredictionScore};

    #[tokio::test]
    async fn test_default_upload_naming() {
        let gateway = FakeGateway::with_defaults();
        let request = UploadRequest::new("brain.nii.gz", vec![0u8; 16]).unwrap();

        let handle = gateway.submit(request).await.unwrap();
        assert!(handle.job_id.as_str().ends_with("_brain.nii.gz"));
        assert_eq!(gateway.uploaded_files(), vec!["brain.nii.gz".to_string()]);
    }

    #[tokio::test]
    async fn test_scripted_statuses_then_pending() {
        let gateway = FakeGateway::with_defaults();
        gateway.script_upload(Ok("job-a"));
        let result = AnalysisResult::new(PredictionScore::new(0.4).unwrap(), None);
        gateway.script_statuses("job-a", vec![Ok(JobStatus::Completed(result.clone()))]);

        let handle = gateway
            .submit(UploadRequest::new("a.dcm", vec![1]).unwrap())
            .await
            .unwrap();
        assert_eq!(handle.job_id.as_str(), "job-a");

        assert_eq!(gateway.poll(&handle).await.unwrap(), JobStatus::Completed(result));
        assert_eq!(gateway.poll(&handle).await.unwrap(), JobStatus::Pending);
        assert_eq!(gateway.poll_count("job-a"), 2);
    }

    #[tokio::test]
    async fn test_scripted_upload_error() {
        let gateway = FakeGateway::with_defaults();
        gateway.script_upload(Err(UploadError::Timeout));

        let err = gateway
            .submit(UploadRequest::new("a.dcm", vec![1]).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Timeout));
    }
}
