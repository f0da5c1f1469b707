//! HTTP Gateway Client - 调用分析后端 HTTP 服务
//!
//! 同时实现 UploadGatewayPort 与 StatusPollerPort
//!
//! 后端 API:
//! POST {base_url}/upload/               multipart, 字段 `file`
//!   Response: {"filename": "...", "message": "...", "status": "pending_analysis"}
//! GET  {base_url}/analysis/{filename}
//!   Response: {"status": "pending_analysis" | "completed" | "failed", "prediction"?: 0.87, "visualization"?: "..."}

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use std::time::Duration;

use super::dto::{AnalysisResponse, UploadResponse};
use crate::application::ports::{PollError, StatusPollerPort, UploadError, UploadGatewayPort};
use crate::domain::analysis::{JobHandle, JobId, JobStatus, UploadRequest};

/// HTTP Gateway 客户端配置
#[derive(Debug, Clone)]
pub struct HttpGatewayClientConfig {
    /// 分析后端基础 URL
    pub base_url: String,
    /// 单次请求超时时间（秒）
    pub timeout_secs: u64,
    /// 上传失败的最大重试次数，仅针对网络错误与超时；0 表示不重试
    pub upload_max_retries: u32,
    /// 首次重试前的等待时间（毫秒），之后每次翻倍
    pub upload_retry_backoff_ms: u64,
}

impl Default for HttpGatewayClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
            upload_max_retries: 0,
            upload_retry_backoff_ms: 500,
        }
    }
}

impl HttpGatewayClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_upload_retries(mut self, max_retries: u32, backoff_ms: u64) -> Self {
        self.upload_max_retries = max_retries;
        self.upload_retry_backoff_ms = backoff_ms;
        self
    }
}

/// HTTP Gateway 客户端
///
/// 无状态，可被上传与轮询共享
pub struct HttpGatewayClient {
    client: Client,
    config: HttpGatewayClientConfig,
}

impl HttpGatewayClient {
    /// 创建新的 HTTP Gateway 客户端
    pub fn new(config: HttpGatewayClientConfig) -> Result<Self, UploadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| UploadError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// 获取上传 URL
    fn upload_url(&self) -> String {
        format!("{}/upload/", self.base_url())
    }

    /// 获取状态查询 URL，任务 ID 作为单个路径段编码
    fn analysis_url(&self, job_id: &JobId) -> Result<Url, PollError> {
        let mut url = Url::parse(&format!("{}/analysis/", self.base_url()))
            .map_err(|e| PollError::InvalidResponse(format!("Invalid base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| PollError::InvalidResponse("Base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push(job_id.as_str());
        Ok(url)
    }

    /// 获取健康检查 URL
    fn health_url(&self) -> String {
        format!("{}/", self.base_url())
    }

    /// 发送一次上传请求
    async fn submit_once(
        &self,
        file_name: &str,
        mime_hint: &str,
        file_bytes: Vec<u8>,
    ) -> Result<JobHandle, UploadError> {
        let part = Part::bytes(file_bytes)
            .file_name(file_name.to_string())
            .mime_str(mime_hint)
            .map_err(|e| UploadError::InvalidRequest(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    UploadError::Timeout
                } else if e.is_connect() {
                    UploadError::NetworkError(format!("Cannot connect to analysis service: {}", e))
                } else {
                    UploadError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| UploadError::InvalidResponse(format!("Failed to decode body: {}", e)))?;

        let job_id = body
            .filename
            .and_then(JobId::new)
            .ok_or_else(|| UploadError::InvalidResponse("Missing filename".to_string()))?;

        tracing::debug!(
            job_id = %job_id,
            backend_status = ?body.status,
            backend_message = ?body.message,
            "Upload accepted"
        );

        Ok(JobHandle::new(job_id))
    }
}

#[async_trait]
impl UploadGatewayPort for HttpGatewayClient {
    async fn submit(&self, request: UploadRequest) -> Result<JobHandle, UploadError> {
        let (file_name, mime_hint, file_bytes) = request.into_parts();

        tracing::debug!(
            url = %self.upload_url(),
            file_name = %file_name,
            mime = %mime_hint,
            size = file_bytes.len(),
            "Sending upload request"
        );

        let mut attempt: u32 = 0;
        loop {
            let result = self
                .submit_once(&file_name, &mime_hint, file_bytes.clone())
                .await;

            match result {
                Err(e) if e.is_transient() && attempt < self.config.upload_max_retries => {
                    let backoff = Duration::from_millis(
                        self.config
                            .upload_retry_backoff_ms
                            .saturating_mul(1u64 << attempt.min(16)),
                    );
                    attempt += 1;
                    tracing::warn!(
                        attempt = attempt,
                        max_retries = self.config.upload_max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Upload failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Ok(handle) => {
                    tracing::info!(
                        job_id = %handle.job_id,
                        file_name = %file_name,
                        "Upload completed"
                    );
                    return Ok(handle);
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[async_trait]
impl StatusPollerPort for HttpGatewayClient {
    async fn poll(&self, handle: &JobHandle) -> Result<JobStatus, PollError> {
        let url = self.analysis_url(&handle.job_id)?;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                PollError::Timeout
            } else {
                PollError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PollError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body: AnalysisResponse = response
            .json()
            .await
            .map_err(|e| PollError::InvalidResponse(format!("Failed to decode body: {}", e)))?;

        JobStatus::try_from(body)
    }
}
