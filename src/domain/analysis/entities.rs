//! Analysis Context - Entities

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

use super::{AnalysisError, JobId, PredictionScore, ScanFormat};

const DEFAULT_MIME: &str = "application/octet-stream";

/// 上传请求
///
/// 不变量:
/// - 文件内容与文件名均非空
/// - 构造后不可修改，由上传客户端按值消费（一次性）
#[derive(Debug, Clone)]
pub struct UploadRequest {
    file_bytes: Vec<u8>,
    file_name: String,
    mime_hint: String,
}

impl UploadRequest {
    /// 创建上传请求，mime 提示由文件后缀推断
    pub fn new(file_name: impl Into<String>, file_bytes: Vec<u8>) -> Result<Self, AnalysisError> {
        let file_name = file_name.into();
        if file_name.trim().is_empty() {
            return Err(AnalysisError::EmptyFileName);
        }
        if file_bytes.is_empty() {
            return Err(AnalysisError::EmptyFile);
        }

        let mime_hint = ScanFormat::detect(&file_name)
            .map(|f| f.mime_type())
            .unwrap_or(DEFAULT_MIME)
            .to_string();

        Ok(Self {
            file_bytes,
            file_name,
            mime_hint,
        })
    }

    /// 从本地文件读取
    pub async fn from_path(path: &Path) -> Result<Self, AnalysisError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or(AnalysisError::EmptyFileName)?
            .to_string();

        let file_bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AnalysisError::ReadFailed(format!("{}: {}", path.display(), e)))?;

        Self::new(file_name, file_bytes)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_hint(&self) -> &str {
        &self.mime_hint
    }

    pub fn len(&self) -> usize {
        self.file_bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file_bytes.is_empty()
    }

    pub fn format(&self) -> Option<ScanFormat> {
        ScanFormat::detect(&self.file_name)
    }

    /// 拆解为 (文件名, mime, 字节)，供传输层消费
    pub fn into_parts(self) -> (String, String, Vec<u8>) {
        (self.file_name, self.mime_hint, self.file_bytes)
    }
}

/// 任务句柄
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobHandle {
    pub job_id: JobId,
    pub submitted_at: DateTime<Utc>,
}

impl JobHandle {
    pub fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            submitted_at: Utc::now(),
        }
    }
}

/// 分析结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    prediction_score: PredictionScore,
    visualization: Option<String>,
}

impl AnalysisResult {
    pub fn new(prediction_score: PredictionScore, visualization: Option<String>) -> Self {
        Self {
            prediction_score,
            visualization,
        }
    }

    pub fn prediction_score(&self) -> PredictionScore {
        self.prediction_score
    }

    /// 可视化图像引用（URI）
    pub fn visualization(&self) -> Option<&str> {
        self.visualization.as_deref()
    }
}

/// 单次状态查询的结果
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    Pending,
    Completed(AnalysisResult),
    /// 后端报告的分析失败（合法的终态，不是传输错误）
    Failed(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_upload_request_mime_hint() {
        let req = UploadRequest::new("scan.dcm", vec![1, 2, 3]).unwrap();
        assert_eq!(req.mime_hint(), "application/dicom");
        assert_eq!(req.len(), 3);

        let req = UploadRequest::new("scan.nii.gz", vec![1]).unwrap();
        assert_eq!(req.mime_hint(), "application/gzip");

        let req = UploadRequest::new("scan.png", vec![1]).unwrap();
        assert_eq!(req.mime_hint(), "application/octet-stream");
        assert!(req.format().is_none());
    }

    #[test]
    fn test_upload_request_validation() {
        assert_eq!(
            UploadRequest::new("scan.nii", vec![]).unwrap_err(),
            AnalysisError::EmptyFile
        );
        assert_eq!(
            UploadRequest::new(" ", vec![1]).unwrap_err(),
            AnalysisError::EmptyFileName
        );
    }

    #[tokio::test]
    async fn test_upload_request_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brain.nii");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"nifti-bytes").unwrap();

        let req = UploadRequest::from_path(&path).await.unwrap();
        assert_eq!(req.file_name(), "brain.nii");
        assert_eq!(req.format(), Some(ScanFormat::Nifti));

        let (name, mime, bytes) = req.into_parts();
        assert_eq!(name, "brain.nii");
        assert_eq!(mime, "application/octet-stream");
        assert_eq!(bytes, b"nifti-bytes");
    }

    #[tokio::test]
    async fn test_upload_request_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = UploadRequest::from_path(&dir.path().join("missing.dcm")).await;
        assert!(matches!(result, Err(AnalysisError::ReadFailed(_))));
    }

    #[test]
    fn test_job_status_terminal() {
        let result = AnalysisResult::new(PredictionScore::new(0.7).unwrap(), None);
        assert!(!JobStatus::Pending.is_terminal());
        assert!(JobStatus::Completed(result).is_terminal());
        assert!(JobStatus::Failed("boom".to_string()).is_terminal());
    }
}
