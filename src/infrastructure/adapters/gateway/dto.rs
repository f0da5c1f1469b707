//! Gateway DTOs - 分析后端的线上 JSON 结构
//!
//! 只在边界处解析一次，转换为领域类型后不再向内传播原始字段

use serde::Deserialize;

use crate::application::ports::PollError;
use crate::domain::analysis::{AnalysisResult, JobStatus, PredictionScore};

pub const STATUS_PENDING: &str = "pending_analysis";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_FAILED: &str = "failed";

/// `POST /upload/` 响应
#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub filename: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// `GET /analysis/{filename}` 响应
#[derive(Debug, Deserialize)]
pub struct AnalysisResponse {
    pub status: String,
    #[serde(default)]
    pub prediction: Option<f64>,
    #[serde(default)]
    pub visualization: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TryFrom<AnalysisResponse> for JobStatus {
    type Error = PollError;

    fn try_from(resp: AnalysisResponse) -> Result<Self, Self::Error> {
        match resp.status.as_str() {
            STATUS_PENDING => Ok(JobStatus::Pending),
            STATUS_COMPLETED => {
                let prediction = resp.prediction.ok_or_else(|| {
                    PollError::InvalidResponse("completed analysis without prediction".to_string())
                })?;
                let score = PredictionScore::new(prediction)
                    .map_err(|e| PollError::InvalidResponse(e.to_string()))?;
                Ok(JobStatus::Completed(AnalysisResult::new(
                    score,
                    resp.visualization,
                )))
            }
            STATUS_FAILED => Ok(JobStatus::Failed(
                resp.error
                    .or(resp.message)
                    .unwrap_or_else(|| "Analysis failed".to_string()),
            )),
            other => Err(PollError::UnexpectedStatus(other.to_string())),
        }
    }
}
