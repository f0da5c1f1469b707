//! Analysis Context - 影像分析限界上下文
//!
//! 职责:
//! - 上传请求的构造与校验
//! - 任务句柄与任务状态
//! - 分析结果（预测分数、可视化）

mod entities;
mod errors;
mod value_objects;

pub use entities::{AnalysisResult, JobHandle, JobStatus, UploadRequest};
pub use errors::AnalysisError;
pub use value_objects::{JobId, PredictionScore, ScanFormat};
