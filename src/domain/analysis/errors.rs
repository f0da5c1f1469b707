//! Analysis Context - Errors

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error("预测分数超出范围 [0, 1]: {0}")]
    ScoreOutOfRange(f64),

    #[error("上传文件为空")]
    EmptyFile,

    #[error("文件名不能为空")]
    EmptyFileName,

    #[error("不支持的影像格式: {0}")]
    UnsupportedFormat(String),

    #[error("读取文件失败: {0}")]
    ReadFailed(String),
}
