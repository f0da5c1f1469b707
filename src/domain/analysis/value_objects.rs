//! Analysis Context - Value Objects

use serde::{Deserialize, Serialize};

use super::AnalysisError;

/// 任务标识（后端返回的不透明字符串）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return None;
        }
        Some(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 预测分数
///
/// 不变量:
/// - 取值范围 [0, 1]，NaN 不合法
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct PredictionScore(f64);

impl PredictionScore {
    pub fn new(value: f64) -> Result<Self, AnalysisError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(AnalysisError::ScoreOutOfRange(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

/// 医学影像格式（仅作提示，服务端不强制）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanFormat {
    /// NIfTI (.nii)
    Nifti,
    /// 压缩 NIfTI (.nii.gz)
    NiftiGz,
    /// DICOM (.dcm)
    Dicom,
}

impl ScanFormat {
    /// 从文件名后缀识别格式（不区分大小写）
    pub fn detect(file_name: &str) -> Option<Self> {
        let lower = file_name.to_lowercase();
        if lower.ends_with(".nii.gz") {
            Some(Self::NiftiGz)
        } else if lower.ends_with(".nii") {
            Some(Self::Nifti)
        } else if lower.ends_with(".dcm") {
            Some(Self::Dicom)
        } else {
            None
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Nifti => "application/octet-stream",
            Self::NiftiGz => "application/gzip",
            Self::Dicom => "application/dicom",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_formats() {
        assert_eq!(ScanFormat::detect("brain.nii"), Some(ScanFormat::Nifti));
        assert_eq!(ScanFormat::detect("BRAIN.NII.GZ"), Some(ScanFormat::NiftiGz));
        assert_eq!(ScanFormat::detect("slice_001.dcm"), Some(ScanFormat::Dicom));
        assert_eq!(ScanFormat::detect("archive.gz"), None);
        assert_eq!(ScanFormat::detect("notes.txt"), None);
    }

    #[test]
    fn test_score_bounds() {
        assert!(PredictionScore::new(0.0).is_ok());
        assert!(PredictionScore::new(1.0).is_ok());
        assert_eq!(
            PredictionScore::new(1.2),
            Err(AnalysisError::ScoreOutOfRange(1.2))
        );
        assert!(PredictionScore::new(-0.01).is_err());
        assert!(PredictionScore::new(f64::NAN).is_err());
    }

    #[test]
    fn test_job_id_rejects_blank() {
        assert!(JobId::new("").is_none());
        assert!(JobId::new("   ").is_none());
        assert_eq!(JobId::new("20240101_120000_scan.nii").unwrap().as_str(), "20240101_120000_scan.nii");
    }
}
