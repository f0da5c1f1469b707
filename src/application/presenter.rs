//! Result Presenter - 分析结果展示投影
//!
//! 纯函数，无副作用、无失败路径

use serde::Serialize;

use crate::domain::analysis::AnalysisResult;
use crate::domain::session::SessionState;

/// 判定阈值：分数严格大于此值才认为检测到肿瘤
pub const TUMOR_THRESHOLD: f64 = 0.5;

/// 诊断标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Diagnosis {
    #[serde(rename = "Tumor Detected")]
    TumorDetected,
    #[serde(rename = "No Tumor Detected")]
    NoTumorDetected,
}

impl Diagnosis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Diagnosis::TumorDetected => "Tumor Detected",
            Diagnosis::NoTumorDetected => "No Tumor Detected",
        }
    }
}

impl std::fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 可展示的结果摘要
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSummary {
    pub label: Diagnosis,
    /// 置信度百分比，保留两位小数
    pub confidence_percent: f64,
    pub has_visualization: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visualization: Option<String>,
}

impl ResultSummary {
    /// 如 `86.75%`
    pub fn confidence_label(&self) -> String {
        format!("{:.2}%", self.confidence_percent)
    }
}

/// 派生视图状态
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", content = "data", rename_all = "snake_case")]
pub enum SessionView {
    Idle,
    Busy,
    Error(String),
    Result(ResultSummary),
}

/// 将分析结果投影为展示摘要
pub fn present(result: &AnalysisResult) -> ResultSummary {
    let score = result.prediction_score().value();
    let label = if score > TUMOR_THRESHOLD {
        Diagnosis::TumorDetected
    } else {
        Diagnosis::NoTumorDetected
    };

    ResultSummary {
        label,
        confidence_percent: (score * 100.0 * 100.0).round() / 100.0,
        has_visualization: result.visualization().is_some(),
        visualization: result.visualization().map(str::to_string),
    }
}

/// 从会话状态派生视图（Uploading / Polling 均为 Busy）
pub fn view(state: &SessionState) -> SessionView {
    match state {
        SessionState::Idle => SessionView::Idle,
        SessionState::Uploading | SessionState::Polling(_) => SessionView::Busy,
        SessionState::Errored(message) => SessionView::Error(message.clone()),
        SessionState::Done(result) => SessionView::Result(present(result)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::{JobHandle, JobId, PredictionScore};

    fn result(score: f64, visualization: Option<&str>) -> AnalysisResult {
        AnalysisResult::new(
            PredictionScore::new(score).unwrap(),
            visualization.map(str::to_string),
        )
    }

    #[test]
    fn test_threshold_is_exclusive() {
        assert_eq!(present(&result(0.5, None)).label, Diagnosis::NoTumorDetected);
        assert_eq!(present(&result(0.500001, None)).label, Diagnosis::TumorDetected);
        assert_eq!(present(&result(0.499999, None)).label, Diagnosis::NoTumorDetected);
        assert_eq!(present(&result(0.0, None)).label, Diagnosis::NoTumorDetected);
        assert_eq!(present(&result(1.0, None)).label, Diagnosis::TumorDetected);
    }

    #[test]
    fn test_threshold_sweep() {
        for i in 0..=1000 {
            let p = i as f64 / 1000.0;
            let expected = if p > 0.5 {
                Diagnosis::TumorDetected
            } else {
                Diagnosis::NoTumorDetected
            };
            assert_eq!(present(&result(p, None)).label, expected, "score {}", p);
        }
    }

    #[test]
    fn test_confidence_formatting() {
        let summary = present(&result(0.8675, None));
        assert_eq!(summary.confidence_percent, 86.75);
        assert_eq!(summary.confidence_label(), "86.75%");

        let summary = present(&result(0.12346, None));
        assert_eq!(summary.confidence_label(), "12.35%");
    }

    #[test]
    fn test_no_tumor_without_visualization() {
        let summary = present(&result(0.3, None));
        assert_eq!(summary.label, Diagnosis::NoTumorDetected);
        assert_eq!(summary.confidence_percent, 30.0);
        assert_eq!(summary.confidence_label(), "30.00%");
        assert!(!summary.has_visualization);
    }

    #[test]
    fn test_visualization_passthrough() {
        let summary = present(&result(0.91, Some("data:image/png;base64,AAAA")));
        assert!(summary.has_visualization);
        assert_eq!(summary.visualization.as_deref(), Some("data:image/png;base64,AAAA"));
    }

    #[test]
    fn test_view_projection() {
        let handle = JobHandle::new(JobId::new("job").unwrap());
        assert_eq!(view(&SessionState::Idle), SessionView::Idle);
        assert_eq!(view(&SessionState::Uploading), SessionView::Busy);
        assert_eq!(view(&SessionState::Polling(handle)), SessionView::Busy);
        assert_eq!(
            view(&SessionState::Errored("Upload timeout".to_string())),
            SessionView::Error("Upload timeout".to_string())
        );
        assert!(matches!(
            view(&SessionState::Done(result(0.7, None))),
            SessionView::Result(ResultSummary { label: Diagnosis::TumorDetected, .. })
        ));
    }

    #[test]
    fn test_summary_serialization() {
        let json = serde_json::to_value(present(&result(0.3, None))).unwrap();
        assert_eq!(json["label"], "No Tumor Detected");
        assert_eq!(json["confidence_percent"], 30.0);
        assert_eq!(json["has_visualization"], false);
        assert!(json.get("visualization").is_none());
    }
}
