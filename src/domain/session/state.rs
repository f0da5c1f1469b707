//! Session Context - State

use crate::domain::analysis::{AnalysisResult, JobHandle};

/// 会话状态
///
/// 不变量:
/// - 只有 Idle / Done / Errored 接受新的文件选择
/// - Uploading / Polling 期间最多一个在途会话
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Uploading,
    Polling(JobHandle),
    Done(AnalysisResult),
    Errored(String),
}

impl SessionState {
    /// 是否接受新的文件选择
    pub fn accepts_selection(&self) -> bool {
        matches!(
            self,
            SessionState::Idle | SessionState::Done(_) | SessionState::Errored(_)
        )
    }

    /// 是否有在途会话
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionState::Uploading | SessionState::Polling(_))
    }

    /// 是否为会话终态（需要新的用户输入才会继续）
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Done(_) | SessionState::Errored(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Uploading => "uploading",
            SessionState::Polling(_) => "polling",
            SessionState::Done(_) => "done",
            SessionState::Errored(_) => "errored",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::{JobId, PredictionScore};

    #[test]
    fn test_selection_guard() {
        let handle = JobHandle::new(JobId::new("job-1").unwrap());
        let result = AnalysisResult::new(PredictionScore::new(0.9).unwrap(), None);

        assert!(SessionState::Idle.accepts_selection());
        assert!(SessionState::Done(result).accepts_selection());
        assert!(SessionState::Errored("x".to_string()).accepts_selection());
        assert!(!SessionState::Uploading.accepts_selection());
        assert!(!SessionState::Polling(handle.clone()).accepts_selection());

        assert!(SessionState::Polling(handle).is_busy());
        assert!(!SessionState::Idle.is_terminal());
        assert_eq!(SessionState::default(), SessionState::Idle);
    }
}
