//! Console Reporter - 订阅会话状态并输出视图
//!
//! 只读观察者，不持有也不修改会话状态

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::application::presenter::{self, SessionView};
use crate::domain::session::SessionState;

/// 控制台报告器
pub struct ConsoleReporter;

impl ConsoleReporter {
    /// 启动订阅任务，在发送端关闭时结束
    pub fn spawn(mut rx: watch::Receiver<SessionState>) -> JoinHandle<Vec<SessionView>> {
        tokio::spawn(async move {
            let mut seen = Vec::new();
            loop {
                let view = presenter::view(&rx.borrow_and_update());
                Self::report(&view);
                seen.push(view);

                if rx.changed().await.is_err() {
                    break;
                }
            }
            seen
        })
    }

    fn report(view: &SessionView) {
        match view {
            SessionView::Idle => tracing::info!("Waiting for a scan"),
            SessionView::Busy => tracing::info!("Analyzing scan..."),
            SessionView::Error(message) => tracing::error!(error = %message, "Analysis failed"),
            SessionView::Result(summary) => tracing::info!(
                label = %summary.label,
                confidence = %summary.confidence_label(),
                has_visualization = summary.has_visualization,
                "Analysis result"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::{AnalysisResult, PredictionScore};

    #[tokio::test]
    async fn test_reporter_collects_views_until_closed() {
        let (tx, rx) = watch::channel(SessionState::Idle);
        let task = ConsoleReporter::spawn(rx);

        tokio::task::yield_now().await;
        tx.send_replace(SessionState::Done(AnalysisResult::new(
            PredictionScore::new(0.75).unwrap(),
            None,
        )));
        drop(tx);

        let seen = task.await.unwrap();
        assert!(!seen.is_empty());
        assert!(matches!(seen.last(), Some(SessionView::Result(_))));
    }
}
