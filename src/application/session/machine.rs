//! Session State Machine - 单会话提交/轮询状态机
//!
//! 状态转移:
//! ```text
//! Idle           --select-->            Uploading
//! Uploading      --submit ok-->         Polling(handle)
//! Uploading      --submit err-->        Errored(msg)
//! Polling(h)     --Pending-->           Polling(h)   (固定间隔后)
//! Polling(h)     --Completed(r)-->      Done(r)
//! Polling(h)     --Failed(reason)-->    Errored(reason)
//! Polling(h)     --PollError-->         Errored(msg)
//! Done | Errored --select-->            Uploading    (新会话)
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::polling::{poll_until_terminal, PollOutcome, PollPolicy};
use crate::application::ports::{StatusPollerPort, UploadGatewayPort};
use crate::application::presenter::{self, SessionView};
use crate::domain::analysis::{AnalysisError, UploadRequest};
use crate::domain::session::SessionState;

/// 状态机配置
#[derive(Debug, Clone, Default)]
pub struct SessionMachineConfig {
    /// 状态轮询策略
    pub poll_policy: PollPolicy,
    /// 是否拒绝非 .nii / .nii.gz / .dcm 文件
    pub enforce_extensions: bool,
}

/// 一次被接受的文件选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTicket {
    /// 会话代数
    pub generation: u64,
    /// 日志关联 ID
    pub session_id: Uuid,
}

/// 状态与会话代数，由状态机与其会话任务共享
struct SharedState {
    state_tx: watch::Sender<SessionState>,
    generation: AtomicU64,
}

impl SharedState {
    fn new() -> Self {
        let (state_tx, _) = watch::channel(SessionState::Idle);
        Self {
            state_tx,
            generation: AtomicU64::new(0),
        }
    }

    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// 开启新会话：代数递增并进入 Uploading，二者在同一次写入内完成
    fn begin_session(&self) -> u64 {
        let mut generation = 0;
        self.state_tx.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = SessionState::Uploading;
        });
        generation
    }

    /// 强制回到 Idle 并作废当前代数
    fn reset(&self) -> u64 {
        let mut generation = 0;
        self.state_tx.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = SessionState::Idle;
        });
        generation
    }

    /// 写入会话任务产生的状态；代数不匹配时丢弃并返回 false
    fn apply(&self, generation: u64, next: SessionState) -> bool {
        let to = next.as_str();
        let mut from = "";
        let applied = self.state_tx.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            from = state.as_str();
            *state = next;
            true
        });

        if applied {
            tracing::info!(generation = generation, from = from, to = to, "Session state changed");
        } else {
            tracing::debug!(
                generation = generation,
                current_generation = self.current_generation(),
                to = to,
                "Stale session update discarded"
            );
        }
        applied
    }
}

/// 在途会话
struct ActiveSession {
    ticket: SessionTicket,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ActiveSession {
    fn stop(self) {
        self.cancel.cancel();
        self.task.abort();
        tracing::debug!(
            generation = self.ticket.generation,
            session_id = %self.ticket.session_id,
            "Previous session stopped"
        );
    }
}

/// 会话状态机
///
/// 唯一持有并修改 `SessionState`；订阅方通过 `subscribe()` 只读观察。
/// `select` 会派生 tokio 任务，必须在 tokio runtime 内调用。
pub struct SessionMachine {
    uploader: Arc<dyn UploadGatewayPort>,
    poller: Arc<dyn StatusPollerPort>,
    config: SessionMachineConfig,
    shared: Arc<SharedState>,
    active: Mutex<Option<ActiveSession>>,
}

impl SessionMachine {
    pub fn new(
        uploader: Arc<dyn UploadGatewayPort>,
        poller: Arc<dyn StatusPollerPort>,
        config: SessionMachineConfig,
    ) -> Self {
        Self {
            uploader,
            poller,
            config,
            shared: Arc::new(SharedState::new()),
            active: Mutex::new(None),
        }
    }

    /// 订阅状态变化
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.shared.state_tx.subscribe()
    }

    /// 当前状态快照
    pub fn state(&self) -> SessionState {
        self.shared.state_tx.borrow().clone()
    }

    /// 当前派生视图
    pub fn view(&self) -> SessionView {
        presenter::view(&self.shared.state_tx.borrow())
    }

    /// 当前会话代数
    pub fn generation(&self) -> u64 {
        self.shared.current_generation()
    }

    /// 选择文件并开启新会话
    ///
    /// 仅在 Idle / Done / Errored 时接受；Uploading / Polling 期间返回
    /// `SessionBusy` 且状态保持不变。
    pub fn select(&self, request: UploadRequest) -> Result<SessionTicket, ApplicationError> {
        let mut active = self.lock_active();

        {
            let state = self.shared.state_tx.borrow();
            if !state.accepts_selection() {
                tracing::warn!(
                    state = state.as_str(),
                    file_name = %request.file_name(),
                    "File selection rejected: session in flight"
                );
                return Err(ApplicationError::busy(state.as_str()));
            }
        }

        if request.format().is_none() {
            if self.config.enforce_extensions {
                return Err(AnalysisError::UnsupportedFormat(request.file_name().to_string()).into());
            }
            tracing::warn!(
                file_name = %request.file_name(),
                "Unrecognized scan extension, expected .nii, .nii.gz or .dcm"
            );
        }

        if let Some(previous) = active.take() {
            previous.stop();
        }

        let generation = self.shared.begin_session();
        let ticket = SessionTicket {
            generation,
            session_id: Uuid::new_v4(),
        };

        tracing::info!(
            generation = generation,
            session_id = %ticket.session_id,
            file_name = %request.file_name(),
            size = request.len(),
            "Session started"
        );

        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_session(
            self.shared.clone(),
            self.uploader.clone(),
            self.poller.clone(),
            self.config.poll_policy.clone(),
            ticket,
            cancel.clone(),
            request,
        ));

        *active = Some(ActiveSession {
            ticket,
            cancel,
            task,
        });

        Ok(ticket)
    }

    /// 强制回到 Idle，作废并停止当前会话
    pub fn reset(&self) {
        let mut active = self.lock_active();
        if let Some(previous) = active.take() {
            previous.stop();
        }
        let generation = self.shared.reset();
        tracing::info!(generation = generation, "Session reset");
    }

    /// 等待 `ticket` 对应的会话进入终态（Done / Errored）
    ///
    /// 该会话被新的选择或 reset 取代时返回 `None`；
    /// 之前会话遗留的终态不会被当作结果。
    pub async fn wait_for_terminal(&self, ticket: SessionTicket) -> Option<SessionState> {
        let shared = &self.shared;
        let mut rx = self.subscribe();
        // 代数只在持有写锁时变更，持有读锁期间读取的代数与状态一致
        let state = rx
            .wait_for(|state| {
                shared.current_generation() != ticket.generation || state.is_terminal()
            })
            .await
            .ok()?;

        if shared.current_generation() != ticket.generation {
            tracing::debug!(
                generation = ticket.generation,
                session_id = %ticket.session_id,
                "Session superseded before reaching a terminal state"
            );
            return None;
        }
        Some(state.clone())
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<ActiveSession>> {
        self.active.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for SessionMachine {
    fn drop(&mut self) {
        if let Some(active) = self.lock_active().take() {
            active.stop();
        }
    }
}

/// 会话任务：上传，然后轮询直到终态
async fn run_session(
    shared: Arc<SharedState>,
    uploader: Arc<dyn UploadGatewayPort>,
    poller: Arc<dyn StatusPollerPort>,
    policy: PollPolicy,
    ticket: SessionTicket,
    cancel: CancellationToken,
    request: UploadRequest,
) {
    let generation = ticket.generation;

    let submitted = tokio::select! {
        biased;
        _ = cancel.cancelled() => return,
        submitted = uploader.submit(request) => submitted,
    };

    let handle = match submitted {
        Ok(handle) => handle,
        Err(e) => {
            tracing::warn!(
                generation = generation,
                session_id = %ticket.session_id,
                error_kind = e.kind(),
                error = %e,
                "Upload failed"
            );
            shared.apply(generation, SessionState::Errored(e.to_string()));
            return;
        }
    };

    tracing::info!(
        generation = generation,
        session_id = %ticket.session_id,
        job_id = %handle.job_id,
        "Upload accepted, polling for analysis"
    );

    if !shared.apply(generation, SessionState::Polling(handle.clone())) {
        return;
    }

    let outcome = poll_until_terminal(poller.as_ref(), &handle, &policy, &cancel).await;

    let next = match outcome {
        Ok(PollOutcome::Completed(result)) => {
            tracing::info!(
                generation = generation,
                job_id = %handle.job_id,
                prediction = result.prediction_score().value(),
                "Analysis completed"
            );
            SessionState::Done(result)
        }
        Ok(PollOutcome::Failed(reason)) => {
            tracing::warn!(
                generation = generation,
                job_id = %handle.job_id,
                error_kind = "analysis_failed",
                reason = %reason,
                "Analysis failed"
            );
            SessionState::Errored(reason)
        }
        Ok(PollOutcome::Cancelled) => {
            tracing::debug!(generation = generation, job_id = %handle.job_id, "Polling cancelled");
            return;
        }
        Err(e) => {
            tracing::warn!(
                generation = generation,
                job_id = %handle.job_id,
                error_kind = e.kind(),
                error = %e,
                "Status polling failed"
            );
            SessionState::Errored(e.to_string())
        }
    };

    shared.apply(generation, next);
}
