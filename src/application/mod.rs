//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（UploadGateway、StatusPoller）
//! - polling: 固定间隔轮询循环
//! - session: 会话状态机
//! - presenter: 分析结果展示投影
//! - error: 应用层错误定义

pub mod error;
pub mod polling;
pub mod ports;
pub mod presenter;
pub mod session;

pub use error::ApplicationError;
pub use polling::{poll_until_terminal, PollOutcome, PollPolicy, DEFAULT_POLL_INTERVAL_MS};
pub use ports::{PollError, StatusPollerPort, UploadError, UploadGatewayPort};
pub use presenter::{present, Diagnosis, ResultSummary, SessionView, TUMOR_THRESHOLD};
pub use session::{SessionMachine, SessionMachineConfig, SessionTicket};
