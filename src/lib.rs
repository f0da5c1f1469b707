//! TumorLens - 医学影像肿瘤检测客户端
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Analysis Context: 上传请求、任务句柄、分析结果
//! - Session Context: 会话状态
//!
//! 应用层 (application/):
//! - Ports: 端口定义（UploadGateway, StatusPoller）
//! - Polling: 固定间隔轮询
//! - Session: 会话状态机（单会话、代数令牌防止过期回调）
//! - Presenter: 结果展示投影
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: HTTP Gateway Client, Fake Gateway
//! - Reporter: 控制台视图订阅者

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
