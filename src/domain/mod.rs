//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Analysis Context: 上传、任务、分析结果
//! - Session Context: 单会话状态机的状态定义

pub mod analysis;
pub mod session;
