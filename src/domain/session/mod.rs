//! Session Context - 会话状态限界上下文
//!
//! 同一时刻只存在一个会话状态实例，仅由会话状态机修改

mod state;

pub use state::SessionState;
