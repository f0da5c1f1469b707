//! Session - 会话状态机

mod machine;

pub use machine::{SessionMachine, SessionMachineConfig, SessionTicket};
