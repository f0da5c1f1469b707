//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod status_poller;
mod upload_gateway;

pub use status_poller::{PollError, StatusPollerPort};
pub use upload_gateway::{UploadError, UploadGatewayPort};
