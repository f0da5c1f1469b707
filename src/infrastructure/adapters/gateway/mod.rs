//! Gateway Adapter - 分析后端客户端实现

mod dto;
mod fake_gateway;
mod http_gateway_client;

pub use fake_gateway::{FakeGateway, FakeGatewayConfig, PollRecord};
pub use http_gateway_client::*;
