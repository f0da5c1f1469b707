//! TumorLens - 医学影像肿瘤检测客户端
//!
//! 用法: tumorlens <scan.nii|scan.nii.gz|scan.dcm>

use std::path::PathBuf;
use std::sync::Arc;

use tumorlens::application::{present, SessionMachine, UploadGatewayPort};
use tumorlens::config::{load_config, print_config};
use tumorlens::domain::analysis::UploadRequest;
use tumorlens::domain::session::SessionState;
use tumorlens::infrastructure::{ConsoleReporter, HttpGatewayClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!("{},tumorlens={}", config.log.level, config.log.level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    tracing::info!("TumorLens - 脑肿瘤检测客户端");
    print_config(&config);

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or_else(|| anyhow::anyhow!("Usage: tumorlens <scan.nii|scan.nii.gz|scan.dcm>"))?;

    // 创建 HTTP Gateway（上传与轮询共用）
    let gateway = Arc::new(HttpGatewayClient::new(config.gateway.client_config())?);
    if !gateway.health_check().await {
        tracing::warn!(url = %config.gateway.url, "Analysis service is not reachable");
    }

    // 创建会话状态机并订阅视图
    let machine = SessionMachine::new(gateway.clone(), gateway, config.session_machine());
    let reporter = ConsoleReporter::spawn(machine.subscribe());

    let request = UploadRequest::from_path(&path).await?;
    let ticket = machine.select(request)?;

    let outcome = machine.wait_for_terminal(ticket).await;

    // 关闭状态通道，让报告器退出
    drop(machine);
    if let Err(e) = reporter.await {
        tracing::debug!(error = %e, "Reporter task ended abnormally");
    }

    match outcome {
        Some(SessionState::Done(result)) => {
            println!("{}", serde_json::to_string_pretty(&present(&result))?);
            Ok(())
        }
        Some(SessionState::Errored(message)) => {
            Err(anyhow::anyhow!("Analysis failed: {}", message))
        }
        Some(other) => Err(anyhow::anyhow!("Unexpected session state: {}", other)),
        None => Err(anyhow::anyhow!("Session ended before a result was available")),
    }
}
