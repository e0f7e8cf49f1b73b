use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::signal;
use tracing::{error, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use network_core::config;
use network_core::player::StaticPlayerDirectory;
use network_core::server::CoreContext;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化配置
    config::init_config()?;
    let core_config = config::get_config().clone();

    // 初始化日誌系統
    init_logging(&core_config.log)?;

    // 建構核心上下文並常駐監聽入站封包
    let players = Arc::new(StaticPlayerDirectory::new());
    let context = CoreContext::initialize(core_config, players).await?;

    let mut inbound = context.messaging().subscribe();
    let listener = tokio::spawn(async move {
        loop {
            match inbound.recv().await {
                Ok(packet) => {
                    info!(
                        id = ?packet.packet.id(),
                        proxy = ?packet.sending_proxy,
                        "Inbound packet"
                    );
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    error!(skipped, "Packet listener lagged behind");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    info!("network-core daemon running, press Ctrl-C to stop");
    signal::ctrl_c().await?;

    context.shutdown().await;
    listener.abort();

    info!("network-core daemon stopped");
    Ok(())
}

fn init_logging(log_config: &config::LogConfig) -> Result<()> {
    let level = match log_config.level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO, // 默認為INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_max_level(level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow!("設置日誌系統失敗: {}", e))?;

    info!("日誌系統初始化完成");
    Ok(())
}
