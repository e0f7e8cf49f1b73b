// 核心上下文模組
//
// 以單一明確建構、明確持有的上下文物件取代環境式靜態註冊表：
// 啟動時建構一次，關閉時拆除，寫入者只有啟動流程本身。

pub mod error;

pub use error::{ServerError, ServerResult};

use std::sync::Arc;

use tracing::info;

use crate::command::CommandRegistry;
use crate::config::types::CoreConfig;
use crate::messaging::MessageHandler;
use crate::player::PlayerDirectory;

/// 網路核心的擁有式上下文
///
/// 持有消息中樞與指令註冊表。指令註冊發生在啟動期 (`commands_mut`)，
/// 之後的分派與補全都經由唯讀借用進行。
pub struct CoreContext {
    config: CoreConfig,
    messaging: Arc<MessageHandler>,
    commands: CommandRegistry,
    players: Arc<dyn PlayerDirectory>,
}

impl CoreContext {
    /// 建構上下文：連接 broker、建立常設拓撲與空的指令樹
    pub async fn initialize(
        config: CoreConfig,
        players: Arc<dyn PlayerDirectory>,
    ) -> ServerResult<Self> {
        info!(instance = %config.server.instance_name, "Initializing network core");

        let messaging = Arc::new(
            MessageHandler::new(&config.rabbitmq, &config.server, players.clone()).await?,
        );
        let commands = CommandRegistry::new(players.clone());

        info!("Network core initialized");

        Ok(Self {
            config,
            messaging,
            commands,
            players,
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn messaging(&self) -> &Arc<MessageHandler> {
        &self.messaging
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    /// 啟動期的指令註冊入口
    pub fn commands_mut(&mut self) -> &mut CommandRegistry {
        &mut self.commands
    }

    pub fn players(&self) -> &Arc<dyn PlayerDirectory> {
        &self.players
    }

    /// 拆除消息層
    pub async fn shutdown(&self) {
        info!("Shutting down network core");
        self.messaging.shutdown().await;
    }
}
