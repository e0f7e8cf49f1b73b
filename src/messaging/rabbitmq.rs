// RabbitMQ 模組
// 提供與 RabbitMQ 通訊的基礎設施

// 導出子模組
pub mod client;
pub mod connection;
pub mod error;
pub mod handler;

// 重新導出常用結構
pub use client::MessageClient;
pub use connection::BrokerConnection;
pub use error::MessagingError;
pub use handler::{
    DeliveryHandler, MessageHandler, ALL_MC, ALL_PROXIES, BOT_NETWORKING, MC_DIRECT,
    PROXY_DIRECT, STATISTICS,
};
