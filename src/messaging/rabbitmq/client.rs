use lapin::{
    options::{BasicPublishOptions, ExchangeDeclareOptions, QueueDeclareOptions},
    types::FieldTable,
    BasicProperties, Channel, ExchangeKind,
};
use tracing::debug;

use crate::messaging::rabbitmq::connection::BrokerConnection;
use crate::messaging::rabbitmq::error::MessagingError;

/// 單一發布目標的客戶端
///
/// 獨占一條通道，建構時綁定到具名佇列或已宣告的交換機。
/// `queue` 模式下 `name` 解讀為目的佇列 (發布到預設交換機，路由鍵
/// 即佇列名)；交換機模式下 `name` 是目的交換機，路由鍵由呼叫端給定。
pub struct MessageClient {
    channel: Channel,
    name: String,
    queue: bool,
}

impl MessageClient {
    /// 建立綁定到具名佇列的客戶端
    pub async fn for_queue(
        connection: &BrokerConnection,
        name: &str,
        durable: bool,
    ) -> Result<Self, MessagingError> {
        let channel = connection.create_channel().await?;

        debug!(queue = %name, durable, "Declaring queue for message client");

        channel
            .queue_declare(
                name,
                QueueDeclareOptions {
                    durable,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await?;

        Ok(Self {
            channel,
            name: name.to_string(),
            queue: true,
        })
    }

    /// 建立綁定到指定型態交換機的客戶端
    pub async fn for_exchange(
        connection: &BrokerConnection,
        name: &str,
        kind: ExchangeKind,
    ) -> Result<Self, MessagingError> {
        let channel = connection.create_channel().await?;

        debug!(exchange = %name, "Declaring exchange for message client");

        channel
            .exchange_declare(
                name,
                kind,
                ExchangeDeclareOptions {
                    durable: true,
                    ..ExchangeDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await?;

        Ok(Self {
            channel,
            name: name.to_string(),
            queue: false,
        })
    }

    /// 發布一則信封位元組
    pub async fn publish(&self, routing_key: &str, payload: &[u8]) -> Result<(), MessagingError> {
        let (exchange, key) = if self.queue {
            ("", self.name.as_str())
        } else {
            (self.name.as_str(), routing_key)
        };

        debug!(exchange = %exchange, routing_key = %key, "Publishing message");

        self.channel
            .basic_publish(
                exchange,
                key,
                BasicPublishOptions::default(),
                payload,
                BasicProperties::default().with_content_type("application/json".into()),
            )
            .await?;

        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_queue(&self) -> bool {
        self.queue
    }

    /// 釋放獨占的通道
    pub async fn close(&self) -> Result<(), MessagingError> {
        self.channel.close(200, "client closed").await?;
        Ok(())
    }
}
