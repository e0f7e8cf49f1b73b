use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use lapin::{
    options::{
        BasicAckOptions, BasicCancelOptions, BasicConsumeOptions, BasicQosOptions,
        ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions,
    },
    types::FieldTable,
    Channel, ExchangeKind,
};
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::types::{InstanceConfig, RabbitMQConfig};
use crate::messaging::packets::AnyPacket;
use crate::messaging::protocol::{self, InboundPacket, MqPacket, ProtocolError};
use crate::messaging::rabbitmq::client::MessageClient;
use crate::messaging::rabbitmq::connection::BrokerConnection;
use crate::messaging::rabbitmq::error::MessagingError;
use crate::player::PlayerDirectory;

/// 廣播到所有代理的 fanout 交換機
pub const ALL_PROXIES: &str = "all_proxies";
/// 廣播到所有遊戲伺服器的 fanout 交換機
pub const ALL_MC: &str = "all_mc";
/// 統計資料匯集佇列 (durable)
pub const STATISTICS: &str = "statistics";
/// 指定代理的 direct 交換機
pub const PROXY_DIRECT: &str = "proxy_direct";
/// 指定遊戲伺服器的 direct 交換機
pub const MC_DIRECT: &str = "mc_direct";
/// 機器人整合佇列 (durable)
pub const BOT_NETWORKING: &str = "bot-networking";

/// 內部封包匯流排的緩衝深度
const PACKET_BUS_CAPACITY: usize = 256;

/// 投遞回呼特徵
///
/// 單一訊息的處理失敗由消費迴圈記錄後吸收，永遠不會讓消費者
/// 執行緒停擺。
#[async_trait]
pub trait DeliveryHandler: Send + Sync {
    async fn handle(&self, body: &[u8]) -> anyhow::Result<()>;
}

struct ConsumerEntry {
    channel: Channel,
    consumer_tag: String,
}

/// 跨行程消息中樞
///
/// 持有兩條長壽命連接 (發布/消費)、既定拓撲的常設客戶端、
/// 臨時佇列到消費通道的對照表，以及解碼後封包的內部匯流排。
pub struct MessageHandler {
    publishing: BrokerConnection,
    consuming: BrokerConnection,
    instance_name: String,
    proxy_id: Uuid,
    consumer_tag_prefix: String,
    prefetch_count: u16,
    clients: RwLock<HashMap<String, MessageClient>>,
    consumers: Mutex<HashMap<String, ConsumerEntry>>,
    packet_bus: broadcast::Sender<InboundPacket>,
    players: Arc<dyn PlayerDirectory>,
}

impl MessageHandler {
    /// 建立消息中樞：建立兩條連接、常設客戶端與核心消費者
    pub async fn new(
        rabbitmq: &RabbitMQConfig,
        instance: &InstanceConfig,
        players: Arc<dyn PlayerDirectory>,
    ) -> Result<Self, MessagingError> {
        let timeout = Duration::from_secs(rabbitmq.connection_timeout_secs);

        let publishing = BrokerConnection::connect(&rabbitmq.url, "publishing", timeout).await?;
        let consuming = BrokerConnection::connect(&rabbitmq.url, "consuming", timeout).await?;

        let (packet_bus, _) = broadcast::channel(PACKET_BUS_CAPACITY);

        let handler = Self {
            publishing,
            consuming,
            instance_name: instance.instance_name.clone(),
            proxy_id: instance.proxy_id.unwrap_or_else(Uuid::new_v4),
            consumer_tag_prefix: rabbitmq.consumer_tag_prefix.clone(),
            prefetch_count: rabbitmq.prefetch_count,
            clients: RwLock::new(HashMap::new()),
            consumers: Mutex::new(HashMap::new()),
            packet_bus,
            players,
        };

        handler.install_permanent_clients().await?;
        handler.install_core_consumers().await?;

        info!(
            instance = %handler.instance_name,
            proxy_id = %handler.proxy_id,
            "Message handler initialized"
        );

        Ok(handler)
    }

    /// 建立既定拓撲的常設客戶端
    async fn install_permanent_clients(&self) -> Result<(), MessagingError> {
        let mut clients = self.clients.write().await;

        clients.insert(
            ALL_PROXIES.into(),
            MessageClient::for_exchange(&self.publishing, ALL_PROXIES, ExchangeKind::Fanout)
                .await?,
        );
        clients.insert(
            ALL_MC.into(),
            MessageClient::for_exchange(&self.publishing, ALL_MC, ExchangeKind::Fanout).await?,
        );
        clients.insert(
            STATISTICS.into(),
            MessageClient::for_queue(&self.publishing, STATISTICS, true).await?,
        );
        clients.insert(
            PROXY_DIRECT.into(),
            MessageClient::for_exchange(&self.publishing, PROXY_DIRECT, ExchangeKind::Direct)
                .await?,
        );
        clients.insert(
            MC_DIRECT.into(),
            MessageClient::for_exchange(&self.publishing, MC_DIRECT, ExchangeKind::Direct)
                .await?,
        );
        clients.insert(
            BOT_NETWORKING.into(),
            MessageClient::for_queue(&self.publishing, BOT_NETWORKING, true).await?,
        );

        debug!("Permanent message clients installed");
        Ok(())
    }

    /// 預先註冊的兩個核心消費者：全伺服器廣播與本實例直達
    async fn install_core_consumers(&self) -> Result<(), MessagingError> {
        let fan_out = Arc::new(PacketFanOut {
            bus: self.packet_bus.clone(),
            players: self.players.clone(),
            mention_effects: false,
        });
        self.register_consumer(ALL_MC, ExchangeKind::Fanout, "", fan_out)
            .await?;

        // 直達消費者額外處理提及封包的本地音效副作用
        let direct = Arc::new(PacketFanOut {
            bus: self.packet_bus.clone(),
            players: self.players.clone(),
            mention_effects: true,
        });
        let routing_key = self.instance_name.clone();
        self.register_consumer(MC_DIRECT, ExchangeKind::Direct, &routing_key, direct)
            .await?;

        Ok(())
    }

    /// 透過常設客戶端發送封包 (路由鍵預設為空字串)
    pub async fn send_packet<P: MqPacket>(
        &self,
        target: &str,
        packet: &P,
    ) -> Result<(), MessagingError> {
        self.send_packet_routed(target, "", packet).await
    }

    /// 透過常設客戶端以指定路由鍵發送封包
    pub async fn send_packet_routed<P: MqPacket>(
        &self,
        target: &str,
        routing_key: &str,
        packet: &P,
    ) -> Result<(), MessagingError> {
        let body = protocol::encode(packet, Some(self.proxy_id))?;

        let clients = self.clients.read().await;
        let client = clients
            .get(target)
            .ok_or_else(|| MessagingError::UnknownClient(target.to_string()))?;

        client.publish(routing_key, &body).await
    }

    /// 對常設集合以外的目標做一次性發送：建臨時客戶端、發送、關閉
    pub async fn send_once<P: MqPacket>(
        &self,
        exchange: &str,
        kind: ExchangeKind,
        routing_key: &str,
        packet: &P,
    ) -> Result<(), MessagingError> {
        let body = protocol::encode(packet, Some(self.proxy_id))?;

        let client = MessageClient::for_exchange(&self.publishing, exchange, kind).await?;
        let result = client.publish(routing_key, &body).await;

        if let Err(err) = client.close().await {
            warn!(exchange = %exchange, error = %err, "Failed to close one-off client");
        }

        result
    }

    /// 註冊臨時的常設客戶端
    pub async fn register_client(&self, name: &str, client: MessageClient) {
        self.clients.write().await.insert(name.to_string(), client);
    }

    /// 宣告交換機、綁定匿名佇列並掛上投遞回呼
    ///
    /// 回傳產生的佇列名稱，供之後取消註冊。每則訊息的解碼或回呼
    /// 失敗都會連同消費者標籤、交換機、路由鍵與原始訊息體 (位元組
    /// 與字串兩種形式) 記錄後繼續消費。
    pub async fn register_consumer(
        &self,
        exchange: &str,
        kind: ExchangeKind,
        routing_key: &str,
        handler: Arc<dyn DeliveryHandler>,
    ) -> Result<String, MessagingError> {
        let channel = self.consuming.create_channel().await?;

        channel
            .basic_qos(self.prefetch_count, BasicQosOptions::default())
            .await?;

        channel
            .exchange_declare(
                exchange,
                kind,
                ExchangeDeclareOptions {
                    durable: true,
                    ..ExchangeDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await?;

        // 伺服器命名的匿名佇列，連接斷開即自動刪除
        let queue = channel
            .queue_declare(
                "",
                QueueDeclareOptions {
                    exclusive: true,
                    auto_delete: true,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await?;
        let queue_name = queue.name().as_str().to_string();

        channel
            .queue_bind(
                &queue_name,
                exchange,
                routing_key,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await?;

        let consumer_tag = format!("{}-{}", self.consumer_tag_prefix, Uuid::new_v4());
        let consumer = channel
            .basic_consume(
                &queue_name,
                &consumer_tag,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await?;

        info!(
            exchange = %exchange,
            routing_key = %routing_key,
            queue = %queue_name,
            consumer_tag = %consumer_tag,
            "Consumer registered"
        );

        let task_tag = consumer_tag.clone();
        let task_queue = queue_name.clone();
        tokio::spawn(async move {
            let mut consumer = consumer;

            while let Some(delivery) = consumer.next().await {
                match delivery {
                    Ok(delivery) => {
                        if let Err(err) = handler.handle(&delivery.data).await {
                            error!(
                                consumer_tag = %task_tag,
                                exchange = %delivery.exchange.as_str(),
                                routing_key = %delivery.routing_key.as_str(),
                                delivery_tag = delivery.delivery_tag,
                                body_bytes = ?delivery.data,
                                body = %String::from_utf8_lossy(&delivery.data),
                                error = ?err,
                                "Failed to process delivery"
                            );
                        }

                        if let Err(err) = delivery.ack(BasicAckOptions::default()).await {
                            error!(
                                consumer_tag = %task_tag,
                                error = %err,
                                "Failed to acknowledge delivery"
                            );
                        }
                    }
                    Err(err) => {
                        error!(queue = %task_queue, error = %err, "Error receiving delivery");
                    }
                }
            }

            debug!(queue = %task_queue, "Consumer stream ended");
        });

        self.consumers.lock().await.insert(
            queue_name.clone(),
            ConsumerEntry {
                channel,
                consumer_tag,
            },
        );

        Ok(queue_name)
    }

    /// 取消消費者並從追蹤表移除
    pub async fn unregister_consumer(&self, queue_name: &str) -> Result<(), MessagingError> {
        let entry = self
            .consumers
            .lock()
            .await
            .remove(queue_name)
            .ok_or_else(|| MessagingError::UnknownConsumer(queue_name.to_string()))?;

        entry
            .channel
            .basic_cancel(&entry.consumer_tag, BasicCancelOptions::default())
            .await?;

        info!(queue = %queue_name, "Consumer unregistered");
        Ok(())
    }

    /// 將投遞內容解讀為 UTF-8 JSON 信封
    pub fn parse_delivery(&self, body: &[u8]) -> Result<InboundPacket, ProtocolError> {
        protocol::decode_any(body)
    }

    /// 訂閱解碼後的入站封包
    pub fn subscribe(&self) -> broadcast::Receiver<InboundPacket> {
        self.packet_bus.subscribe()
    }

    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    pub fn proxy_id(&self) -> Uuid {
        self.proxy_id
    }

    /// 盡力而為的關閉：個別失敗記錄後繼續處理其餘項目
    pub async fn shutdown(&self) {
        info!("Shutting down message handler");

        for (name, client) in self.clients.write().await.drain() {
            if let Err(err) = client.close().await {
                warn!(client = %name, error = %err, "Failed to close permanent client");
            }
        }

        for (queue, entry) in self.consumers.lock().await.drain() {
            if let Err(err) = entry
                .channel
                .basic_cancel(&entry.consumer_tag, BasicCancelOptions::default())
                .await
            {
                warn!(queue = %queue, error = %err, "Failed to cancel consumer");
            }
            if let Err(err) = entry.channel.close(200, "shutdown").await {
                warn!(queue = %queue, error = %err, "Failed to close consumer channel");
            }
        }

        if self.publishing.is_open().await {
            if let Err(err) = self.publishing.close().await {
                warn!(connection = "publishing", error = %err, "Failed to close connection");
            }
        }
        if self.consuming.is_open().await {
            if let Err(err) = self.consuming.close().await {
                warn!(connection = "consuming", error = %err, "Failed to close connection");
            }
        }

        info!("Message handler shut down");
    }
}

/// 核心消費者的投遞回呼：解碼並分發到內部匯流排
struct PacketFanOut {
    bus: broadcast::Sender<InboundPacket>,
    players: Arc<dyn PlayerDirectory>,
    mention_effects: bool,
}

#[async_trait]
impl DeliveryHandler for PacketFanOut {
    async fn handle(&self, body: &[u8]) -> anyhow::Result<()> {
        let inbound = protocol::decode_any(body)?;

        if self.mention_effects {
            if let AnyPacket::Mention(mention) = &inbound.packet {
                if self.players.is_online(&mention.target) {
                    self.players.play_mention_sound(&mention.target);
                }
            }
        }

        // 沒有訂閱者不算錯誤
        let _ = self.bus.send(inbound);

        Ok(())
    }
}
