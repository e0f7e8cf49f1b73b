// 消息系統模組
// 提供基於 RabbitMQ 的跨行程消息機制，讓網路中的代理與遊戲伺服器
// 以型別化的 JSON 信封交換封包

// 導出子模組
pub mod packets;
pub mod protocol;
pub mod rabbitmq;

// 重新導出常用類型
pub use packets::AnyPacket;
pub use protocol::{Inbound, InboundPacket, MqPacket, PacketId, ProtocolError};
pub use rabbitmq::{BrokerConnection, MessageClient, MessageHandler, MessagingError};
