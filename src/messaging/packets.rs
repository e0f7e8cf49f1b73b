use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::command::meta::Rank;
use crate::messaging::protocol::{MqPacket, PacketId, ProtocolError};

/// 全網廣播訊息
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BroadcastPacket {
    pub sender: String,
    pub message: String,
}

/// 限定位階以上可見的訊息
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankMessagePacket {
    pub rank: Rank,
    pub message: String,
}

/// 指定玩家的私人訊息
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetedMessagePacket {
    pub target: String,
    pub message: String,
}

/// 位階變更同步通知
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankChangePacket {
    pub player: String,
    pub rank: Rank,
}

/// 踢出玩家
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KickPacket {
    pub player: String,
    pub reason: String,
}

/// 將玩家轉移到另一台遊戲伺服器
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransferPacket {
    pub player: String,
    pub server: String,
}

/// 統計資料紀錄
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatisticPacket {
    pub source: String,
    pub key: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

/// 聊天提及通知，目標在線時觸發提示音效
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MentionPacket {
    pub target: String,
    pub sender: String,
}

/// 工作人員頻道訊息
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaffChatPacket {
    pub sender: String,
    pub rank: Rank,
    pub message: String,
}

/// 伺服器狀態回報
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServerStatusPacket {
    pub server: String,
    pub online: bool,
    pub player_count: u32,
}

/// 玩家加入網路
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerJoinPacket {
    pub player: String,
    pub proxy: String,
}

/// 玩家離開網路
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerLeavePacket {
    pub player: String,
    pub proxy: String,
}

/// 機器人整合頻道訊息
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BotMessagePacket {
    pub channel: String,
    pub content: String,
}

/// 伺服器關閉通知
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShutdownPacket {
    pub server: String,
    pub reason: String,
}

macro_rules! impl_mq_packet {
    ($($packet:ty => $id:ident),* $(,)?) => {
        $(
            impl MqPacket for $packet {
                const ID: PacketId = PacketId::$id;
            }
        )*
    };
}

impl_mq_packet! {
    BroadcastPacket => Broadcast,
    RankMessagePacket => RankMessage,
    TargetedMessagePacket => TargetedMessage,
    RankChangePacket => RankChange,
    KickPacket => Kick,
    TransferPacket => Transfer,
    StatisticPacket => Statistic,
    MentionPacket => Mention,
    StaffChatPacket => StaffChat,
    ServerStatusPacket => ServerStatus,
    PlayerJoinPacket => PlayerJoin,
    PlayerLeavePacket => PlayerLeave,
    BotMessagePacket => BotMessage,
    ShutdownPacket => Shutdown,
}

/// 型別擦除的封包集合，供消費端統一分發
#[derive(Clone, Debug, PartialEq)]
pub enum AnyPacket {
    Broadcast(BroadcastPacket),
    RankMessage(RankMessagePacket),
    TargetedMessage(TargetedMessagePacket),
    RankChange(RankChangePacket),
    Kick(KickPacket),
    Transfer(TransferPacket),
    Statistic(StatisticPacket),
    Mention(MentionPacket),
    StaffChat(StaffChatPacket),
    ServerStatus(ServerStatusPacket),
    PlayerJoin(PlayerJoinPacket),
    PlayerLeave(PlayerLeavePacket),
    BotMessage(BotMessagePacket),
    Shutdown(ShutdownPacket),
}

impl AnyPacket {
    /// 依已驗證的識別碼將信封內容解碼為對應種類
    pub(crate) fn from_value(id: PacketId, value: Value) -> Result<Self, ProtocolError> {
        let packet = match id {
            PacketId::Broadcast => AnyPacket::Broadcast(serde_json::from_value(value)?),
            PacketId::RankMessage => AnyPacket::RankMessage(serde_json::from_value(value)?),
            PacketId::TargetedMessage => {
                AnyPacket::TargetedMessage(serde_json::from_value(value)?)
            }
            PacketId::RankChange => AnyPacket::RankChange(serde_json::from_value(value)?),
            PacketId::Kick => AnyPacket::Kick(serde_json::from_value(value)?),
            PacketId::Transfer => AnyPacket::Transfer(serde_json::from_value(value)?),
            PacketId::Statistic => AnyPacket::Statistic(serde_json::from_value(value)?),
            PacketId::Mention => AnyPacket::Mention(serde_json::from_value(value)?),
            PacketId::StaffChat => AnyPacket::StaffChat(serde_json::from_value(value)?),
            PacketId::ServerStatus => AnyPacket::ServerStatus(serde_json::from_value(value)?),
            PacketId::PlayerJoin => AnyPacket::PlayerJoin(serde_json::from_value(value)?),
            PacketId::PlayerLeave => AnyPacket::PlayerLeave(serde_json::from_value(value)?),
            PacketId::BotMessage => AnyPacket::BotMessage(serde_json::from_value(value)?),
            PacketId::Shutdown => AnyPacket::Shutdown(serde_json::from_value(value)?),
        };

        Ok(packet)
    }

    /// 封包種類識別碼
    pub fn id(&self) -> PacketId {
        match self {
            AnyPacket::Broadcast(_) => PacketId::Broadcast,
            AnyPacket::RankMessage(_) => PacketId::RankMessage,
            AnyPacket::TargetedMessage(_) => PacketId::TargetedMessage,
            AnyPacket::RankChange(_) => PacketId::RankChange,
            AnyPacket::Kick(_) => PacketId::Kick,
            AnyPacket::Transfer(_) => PacketId::Transfer,
            AnyPacket::Statistic(_) => PacketId::Statistic,
            AnyPacket::Mention(_) => PacketId::Mention,
            AnyPacket::StaffChat(_) => PacketId::StaffChat,
            AnyPacket::ServerStatus(_) => PacketId::ServerStatus,
            AnyPacket::PlayerJoin(_) => PacketId::PlayerJoin,
            AnyPacket::PlayerLeave(_) => PacketId::PlayerLeave,
            AnyPacket::BotMessage(_) => PacketId::BotMessage,
            AnyPacket::Shutdown(_) => PacketId::Shutdown,
        }
    }
}
