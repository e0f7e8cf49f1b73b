use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::messaging::packets::AnyPacket;

/// 封包種類註冊表
///
/// 每個封包種類對應一個穩定的線上識別碼，作為信封的 `id` 欄位。
/// 識別碼空間不允許碰撞，`from_code` 必須能唯一還原封包種類。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PacketId {
    Broadcast,
    RankMessage,
    TargetedMessage,
    RankChange,
    Kick,
    Transfer,
    Statistic,
    Mention,
    StaffChat,
    ServerStatus,
    PlayerJoin,
    PlayerLeave,
    BotMessage,
    Shutdown,
}

impl PacketId {
    /// 取得線上識別碼
    pub fn code(&self) -> i64 {
        match self {
            PacketId::Broadcast => 0,
            PacketId::RankMessage => 1,
            PacketId::TargetedMessage => 2,
            PacketId::RankChange => 3,
            PacketId::Kick => 4,
            PacketId::Transfer => 5,
            PacketId::Statistic => 6,
            PacketId::Mention => 7,
            PacketId::StaffChat => 8,
            PacketId::ServerStatus => 9,
            PacketId::PlayerJoin => 10,
            PacketId::PlayerLeave => 11,
            PacketId::BotMessage => 12,
            PacketId::Shutdown => 13,
        }
    }

    /// 從線上識別碼還原封包種類
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(PacketId::Broadcast),
            1 => Some(PacketId::RankMessage),
            2 => Some(PacketId::TargetedMessage),
            3 => Some(PacketId::RankChange),
            4 => Some(PacketId::Kick),
            5 => Some(PacketId::Transfer),
            6 => Some(PacketId::Statistic),
            7 => Some(PacketId::Mention),
            8 => Some(PacketId::StaffChat),
            9 => Some(PacketId::ServerStatus),
            10 => Some(PacketId::PlayerJoin),
            11 => Some(PacketId::PlayerLeave),
            12 => Some(PacketId::BotMessage),
            13 => Some(PacketId::Shutdown),
            _ => None,
        }
    }
}

/// 協議層錯誤
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Envelope is missing the mandatory 'id' field")]
    MissingId,

    #[error("Envelope id mismatch: expected {expected}, found {found}")]
    IdMismatch { expected: i64, found: i64 },

    #[error("Unknown packet id: {0}")]
    UnknownId(i64),

    #[error("Envelope body is not a JSON object")]
    NotAnObject,

    #[error("Envelope 'proxyID' field is not a valid UUID")]
    InvalidProxyId,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// 封包特徵
///
/// 具體封包只持有自身欄位；信封欄位 (`id`、`proxyID`) 由協議層
/// 在編碼/解碼時補上與剝除。
pub trait MqPacket: Serialize + DeserializeOwned + Clone {
    const ID: PacketId;
}

/// 解碼後的入站封包，附帶傳輸層標註的來源代理
#[derive(Clone, Debug)]
pub struct Inbound<P> {
    pub packet: P,
    pub sending_proxy: Option<Uuid>,
}

/// 型別擦除後的入站封包，供事件匯流排分發
#[derive(Clone, Debug)]
pub struct InboundPacket {
    pub packet: AnyPacket,
    pub sending_proxy: Option<Uuid>,
}

/// 將封包編碼為標準信封位元組
///
/// 信封格式: `{"id": <int>, "proxyID": "<uuid>"?, <kind-specific fields>}`
pub fn encode<P: MqPacket>(packet: &P, proxy: Option<Uuid>) -> Result<Vec<u8>, ProtocolError> {
    let mut value = serde_json::to_value(packet)?;
    let object = value.as_object_mut().ok_or(ProtocolError::NotAnObject)?;

    object.insert("id".into(), Value::from(P::ID.code()));
    if let Some(proxy) = proxy {
        object.insert("proxyID".into(), Value::from(proxy.to_string()));
    }

    Ok(serde_json::to_vec(&value)?)
}

/// 解碼指定種類的封包，並驗證信封識別碼
pub fn decode<P: MqPacket>(body: &[u8]) -> Result<Inbound<P>, ProtocolError> {
    let value: Value = serde_json::from_slice(body)?;

    let found = envelope_id(&value)?;
    if found != P::ID.code() {
        return Err(ProtocolError::IdMismatch {
            expected: P::ID.code(),
            found,
        });
    }

    let sending_proxy = envelope_proxy(&value)?;
    let packet = serde_json::from_value(value)?;

    Ok(Inbound {
        packet,
        sending_proxy,
    })
}

/// 依信封識別碼分派解碼，產生型別擦除的入站封包
pub fn decode_any(body: &[u8]) -> Result<InboundPacket, ProtocolError> {
    let value: Value = serde_json::from_slice(body)?;

    let code = envelope_id(&value)?;
    let id = PacketId::from_code(code).ok_or(ProtocolError::UnknownId(code))?;
    let sending_proxy = envelope_proxy(&value)?;
    let packet = AnyPacket::from_value(id, value)?;

    Ok(InboundPacket {
        packet,
        sending_proxy,
    })
}

fn envelope_id(value: &Value) -> Result<i64, ProtocolError> {
    if !value.is_object() {
        return Err(ProtocolError::NotAnObject);
    }

    value
        .get("id")
        .and_then(Value::as_i64)
        .ok_or(ProtocolError::MissingId)
}

fn envelope_proxy(value: &Value) -> Result<Option<Uuid>, ProtocolError> {
    match value.get("proxyID") {
        None | Some(Value::Null) => Ok(None),
        Some(raw) => {
            let text = raw.as_str().ok_or(ProtocolError::InvalidProxyId)?;
            let uuid = Uuid::parse_str(text).map_err(|_| ProtocolError::InvalidProxyId)?;
            Ok(Some(uuid))
        }
    }
}
