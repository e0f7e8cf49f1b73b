use lapin::Error as LapinError;
use thiserror::Error;

use crate::messaging::protocol::ProtocolError;

/// 消息層通用錯誤類型
#[derive(Error, Debug)]
pub enum MessagingError {
    #[error("Lapin error: {0}")]
    Lapin(#[from] LapinError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Connection timeout")]
    Timeout,

    #[error("Unknown permanent client: {0}")]
    UnknownClient(String),

    #[error("Unknown consumer queue: {0}")]
    UnknownConsumer(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<String> for MessagingError {
    fn from(error: String) -> Self {
        MessagingError::Other(error)
    }
}

impl From<&str> for MessagingError {
    fn from(error: &str) -> Self {
        MessagingError::Other(error.to_string())
    }
}
