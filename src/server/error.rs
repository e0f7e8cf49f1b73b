use thiserror::Error;

use crate::messaging::MessagingError;

/// 核心上下文錯誤
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Messaging error: {0}")]
    Messaging(#[from] MessagingError),

    #[error("Initialization error: {0}")]
    Initialization(String),
}

pub type ServerResult<T> = Result<T, ServerError>;
