use thiserror::Error;

/// 指令分派的失敗分類
///
/// 所有預期中的失敗都是帶訊息的型別化變體；其餘例外以
/// `Unhandled` 包裝並保留原因，由分派器統一記錄。
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("You do not have permission to use this command!")]
    Permission,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("This command cannot be used from here!")]
    NoHandler,

    #[error("Unhandled error: {0}")]
    Unhandled(#[from] anyhow::Error),
}

impl CommandError {
    /// 使用者可見的一行錯誤訊息
    pub fn user_message(&self) -> String {
        match self {
            CommandError::Unhandled(cause) => format!("Error: {}!", cause),
            other => other.to_string(),
        }
    }
}

/// 指令樹註冊期的使用錯誤
///
/// 這些是程式編寫錯誤，只在外掛初始化時出現，不屬於執行期分派流程。
#[derive(Error, Debug, PartialEq)]
pub enum TreeError {
    #[error("Command '{0}' is already attached to a parent")]
    AlreadyAttached(String),

    #[error("Parent already has a child named '{0}'")]
    DuplicateName(String),

    #[error("A root command named '{0}' is already registered")]
    DuplicateRoot(String),

    #[error("Unknown command node")]
    UnknownNode,
}
