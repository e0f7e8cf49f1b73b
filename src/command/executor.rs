use crate::command::error::CommandError;
use crate::command::sender::CommandSender;
use crate::command::tree::{CommandId, CommandRegistry};

/// 各層處理器的明確結果
///
/// 取代以例外偵測「未覆寫處理器」的舊控制流：分派器依標記分支，
/// `NotImplemented` 代表交由下一層處理。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Handled,
    NotImplemented,
}

/// 單次指令調用的上下文
pub struct Invocation<'a> {
    pub registry: &'a CommandRegistry,
    pub node: CommandId,
    pub sender: &'a dyn CommandSender,
    pub args: &'a [String],
}

/// 指令節點的行為介面
///
/// 所有方法都有預設實作：未覆寫的處理器回傳 `NotImplemented`，
/// 由分派器落到下一層 (玩家/主控台/方塊 → 通用)。
pub trait CommandExecutor: Send + Sync {
    /// 互動玩家路徑
    fn handle_player(&self, invocation: &Invocation) -> Result<Outcome, CommandError> {
        let _ = invocation;
        Ok(Outcome::NotImplemented)
    }

    /// 主控台路徑
    fn handle_console(&self, invocation: &Invocation) -> Result<Outcome, CommandError> {
        let _ = invocation;
        Ok(Outcome::NotImplemented)
    }

    /// 指令方塊路徑
    fn handle_block(&self, invocation: &Invocation) -> Result<Outcome, CommandError> {
        let _ = invocation;
        Ok(Outcome::NotImplemented)
    }

    /// 通用後備路徑
    fn handle_any(&self, invocation: &Invocation) -> Result<Outcome, CommandError> {
        let _ = invocation;
        Ok(Outcome::NotImplemented)
    }

    /// 即將轉交子指令前的擴充掛鉤
    fn pre_dispatch(&self, invocation: &Invocation, child: &str) {
        let _ = (invocation, child);
    }

    /// 子指令分派完成後的擴充掛鉤，未覆寫即為 no-op
    fn post_dispatch(&self, invocation: &Invocation) {
        let _ = invocation;
    }

    /// 通用補全掛鉤
    ///
    /// 預設：節點沒有子指令且非僅限子指令模式時，列出名稱以最後一個
    /// token 為前綴 (不分大小寫) 的在線玩家。
    fn complete(&self, invocation: &Invocation) -> Vec<String> {
        if invocation.registry.has_children(invocation.node)
            || invocation.registry.meta(invocation.node).subcommand_only
        {
            return Vec::new();
        }

        let prefix = invocation
            .args
            .last()
            .map(String::as_str)
            .unwrap_or("")
            .to_lowercase();

        invocation
            .registry
            .players()
            .online_players()
            .into_iter()
            .filter(|name| name.to_lowercase().starts_with(&prefix))
            .collect()
    }

    /// 錯誤回報掛鉤，預設直接把使用者訊息回覆給發送者
    fn report_error(&self, invocation: &Invocation, error: &CommandError) {
        invocation.sender.reply(&error.user_message());
    }
}

/// 沒有自身行為的節點，只作為子指令的容器
pub struct NoopExecutor;

impl CommandExecutor for NoopExecutor {}
