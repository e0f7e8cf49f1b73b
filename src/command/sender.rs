use crate::command::meta::{Rank, Tag};

/// 指令來源的三種型態
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SenderKind {
    /// 互動玩家
    Player,
    /// 非互動主控台
    Console,
    /// 世界內自動觸發 (指令方塊)
    Block,
}

/// 指令發送者抽象
///
/// 權限閘門只對玩家生效；主控台與指令方塊的 `rank()` 回傳 `None`，
/// 分派流程不對它們做位階檢查。
pub trait CommandSender: Send + Sync {
    fn kind(&self) -> SenderKind;

    fn name(&self) -> &str;

    /// 傳送一行使用者可見訊息
    fn reply(&self, message: &str);

    fn rank(&self) -> Option<Rank>;

    fn has_tag(&self, tag: &Tag) -> bool;
}
