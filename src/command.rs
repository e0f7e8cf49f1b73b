// 指令分派模組
//
// 自相似的指令樹：節點可以終端處理輸入，或依名稱轉交給已註冊的
// 子指令。涵蓋位階/標籤權限閘門、自動 help 合成、分頁補全與
// 統一的錯誤回報契約。

// 導出子模組
pub mod error;
pub mod executor;
pub mod help;
pub mod meta;
pub mod sender;
pub mod tree;

// 重新導出常用類型
pub use error::{CommandError, TreeError};
pub use executor::{CommandExecutor, Invocation, NoopExecutor, Outcome};
pub use help::HelpExecutor;
pub use meta::{CommandMeta, Rank, Tag};
pub use sender::{CommandSender, SenderKind};
pub use tree::{CommandId, CommandRegistry};
