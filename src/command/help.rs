use crate::command::error::CommandError;
use crate::command::executor::{CommandExecutor, Invocation, Outcome};

/// 自動合成的 help 子指令
///
/// 列出父節點自身的用法行 (僅限子指令模式時略過)，接著每個子指令
/// 一行附上描述。使用者自訂的 `help` 子指令永遠優先，合成版只在
/// 父節點缺少同名子指令時掛上。
pub struct HelpExecutor;

impl CommandExecutor for HelpExecutor {
    fn handle_any(&self, invocation: &Invocation) -> Result<Outcome, CommandError> {
        let registry = invocation.registry;
        let Some(parent) = registry.parent(invocation.node) else {
            return Ok(Outcome::NotImplemented);
        };

        let meta = registry.meta(parent);
        let path = registry.full_path(parent);

        invocation.sender.reply(&format!("--- Help: {} ---", path));
        invocation.sender.reply(&meta.description);

        // 僅限子指令的節點本身不可直接呼叫，抑制自身用法行
        if !meta.subcommand_only {
            let usage = if meta.usage.is_empty() {
                path.clone()
            } else {
                format!("{} {}", path, meta.usage)
            };
            invocation.sender.reply(&usage);
        }

        let mut children = registry.children(parent);
        children.sort_by(|a, b| registry.name(*a).cmp(registry.name(*b)));

        for child in children {
            invocation.sender.reply(&format!(
                "{} {} - {}",
                path,
                registry.name(child),
                registry.meta(child).description
            ));
        }

        Ok(Outcome::Handled)
    }

    // help 本身不提供玩家名稱補全
    fn complete(&self, _invocation: &Invocation) -> Vec<String> {
        Vec::new()
    }
}
