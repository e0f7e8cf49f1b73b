use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::command::error::{CommandError, TreeError};
use crate::command::executor::{CommandExecutor, Invocation, Outcome};
use crate::command::help::HelpExecutor;
use crate::command::meta::CommandMeta;
use crate::command::sender::{CommandSender, SenderKind};
use crate::player::PlayerDirectory;

/// 指令節點的穩定識別碼 (arena 索引)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CommandId(usize);

struct Node {
    name: String,
    parent: Option<CommandId>,
    children: HashMap<String, CommandId>,
    meta: CommandMeta,
    executor: Arc<dyn CommandExecutor>,
}

/// 指令樹註冊表
///
/// 節點存放在 arena 中以索引定址；子表持有子節點，父鏈結是
/// 非擁有的回參照，只用於路徑顯示。註冊在啟動期進行 (`&mut`)，
/// 之後的分派與補全都是唯讀操作。
pub struct CommandRegistry {
    nodes: Vec<Node>,
    roots: HashMap<String, CommandId>,
    players: Arc<dyn PlayerDirectory>,
}

impl CommandRegistry {
    pub fn new(players: Arc<dyn PlayerDirectory>) -> Self {
        Self {
            nodes: Vec::new(),
            roots: HashMap::new(),
            players,
        }
    }

    /// 建立一個尚未掛載的節點
    pub fn create(
        &mut self,
        name: impl Into<String>,
        meta: CommandMeta,
        executor: Arc<dyn CommandExecutor>,
    ) -> CommandId {
        let id = CommandId(self.nodes.len());
        self.nodes.push(Node {
            name: name.into(),
            parent: None,
            children: HashMap::new(),
            meta,
            executor,
        });
        id
    }

    /// 以名稱與別名註冊頂層指令
    pub fn register_root(&mut self, id: CommandId) -> Result<(), TreeError> {
        let node = self.nodes.get(id.0).ok_or(TreeError::UnknownNode)?;
        if node.parent.is_some() {
            return Err(TreeError::AlreadyAttached(node.name.clone()));
        }

        let mut keys = vec![node.name.clone()];
        keys.extend(node.meta.aliases.iter().cloned());

        for key in &keys {
            if self.roots.contains_key(key) {
                return Err(TreeError::DuplicateRoot(key.clone()));
            }
        }
        for key in keys {
            self.roots.insert(key, id);
        }

        // 僅限子指令的根節點即使還沒有子指令也需要 help 目標
        if self.nodes[id.0].meta.subcommand_only {
            self.ensure_help_child(id);
        }

        debug!(command = %self.nodes[id.0].name, "Registered root command");
        Ok(())
    }

    /// 將子節點掛到父節點之下
    ///
    /// 節點只能有一個父節點：重複掛載是程式編寫錯誤。父節點獲得
    /// 第一個子節點時，若沒有使用者自訂的 `help` 子指令則自動合成。
    pub fn attach(&mut self, parent: CommandId, child: CommandId) -> Result<(), TreeError> {
        if parent.0 >= self.nodes.len() || child.0 >= self.nodes.len() {
            return Err(TreeError::UnknownNode);
        }
        if self.nodes[child.0].parent.is_some() {
            return Err(TreeError::AlreadyAttached(self.nodes[child.0].name.clone()));
        }

        let child_name = self.nodes[child.0].name.clone();
        if self.nodes[parent.0].children.contains_key(&child_name) {
            return Err(TreeError::DuplicateName(child_name));
        }

        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(child_name, child);

        self.ensure_help_child(parent);
        Ok(())
    }

    /// 解除子節點與父節點的連結
    pub fn detach(&mut self, child: CommandId) -> Result<(), TreeError> {
        let parent = self
            .nodes
            .get(child.0)
            .ok_or(TreeError::UnknownNode)?
            .parent
            .ok_or(TreeError::UnknownNode)?;

        let name = self.nodes[child.0].name.clone();
        self.nodes[parent.0].children.remove(&name);
        self.nodes[child.0].parent = None;
        Ok(())
    }

    fn ensure_help_child(&mut self, parent: CommandId) {
        if self
            .resolve_child(parent, "help")
            .is_some()
        {
            return;
        }

        let help = self.create(
            "help",
            CommandMeta::new("Shows help for this command"),
            Arc::new(HelpExecutor),
        );
        self.nodes[help.0].parent = Some(parent);
        self.nodes[parent.0].children.insert("help".into(), help);
    }

    pub fn name(&self, id: CommandId) -> &str {
        &self.nodes[id.0].name
    }

    pub fn meta(&self, id: CommandId) -> &CommandMeta {
        &self.nodes[id.0].meta
    }

    pub fn parent(&self, id: CommandId) -> Option<CommandId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: CommandId) -> Vec<CommandId> {
        self.nodes[id.0].children.values().copied().collect()
    }

    pub fn has_children(&self, id: CommandId) -> bool {
        !self.nodes[id.0].children.is_empty()
    }

    pub fn root(&self, name: &str) -> Option<CommandId> {
        self.roots.get(name).copied()
    }

    pub fn players(&self) -> &dyn PlayerDirectory {
        &*self.players
    }

    /// 以父鏈結組出顯示路徑，例如 `/rank set`
    pub fn full_path(&self, id: CommandId) -> String {
        let mut segments = vec![self.nodes[id.0].name.clone()];
        let mut cursor = self.nodes[id.0].parent;
        while let Some(parent) = cursor {
            segments.push(self.nodes[parent.0].name.clone());
            cursor = self.nodes[parent.0].parent;
        }
        segments.reverse();
        format!("/{}", segments.join(" "))
    }

    /// 解析子指令名稱：先精確比對，再取第一個不分大小寫的符合者
    pub fn resolve_child(&self, id: CommandId, token: &str) -> Option<CommandId> {
        let children = &self.nodes[id.0].children;

        if let Some(child) = children.get(token) {
            return Some(*child);
        }
        children
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(token))
            .map(|(_, child)| *child)
    }

    /// 部分比對：精確符合者直接短路為單一結果，否則回傳所有
    /// 以該前綴開頭 (不分大小寫) 的子指令
    pub fn partial_matches(&self, id: CommandId, prefix: &str) -> Vec<CommandId> {
        let children = &self.nodes[id.0].children;

        if let Some(child) = children.get(prefix) {
            return vec![*child];
        }

        let lowered = prefix.to_lowercase();
        children
            .iter()
            .filter(|(name, _)| name.to_lowercase().starts_with(&lowered))
            .map(|(_, child)| *child)
            .collect()
    }

    /// 主框架的指令進入點
    ///
    /// 內部所有失敗都會轉成發送者可見的訊息；只要根指令存在，
    /// 回傳值一律為「已處理」。
    pub fn dispatch(&self, root: &str, sender: &dyn CommandSender, args: &[String]) -> bool {
        let Some(id) = self.root(root) else {
            warn!(command = %root, "Dispatch requested for unknown root command");
            return false;
        };

        self.dispatch_node(id, sender, args);
        true
    }

    /// 單一節點的解析迴圈；每一層攔截自己的失敗並回報
    fn dispatch_node(&self, id: CommandId, sender: &dyn CommandSender, args: &[String]) {
        if let Err(failure) = self.try_dispatch(id, sender, args) {
            if let CommandError::Unhandled(cause) = &failure {
                error!(
                    command = %self.full_path(id),
                    cause = ?cause,
                    "Unhandled exception in command handler"
                );
            }

            let invocation = Invocation {
                registry: self,
                node: id,
                sender,
                args,
            };
            self.nodes[id.0].executor.report_error(&invocation, &failure);
        }
    }

    fn try_dispatch(
        &self,
        id: CommandId,
        sender: &dyn CommandSender,
        args: &[String],
    ) -> Result<(), CommandError> {
        let node = &self.nodes[id.0];

        // 權限閘門只對玩家生效
        if sender.kind() == SenderKind::Player {
            self.check_gate(id, sender)?;
        }

        let mut target = None;
        let mut rest: &[String] = args;

        if node.meta.subcommand_only {
            // 缺少第一個參數視為隱含的 help 請求
            let first = args.first().map(String::as_str).unwrap_or("help");
            match self.resolve_child(id, first) {
                Some(child) => {
                    target = Some(child);
                    if !args.is_empty() {
                        rest = &args[1..];
                    }
                }
                None => {
                    return Err(CommandError::InvalidArgument(format!(
                        "'{}' is not a valid subcommand",
                        first
                    )));
                }
            }
        } else if let Some(first) = args.first() {
            // 可選的轉交：沒有符合的子指令就落回本地處理
            if let Some(child) = self.resolve_child(id, first) {
                target = Some(child);
                rest = &args[1..];
            }
        }

        if let Some(child) = target {
            let invocation = Invocation {
                registry: self,
                node: id,
                sender,
                args,
            };
            node.executor
                .pre_dispatch(&invocation, &self.nodes[child.0].name);
            self.dispatch_node(child, sender, rest);
            node.executor.post_dispatch(&invocation);
            return Ok(());
        }

        let invocation = Invocation {
            registry: self,
            node: id,
            sender,
            args,
        };

        let outcome = match sender.kind() {
            SenderKind::Player => node.executor.handle_player(&invocation)?,
            SenderKind::Console => node.executor.handle_console(&invocation)?,
            SenderKind::Block => node.executor.handle_block(&invocation)?,
        };

        match outcome {
            Outcome::Handled => Ok(()),
            Outcome::NotImplemented => match node.executor.handle_any(&invocation)? {
                Outcome::Handled => Ok(()),
                Outcome::NotImplemented => Err(CommandError::NoHandler),
            },
        }
    }

    /// 位階/標籤權限閘門
    ///
    /// 覆寫標籤存在且發送者持有時直接放行；否則比較數值位階。
    fn check_gate(&self, id: CommandId, sender: &dyn CommandSender) -> Result<(), CommandError> {
        let meta = &self.nodes[id.0].meta;

        if let Some(tag) = &meta.tag {
            if sender.has_tag(tag) {
                return Ok(());
            }
        }

        let rank = sender.rank().unwrap_or_default();
        if rank >= meta.rank {
            Ok(())
        } else {
            Err(CommandError::Permission)
        }
    }

    /// 主框架的補全進入點
    pub fn complete(&self, root: &str, sender: &dyn CommandSender, args: &[String]) -> Vec<String> {
        match self.root(root) {
            Some(id) => self.complete_node(id, sender, args),
            None => Vec::new(),
        }
    }

    fn complete_node(
        &self,
        id: CommandId,
        sender: &dyn CommandSender,
        args: &[String],
    ) -> Vec<String> {
        // 補全閘門只檢查位階，不諮詢覆寫標籤 (沿用觀察到的行為)
        if sender.kind() == SenderKind::Player {
            let rank = sender.rank().unwrap_or_default();
            if rank < self.nodes[id.0].meta.rank {
                return Vec::new();
            }
        }

        if args.len() >= 2 {
            if let Some(child) = self.resolve_child(id, &args[0]) {
                return self.complete_node(child, sender, &args[1..]);
            }
        }

        let invocation = Invocation {
            registry: self,
            node: id,
            sender,
            args,
        };

        if args.len() == 1 {
            let mut suggestions: Vec<String> = self
                .partial_matches(id, &args[0])
                .into_iter()
                .map(|child| self.nodes[child.0].name.clone())
                .collect();
            suggestions.extend(self.nodes[id.0].executor.complete(&invocation));
            return suggestions;
        }

        self.nodes[id.0].executor.complete(&invocation)
    }
}
