// Shared helpers for command layer integration tests.
#![allow(dead_code)]

use parking_lot::Mutex;

use network_core::command::{CommandSender, Rank, SenderKind, Tag};

/// A scripted sender that records every reply it receives.
pub struct TestSender {
    kind: SenderKind,
    name: String,
    rank: Option<Rank>,
    tags: Vec<Tag>,
    replies: Mutex<Vec<String>>,
}

impl TestSender {
    pub fn player(name: &str, rank: Rank) -> Self {
        Self {
            kind: SenderKind::Player,
            name: name.to_string(),
            rank: Some(rank),
            tags: Vec::new(),
            replies: Mutex::new(Vec::new()),
        }
    }

    pub fn console() -> Self {
        Self {
            kind: SenderKind::Console,
            name: "CONSOLE".to_string(),
            rank: None,
            tags: Vec::new(),
            replies: Mutex::new(Vec::new()),
        }
    }

    pub fn block() -> Self {
        Self {
            kind: SenderKind::Block,
            name: "@".to_string(),
            rank: None,
            tags: Vec::new(),
            replies: Mutex::new(Vec::new()),
        }
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn replies(&self) -> Vec<String> {
        self.replies.lock().clone()
    }
}

impl CommandSender for TestSender {
    fn kind(&self) -> SenderKind {
        self.kind
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn reply(&self, message: &str) {
        self.replies.lock().push(message.to_string());
    }

    fn rank(&self) -> Option<Rank> {
        self.rank
    }

    fn has_tag(&self, tag: &Tag) -> bool {
        self.tags.contains(tag)
    }
}

/// Convenience for building argument vectors.
pub fn args(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|token| token.to_string()).collect()
}
