// 玩家目錄模組
//
// 本 crate 對遊戲伺服器的唯一視窗。指令補全與提及通知都經由這個
// 特徵存取玩家狀態；實作方負責把呼叫編組回主執行緒。

use parking_lot::RwLock;
use std::collections::HashSet;

/// 線上玩家目錄
pub trait PlayerDirectory: Send + Sync {
    /// 目前在線的玩家名稱
    fn online_players(&self) -> Vec<String>;

    /// 指定玩家是否在線
    fn is_online(&self, name: &str) -> bool {
        self.online_players()
            .iter()
            .any(|player| player.eq_ignore_ascii_case(name))
    }

    /// 對被提及的在線玩家播放提示音效
    fn play_mention_sound(&self, name: &str);
}

/// 以記憶體集合支撐的玩家目錄，供獨立常駐程式與測試使用
#[derive(Default)]
pub struct StaticPlayerDirectory {
    players: RwLock<HashSet<String>>,
}

impl StaticPlayerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&self, name: impl Into<String>) {
        self.players.write().insert(name.into());
    }

    pub fn leave(&self, name: &str) {
        self.players.write().remove(name);
    }
}

impl PlayerDirectory for StaticPlayerDirectory {
    fn online_players(&self) -> Vec<String> {
        self.players.read().iter().cloned().collect()
    }

    fn play_mention_sound(&self, name: &str) {
        tracing::debug!(player = %name, "Playing mention sound");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_directory_tracks_joins_and_leaves() {
        let directory = StaticPlayerDirectory::new();
        directory.join("Steve");
        directory.join("Alex");

        assert!(directory.is_online("steve"));
        assert!(directory.is_online("Alex"));

        directory.leave("Steve");
        assert!(!directory.is_online("Steve"));
    }
}
