use serde::{Deserialize, Serialize};
use std::fmt;

/// 全序的權限位階
///
/// 位階之間以 `level()` 的數值比較，數值越大權限越高。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    #[default]
    Member,
    Helper,
    Moderator,
    Admin,
    Owner,
}

impl Rank {
    /// 位階的數值等級
    pub fn level(&self) -> u8 {
        match self {
            Rank::Member => 0,
            Rank::Helper => 1,
            Rank::Moderator => 2,
            Rank::Admin => 3,
            Rank::Owner => 4,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rank::Member => "member",
            Rank::Helper => "helper",
            Rank::Moderator => "moderator",
            Rank::Admin => "admin",
            Rank::Owner => "owner",
        };
        write!(f, "{}", name)
    }
}

/// 正交於位階的布林能力旗標
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag(pub String);

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Tag(name.into())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 指令節點的靜態詮釋資料
///
/// 取代原系統以執行期反射讀取的註解：所有欄位在建構時一次給定，
/// 分派過程只讀不寫。存在覆寫標籤時，標籤優先於位階檢查。
#[derive(Clone, Debug, Default)]
pub struct CommandMeta {
    pub description: String,
    pub usage: String,
    pub aliases: Vec<String>,
    pub rank: Rank,
    pub tag: Option<Tag>,
    pub subcommand_only: bool,
}

impl CommandMeta {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_rank(mut self, rank: Rank) -> Self {
        self.rank = rank;
        self
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn subcommand_only(mut self) -> Self {
        self.subcommand_only = true;
        self
    }
}
