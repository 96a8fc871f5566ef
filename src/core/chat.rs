//! # Chat Model
//!
//! The conversation shown in the chat panel and the catalog the robot
//! answers from.
//!
//! ```text
//! MessageLog (append-only)
//! ├── MessageEntry { author: User, text: "hello" }
//! ├── MessageEntry { author: Bot,  text: "数据链路已接通 📶" }
//! └── ...
//! ```
//!
//! There is no eviction and no persistence: the log lives exactly as long as
//! the process.

use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    User,
    Bot,
}

impl Author {
    pub fn label(self) -> &'static str {
        match self {
            Author::User => "user",
            Author::Bot => "bot",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEntry {
    pub author: Author,
    pub text: String,
}

impl MessageEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            author: Author::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            author: Author::Bot,
            text: text.into(),
        }
    }
}

/// Renders as `author:text`, e.g. `user:hello`.
impl fmt::Display for MessageEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.author.label(), self.text)
    }
}

/// Ordered, append-only message history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageLog {
    entries: Vec<MessageEntry>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: MessageEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[MessageEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The robot's canned answers, in catalog order.
pub const DEFAULT_REPLIES: [&str; 8] = [
    "数据链路已接通 📶",
    "警告：系统检测到异常数据流 ⚠️",
    "霓虹代码正在解析... 🔍",
    "赛博空间的法则由代码定义 💻",
    "连接至神经接口成功 ✅",
    "故障协议已启动，正在修复... 🛠️",
    "你的消息已被加密传输 🤐",
    "夜之城的霓虹永不熄灭 🌃",
];

/// Fixed, read-only list of candidate replies. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyCatalog {
    replies: Vec<String>,
}

impl Default for ReplyCatalog {
    fn default() -> Self {
        Self {
            replies: DEFAULT_REPLIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ReplyCatalog {
    /// Builds a catalog from custom replies. Blank entries are dropped; if
    /// nothing is left the default catalog is used instead.
    pub fn new(replies: Vec<String>) -> Self {
        let replies: Vec<String> = replies
            .into_iter()
            .filter(|r| !r.trim().is_empty())
            .collect();
        if replies.is_empty() {
            return Self::default();
        }
        Self { replies }
    }

    /// Uniform random draw. Repeats are allowed.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        self.replies
            .choose(rng)
            .map(String::as_str)
            .unwrap_or(DEFAULT_REPLIES[0])
    }

    pub fn contains(&self, reply: &str) -> bool {
        self.replies.iter().any(|r| r == reply)
    }

    pub fn len(&self) -> usize {
        self.replies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.replies.iter().map(String::as_str)
    }
}
