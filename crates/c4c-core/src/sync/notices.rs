use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Oldest notices are dropped beyond this many.
pub const MAX_NOTICES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeLevel::Info => f.write_str("info"),
            NoticeLevel::Warning => f.write_str("warning"),
            NoticeLevel::Error => f.write_str("error"),
        }
    }
}

/// A non-blocking, dismissible message for the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
    /// Slot key; a keyed notice replaces the previous one with the same key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<&'static str>,
}

#[derive(Debug, Clone, Default)]
pub struct Notices {
    entries: VecDeque<Notice>,
    next_id: u64,
}

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a notice and return its id.
    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>) -> u64 {
        self.insert(level, message.into(), None)
    }

    /// Add a notice in slot `key`, replacing any notice already there.
    pub fn set_keyed(
        &mut self,
        key: &'static str,
        level: NoticeLevel,
        message: impl Into<String>,
    ) -> u64 {
        self.clear_key(key);
        self.insert(level, message.into(), Some(key))
    }

    /// Remove the notice in slot `key`. Returns whether one was present.
    pub fn clear_key(&mut self, key: &'static str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|n| n.key != Some(key));
        self.entries.len() != before
    }

    /// Dismiss a notice by id. Returns whether it existed.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|n| n.id != id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<Notice> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, level: NoticeLevel, message: String, key: Option<&'static str>) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.entries.push_back(Notice {
            id,
            level,
            message,
            created_at: Utc::now(),
            key,
        });
        while self.entries.len() > MAX_NOTICES {
            self.entries.pop_front();
        }
        id
    }
}
