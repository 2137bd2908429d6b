//! Session persistence: one row per minted link token.

use std::collections::HashMap;
use serde::{Serialize, Deserialize};

use crate::error::Result;

/// A minted link: which chat to notify when the game behind `token` finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub token: String,
    pub chat_id: String,
    /// Unix milliseconds
    pub created_at: i64,
    pub used: bool,
}

impl SessionRecord {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>, created_at: i64) -> Self {
        Self {
            token: token.into(),
            chat_id: chat_id.into(),
            created_at,
            used: false,
        }
    }
}

pub trait SessionStore {
    /// Insert or replace the record with the same token.
    fn upsert(&mut self, record: SessionRecord) -> Result<()>;

    fn find(&self, token: &str) -> Result<Option<SessionRecord>>;

    /// Flag the session as consumed. Unknown tokens are ignored.
    fn mark_used(&mut self, token: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    rows: HashMap<String, SessionRecord>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &SessionRecord> {
        self.rows.values()
    }
}

impl SessionStore for MemorySessionStore {
    fn upsert(&mut self, record: SessionRecord) -> Result<()> {
        self.rows.insert(record.token.clone(), record);
        Ok(())
    }

    fn find(&self, token: &str) -> Result<Option<SessionRecord>> {
        Ok(self.rows.get(token).cloned())
    }

    fn mark_used(&mut self, token: &str) -> Result<()> {
        if let Some(row) = self.rows.get_mut(token) {
            row.used = true;
        }
        Ok(())
    }
}
