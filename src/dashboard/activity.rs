//! Recent tool activity, one entry per invocation id.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

use crate::render::Fragment;
use crate::types::ToolStatus;

/// Entries kept before the oldest are dropped.
pub const DEFAULT_ACTIVITY_CAPACITY: usize = 50;

#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub id: String,
    pub tool: String,
    pub status: ToolStatus,
    pub fragment: Fragment,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ActivityFeed {
    entries: VecDeque<ActivityEntry>,
    capacity: usize,
}

impl Default for ActivityFeed {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVITY_CAPACITY)
    }
}

impl ActivityFeed {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Record the latest render of an invocation. An earlier entry with the
    /// same id is replaced and the invocation moves to the front.
    pub fn upsert(&mut self, entry: ActivityEntry) {
        if let Some(pos) = self.entries.iter().position(|e| e.id == entry.id) {
            self.entries.remove(pos);
        }
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    /// Newest first.
    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    pub fn get(&self, id: &str) -> Option<&ActivityEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
