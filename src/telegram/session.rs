use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::time::Instant;

use crate::chain::types::UserId;

/// Chat-scoped conversation state shared by every handler
#[derive(Debug, Default)]
pub struct SessionStore {
    /// Wallets last sent in each chat
    wallets: DashMap<i64, Vec<String>>,
    /// Users with a running analysis, and when it started
    jobs: DashMap<UserId, Instant>,
}

/// Whitespace-separated wallets of a message
pub fn parse_wallets(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store_wallets(&self, chat: i64, wallets: Vec<String>) {
        self.wallets.insert(chat, wallets);
    }

    pub fn wallets(&self, chat: i64) -> Option<Vec<String>> {
        self.wallets
            .get(&chat)
            .map(|w| w.clone())
            .filter(|w| !w.is_empty())
    }

    /// Register a job for `user`; false when one is already running
    pub fn try_begin_job(&self, user: UserId) -> bool {
        match self.jobs.entry(user) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Instant::now());
                true
            }
        }
    }

    pub fn finish_job(&self, user: UserId) -> Option<Instant> {
        self.jobs.remove(&user).map(|(_, started)| started)
    }

    pub fn running_jobs(&self) -> usize {
        self.jobs.len()
    }
}
