use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use super::types::UserId;
use crate::error::{MetricsError, MetricsResult};

/// Endpoint pair handed to one request of a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointLease {
    pub rpc_index: usize,
    pub rpc_url: String,
    pub helius_index: usize,
    pub helius_key: String,
}

/// Round-robin rotation of RPC URLs and Helius API keys.
///
/// A user's first lease picks the least recently used entry of each list;
/// every later lease of the same user moves both indices one step forward.
/// Usage is tracked with a logical clock so that ties resolve to the lowest
/// index.
pub struct EndpointRotator {
    rpc_urls: Vec<String>,
    helius_keys: Vec<String>,
    assignments: DashMap<UserId, (usize, usize)>,
    rpc_last_used: Vec<AtomicU64>,
    helius_last_used: Vec<AtomicU64>,
    clock: AtomicU64,
}

impl EndpointRotator {
    pub fn new(rpc_urls: Vec<String>, helius_keys: Vec<String>) -> MetricsResult<Self> {
        if rpc_urls.is_empty() {
            return Err(MetricsError::Config("at least one RPC URL is required".into()));
        }
        if helius_keys.is_empty() {
            return Err(MetricsError::Config(
                "at least one Helius API key is required".into(),
            ));
        }

        let rpc_last_used = rpc_urls.iter().map(|_| AtomicU64::new(0)).collect();
        let helius_last_used = helius_keys.iter().map(|_| AtomicU64::new(0)).collect();

        Ok(Self {
            rpc_urls,
            helius_keys,
            assignments: DashMap::new(),
            rpc_last_used,
            helius_last_used,
            clock: AtomicU64::new(0),
        })
    }

    pub fn next_for_user(&self, user: UserId) -> EndpointLease {
        let (rpc_index, helius_index) = match self.assignments.entry(user) {
            Entry::Occupied(mut entry) => {
                let (rpc, helius) = *entry.get();
                let next = (
                    (rpc + 1) % self.rpc_urls.len(),
                    (helius + 1) % self.helius_keys.len(),
                );
                entry.insert(next);
                next
            }
            Entry::Vacant(entry) => {
                let first = (
                    least_recently_used(&self.rpc_last_used),
                    least_recently_used(&self.helius_last_used),
                );
                entry.insert(first);
                first
            }
        };

        let tick = self.clock.fetch_add(1, Ordering::SeqCst) + 1;
        self.rpc_last_used[rpc_index].store(tick, Ordering::SeqCst);
        self.helius_last_used[helius_index].store(tick, Ordering::SeqCst);

        debug!(
            "User {} leased RPC #{} and Helius key #{}",
            user, rpc_index, helius_index
        );

        EndpointLease {
            rpc_index,
            rpc_url: self.rpc_urls[rpc_index].clone(),
            helius_index,
            helius_key: self.helius_keys[helius_index].clone(),
        }
    }

    pub fn release_user(&self, user: UserId) {
        self.assignments.remove(&user);
    }

    pub fn active_users(&self) -> usize {
        self.assignments.len()
    }
}

fn least_recently_used(last_used: &[AtomicU64]) -> usize {
    last_used
        .iter()
        .enumerate()
        .min_by_key(|(index, stamp)| (stamp.load(Ordering::SeqCst), *index))
        .map(|(index, _)| index)
        .unwrap_or(0)
}
