//! Sent-alert tracking state.

use pricewatch_core::AlertKey;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Set of alert keys that have already produced a sent alert.
///
/// Process-local and owned by the evaluation loop; there are no
/// concurrent writers. Callers that want the state to survive across
/// scheduled invocations serialize it through whatever storage they
/// like — the engine never depends on one.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertState {
    sent: HashSet<AlertKey>,
}

impl AlertState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a state from previously persisted keys.
    pub fn from_keys(keys: impl IntoIterator<Item = AlertKey>) -> Self {
        Self {
            sent: keys.into_iter().collect(),
        }
    }

    pub fn contains(&self, key: &AlertKey) -> bool {
        self.sent.contains(key)
    }

    /// Returns true if the key was not already present.
    pub fn insert(&mut self, key: AlertKey) -> bool {
        self.sent.insert(key)
    }

    /// Returns true if the key was present.
    pub fn remove(&mut self, key: &AlertKey) -> bool {
        self.sent.remove(key)
    }

    pub fn len(&self) -> usize {
        self.sent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.is_empty()
    }

    pub fn clear(&mut self) {
        self.sent.clear();
    }

    /// Iterate over the recorded keys, e.g. for persistence.
    pub fn keys(&self) -> impl Iterator<Item = &AlertKey> {
        self.sent.iter()
    }
}
