//! Most recent probe outcome per domain.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use certlife_core::ProbeOutcome;

use crate::registry::DomainRegistry;

/// Map from FQDN to its latest [`ProbeOutcome`].
///
/// Writers replace the entry of any domain still in the registry, so the
/// last completed probe wins. Readers take a copy and release the lock before
/// formatting.
#[derive(Debug, Default)]
pub struct ResultsStore {
    entries: Mutex<HashMap<String, ProbeOutcome>>,
}

impl ResultsStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an outcome unconditionally
    #[cfg(test)]
    pub(crate) fn put(&self, fqdn: &str, outcome: ProbeOutcome) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        store(&mut entries, fqdn, outcome);
    }

    /// Record an outcome only if `fqdn` is still registered.
    ///
    /// The registry is consulted under the store lock. A refresh replaces the
    /// registry before pruning, so a probe that finishes after its domain was
    /// dropped cannot reinsert it. Returns true if the outcome was stored.
    pub fn put_observed(
        &self,
        fqdn: &str,
        outcome: ProbeOutcome,
        registry: &DomainRegistry,
    ) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if !registry.contains(fqdn) {
            return false;
        }
        store(&mut entries, fqdn, outcome);
        true
    }

    /// Latest outcome for one domain
    pub fn get(&self, fqdn: &str) -> Option<ProbeOutcome> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(fqdn)
            .copied()
    }

    /// Snapshot of every entry, sorted by domain
    pub fn iterate(&self) -> Vec<(String, ProbeOutcome)> {
        let mut snapshot: Vec<(String, ProbeOutcome)> = {
            let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries.iter().map(|(k, v)| (k.clone(), *v)).collect()
        };
        snapshot.sort_by(|a, b| a.0.cmp(&b.0));
        snapshot
    }

    /// Drop entries for domains that are no longer observed.
    ///
    /// Returns the number of removed entries.
    pub fn retain_domains(&self, domains: &[String]) -> usize {
        let keep: HashSet<&str> = domains.iter().map(String::as_str).collect();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|fqdn, _| keep.contains(fqdn.as_str()));
        before - entries.len()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true if nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Replace in place, allocating the key only on first insert
fn store(entries: &mut HashMap<String, ProbeOutcome>, fqdn: &str, outcome: ProbeOutcome) {
    if let Some(slot) = entries.get_mut(fqdn) {
        *slot = outcome;
    } else {
        entries.insert(fqdn.to_string(), outcome);
    }
}
