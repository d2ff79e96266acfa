//! The set of domains currently under observation.

use std::sync::{Arc, PoisonError, RwLock};

/// Process-wide list of FQDNs to probe.
///
/// The list is held behind an `Arc` and swapped wholesale, so a snapshot is a
/// reference copy that stays valid (and unchanged) while the caller iterates.
/// Duplicates are allowed and order is preserved.
#[derive(Debug, Default)]
pub struct DomainRegistry {
    domains: RwLock<Arc<Vec<String>>>,
}

impl DomainRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consistent view of the current contents
    pub fn snapshot(&self) -> Arc<Vec<String>> {
        Arc::clone(&self.domains.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Atomically install a new list
    pub fn replace(&self, domains: Vec<String>) {
        let next = Arc::new(domains);
        *self.domains.write().unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Returns true if `fqdn` is in the current list
    pub fn contains(&self, fqdn: &str) -> bool {
        self.domains
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|d| d == fqdn)
    }

    /// Number of entries in the current list
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Returns true if the current list is empty
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}
