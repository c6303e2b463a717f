//! Existence index: cached "does this path resolve to a note?" checks.

use crate::vault::VaultStore;
use dashmap::DashMap;

/// Cached existence checks against a vault store.
///
/// Entries are only ever added during an engine's lifetime; the cache is an
/// advisory staleness trade-off, not a correctness guarantee. When the
/// backend pulls remote state mid-session the owner must call
/// [`ExistenceIndex::invalidate`].
#[derive(Debug, Default)]
pub(crate) struct ExistenceIndex {
    cache: DashMap<String, bool>,
}

impl ExistenceIndex {
    pub(crate) fn new() -> Self {
        Self {
            cache: DashMap::new(),
        }
    }

    /// Check whether `path` resolves to a note, consulting the cache first.
    pub(crate) async fn check(&self, store: &dyn VaultStore, path: &str) -> bool {
        if let Some(hit) = self.cache.get(path) {
            return *hit;
        }
        let exists = store.exists(path).await;
        self.cache.insert(path.to_string(), exists);
        exists
    }

    /// Drop all cached answers. Called after the corpus may have changed
    /// underneath us (e.g. a git pull).
    pub(crate) fn invalidate(&self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::MemoryVault;

    #[tokio::test]
    async fn test_caches_both_outcomes() {
        let vault = MemoryVault::new();
        vault.insert("a.md", "");
        let index = ExistenceIndex::new();

        assert!(index.check(&vault, "a.md").await);
        assert!(!index.check(&vault, "b.md").await);

        // Mutating the store behind the cache does not change answers.
        vault.insert("b.md", "");
        assert!(!index.check(&vault, "b.md").await);

        index.invalidate();
        assert!(index.check(&vault, "b.md").await);
    }
}
