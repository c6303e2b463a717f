//! In-memory vault backend, used by tests and examples.

use super::store::context_matches;
use super::{SearchHit, VaultError, VaultResult, VaultStore};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::BTreeSet;

/// A vault held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryVault {
    notes: DashMap<String, String>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self {
            notes: DashMap::new(),
        }
    }

    /// Insert a note without passing through the link engine.
    pub fn insert(&self, path: &str, content: &str) {
        self.notes.insert(path.to_string(), content.to_string());
    }
}

#[async_trait]
impl VaultStore for MemoryVault {
    async fn read(&self, path: &str) -> VaultResult<String> {
        self.notes
            .get(path)
            .map(|c| c.clone())
            .ok_or_else(|| VaultError::NotFound(path.to_string()))
    }

    async fn write(&self, path: &str, content: &str) -> VaultResult<()> {
        self.notes.insert(path.to_string(), content.to_string());
        Ok(())
    }

    async fn append(&self, path: &str, content: &str) -> VaultResult<()> {
        let new = match self.notes.get(path) {
            Some(existing) => format!("{}\n{}", existing.value(), content),
            None => content.to_string(),
        };
        self.notes.insert(path.to_string(), new);
        Ok(())
    }

    async fn delete(&self, path: &str) -> VaultResult<()> {
        self.notes
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| VaultError::NotFound(path.to_string()))
    }

    async fn exists(&self, path: &str) -> bool {
        self.notes.contains_key(path)
    }

    async fn list_notes(&self) -> VaultResult<Vec<String>> {
        let mut notes: Vec<String> = self
            .notes
            .iter()
            .map(|e| e.key().clone())
            .filter(|p| p.ends_with(".md"))
            .collect();
        notes.sort();
        Ok(notes)
    }

    async fn list_dir(&self, dirpath: &str) -> VaultResult<Vec<String>> {
        let prefix = if dirpath.is_empty() {
            String::new()
        } else {
            format!("{}/", dirpath.trim_end_matches('/'))
        };

        let mut entries = BTreeSet::new();
        for entry in self.notes.iter() {
            let Some(rest) = entry.key().strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((dir, _)) => entries.insert(format!("{}/", dir)),
                None => entries.insert(rest.to_string()),
            };
        }
        Ok(entries.into_iter().collect())
    }

    async fn search_text(&self, query: &str, context_length: usize) -> VaultResult<Vec<SearchHit>> {
        let paths = self.list_notes().await?;
        let mut hits = Vec::new();
        for path in paths {
            if let Some(content) = self.notes.get(&path) {
                hits.extend(context_matches(&path, content.value(), query, context_length));
            }
        }
        Ok(hits)
    }
}
