//! Vault storage trait definition

use super::{VaultError, VaultResult};
use async_trait::async_trait;
use serde::Serialize;

/// A single text-search match with surrounding context
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// Corpus-relative path of the note containing the match
    pub path: String,
    /// Text surrounding the match
    pub context: String,
}

/// Trait for vault storage backends
///
/// Implementations must be thread-safe (Send + Sync); the engine and the MCP
/// layer hold them behind `Arc<dyn VaultStore>`.
#[async_trait]
pub trait VaultStore: Send + Sync {
    /// Read the full contents of a note. Fails with [`VaultError::NotFound`]
    /// if the note does not exist.
    async fn read(&self, path: &str) -> VaultResult<String>;

    /// Create or overwrite a note, creating parent structure as needed.
    async fn write(&self, path: &str, content: &str) -> VaultResult<()>;

    /// Append content to a note, creating it if missing.
    async fn append(&self, path: &str, content: &str) -> VaultResult<()>;

    /// Delete a note.
    async fn delete(&self, path: &str) -> VaultResult<()>;

    /// Check whether a path resolves to a note in the corpus.
    ///
    /// Any read failure counts as "does not exist"; this is the primitive
    /// behind the engine's existence index.
    async fn exists(&self, path: &str) -> bool {
        self.read(path).await.is_ok()
    }

    /// List all Markdown notes in the vault, sorted, hidden directories
    /// excluded.
    async fn list_notes(&self) -> VaultResult<Vec<String>>;

    /// List the immediate children of a directory. Subdirectories carry a
    /// trailing `/`.
    async fn list_dir(&self, dirpath: &str) -> VaultResult<Vec<String>>;

    /// Case-insensitive substring search over note bodies. Unreadable notes
    /// are skipped, never fatal.
    async fn search_text(&self, query: &str, context_length: usize) -> VaultResult<Vec<SearchHit>>;

    /// Synchronize the vault with its remote, if the backend has one.
    async fn sync(&self, _message: &str) -> VaultResult<String> {
        Err(VaultError::Unsupported("sync".into()))
    }
}

/// Read several notes and concatenate them with per-note headers.
///
/// A note that fails to read contributes an error section instead of
/// aborting the batch.
pub async fn batch_contents(store: &dyn VaultStore, paths: &[String]) -> String {
    let mut out = String::new();
    for path in paths {
        match store.read(path).await {
            Ok(content) => {
                out.push_str(&format!("# {}\n\n{}\n\n---\n\n", path, content));
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "skipping unreadable note in batch read");
                out.push_str(&format!("# {}\n\nError reading note: {}\n\n---\n\n", path, e));
            }
        }
    }
    out
}

/// Collect search hits for `query` within one note's content.
///
/// Shared by the backends that search locally ([`super::FsVault`],
/// [`super::MemoryVault`]). Offsets come from a case-insensitive regex match
/// so they are valid byte indices into the original content.
pub(crate) fn context_matches(
    path: &str,
    content: &str,
    query: &str,
    context_length: usize,
) -> Vec<SearchHit> {
    let Ok(re) = regex::RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    else {
        return Vec::new();
    };

    re.find_iter(content)
        .map(|m| {
            let start = floor_char_boundary(content, m.start().saturating_sub(context_length));
            let end = floor_char_boundary(content, (m.end() + context_length).min(content.len()));
            SearchHit {
                path: path.to_string(),
                context: content[start..end].to_string(),
            }
        })
        .collect()
}

fn floor_char_boundary(s: &str, mut i: usize) -> usize {
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::MemoryVault;

    #[test]
    fn test_context_matches_case_insensitive() {
        let hits = context_matches("a.md", "Alpha beta GAMMA beta", "beta", 3);
        assert_eq!(hits.len(), 2);
        assert!(hits[0].context.contains("beta"));
    }

    #[test]
    fn test_context_matches_clamps_to_char_boundaries() {
        let content = "héllo wörld target tëxt";
        let hits = context_matches("a.md", content, "target", 2);
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_batch_contents_records_failures() {
        let vault = MemoryVault::new();
        vault.insert("a.md", "alpha");

        let out = batch_contents(&vault, &["a.md".to_string(), "missing.md".to_string()]).await;
        assert!(out.contains("# a.md\n\nalpha"));
        assert!(out.contains("# missing.md\n\nError reading note:"));
    }
}
