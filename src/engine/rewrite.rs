//! Rewrite orchestrator: the engine's public entry point for content writes.

use super::exists::ExistenceIndex;
use super::{frontmatter, mentions, normalize};
use crate::vault::VaultStore;
use std::sync::Arc;

/// The link-consistency engine.
///
/// Owns the existence cache and the storage handle; everything else is
/// derived transiently per call. One instance serves one session — drop it
/// (or call [`LinkEngine::invalidate_cache`]) when the corpus may have
/// changed underneath it.
pub struct LinkEngine {
    pub(crate) store: Arc<dyn VaultStore>,
    pub(crate) index: ExistenceIndex,
}

impl LinkEngine {
    pub fn new(store: Arc<dyn VaultStore>) -> Self {
        Self {
            store,
            index: ExistenceIndex::new(),
        }
    }

    /// Canonicalize every resolvable reference and mention in `text`.
    ///
    /// Frontmatter, if present, is reference-scanned only; the body also goes
    /// through mention promotion. Idempotent: rewriting already-rewritten
    /// content is a no-op, so every create/append/patch path can call this
    /// unconditionally. The only side effect is growth of the existence
    /// cache — persistence is the caller's job.
    pub async fn rewrite(&self, text: &str) -> String {
        let store = self.store.as_ref();
        match frontmatter::split(text) {
            Some((header, body)) => {
                let header = normalize::normalize_references(header, &self.index, store).await;
                let body = mentions::link_mentions(body, &self.index, store).await;
                frontmatter::reassemble(&header, &body)
            }
            None => mentions::link_mentions(text, &self.index, store).await,
        }
    }

    /// Forget every cached existence answer.
    pub fn invalidate_cache(&self) {
        self.index.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::MemoryVault;

    fn engine_with(notes: &[&str]) -> LinkEngine {
        let vault = MemoryVault::new();
        for note in notes {
            vault.insert(note, "");
        }
        LinkEngine::new(Arc::new(vault))
    }

    #[tokio::test]
    async fn test_header_references_normalized_without_mention_scan() {
        let engine = engine_with(&["Projects/Alpha.md", "notes/Plan.md"]);
        let text = "---\nproject: \"[[../Projects/Alpha.md]]\"\nnote: notes/Plan.md\n---\nbody\n";
        let out = engine.rewrite(text).await;

        // Reference normalized, but the bare path in the header is not a
        // mention candidate.
        assert_eq!(
            out,
            "---\nproject: \"[[Alpha]]\"\nnote: notes/Plan.md\n---\nbody\n"
        );
    }

    #[tokio::test]
    async fn test_body_gets_mention_promotion() {
        let engine = engine_with(&["notes/Plan.md"]);
        let out = engine
            .rewrite("---\ntitle: x\n---\nSee \"notes/Plan.md\" here\n")
            .await;
        assert_eq!(out, "---\ntitle: x\n---\nSee [[Plan]] here\n");
    }

    #[tokio::test]
    async fn test_headerless_text_is_all_body() {
        let engine = engine_with(&["notes/Plan.md"]);
        let out = engine.rewrite("plain mention of notes/Plan.md").await;
        assert_eq!(out, "plain mention of [[Plan]]");
    }

    #[tokio::test]
    async fn test_rewrite_is_idempotent() {
        let engine = engine_with(&["Archive/Old Idea.md", "notes/Project Plan.md"]);
        let inputs = [
            "See \"notes/Project Plan.md\" for details",
            "[[../../Archive/Old Idea.md|my idea]]",
            "---\nref: \"[[Archive/Old Idea.md]]\"\n---\nSee notes/Project Plan.md\n",
            "Check out missing/file.md",
            "nothing to do here",
        ];
        for input in inputs {
            let once = engine.rewrite(input).await;
            let twice = engine.rewrite(&once).await;
            assert_eq!(once, twice, "rewrite not idempotent for {:?}", input);
        }
    }

    #[tokio::test]
    async fn test_malformed_header_treated_as_body() {
        let engine = engine_with(&["notes/Plan.md"]);
        // Unclosed header block: the whole text is body.
        let out = engine.rewrite("---\ntitle: x\nSee notes/Plan.md").await;
        assert_eq!(out, "---\ntitle: x\nSee [[Plan]]");
    }
}
