//! End-to-end link rewriting against the in-memory backend.

use std::sync::Arc;
use vaultlink::{LinkEngine, MemoryVault, VaultStore};

fn vault_with(notes: &[(&str, &str)]) -> Arc<MemoryVault> {
    let vault = MemoryVault::new();
    for (path, content) in notes {
        vault.insert(path, content);
    }
    Arc::new(vault)
}

#[tokio::test]
async fn quoted_mention_becomes_wiki_link() {
    let vault = vault_with(&[("notes/Project Plan.md", "# Plan")]);
    let engine = LinkEngine::new(vault);

    let out = engine
        .rewrite("See \"notes/Project Plan.md\" for details")
        .await;
    assert_eq!(out, "See [[Project Plan]] for details");
}

#[tokio::test]
async fn relative_reference_normalized_with_display_kept() {
    let vault = vault_with(&[("Archive/Old Idea.md", "")]);
    let engine = LinkEngine::new(vault);

    let out = engine
        .rewrite("As noted in [[../../Archive/Old Idea.md|my first sketch]].")
        .await;
    assert_eq!(out, "As noted in [[Old Idea|my first sketch]].");
}

#[tokio::test]
async fn link_dense_body_skips_promotion_but_still_normalizes() {
    let vault = vault_with(&[("deep/Topic.md", ""), ("notes/Plan.md", "")]);
    let engine = LinkEngine::new(vault);

    let links: String = (0..11).map(|i| format!("[[note{}]] ", i)).collect();
    let body = format!("{}plus [[deep/Topic.md]] and notes/Plan.md", links);
    let out = engine.rewrite(&body).await;

    assert!(out.contains("[[Topic]]"));
    assert!(out.contains("notes/Plan.md"));
    assert!(!out.contains("[[Plan]]"));
}

#[tokio::test]
async fn rename_propagates_to_backlinking_notes() {
    let vault = vault_with(&[
        ("Projects/Alpha.md", "# Alpha"),
        ("journal/monday.md", "worked on [[Alpha]] today"),
        ("journal/tuesday.md", "more [[Alpha|alpha work]] and [details](Projects/Alpha.md)"),
        ("journal/wednesday.md", "nothing relevant"),
    ]);
    let engine = LinkEngine::new(vault.clone());

    let count = engine
        .update_links("Projects/Alpha.md", "Projects/Beta.md")
        .await
        .unwrap();
    assert_eq!(count, 2);

    assert_eq!(
        vault.read("journal/monday.md").await.unwrap(),
        "worked on [[Beta]] today"
    );
    assert_eq!(
        vault.read("journal/tuesday.md").await.unwrap(),
        "more [[Beta|alpha work]] and [details](Projects/Beta.md)"
    );
}

#[tokio::test]
async fn frontmatter_references_normalized_body_mentions_promoted() {
    let vault = vault_with(&[("Projects/Alpha.md", ""), ("notes/Plan.md", "")]);
    let engine = LinkEngine::new(vault);

    let text = "---\nproject: \"[[../Projects/Alpha.md]]\"\n---\nNext step: review `notes/Plan.md`.\n";
    let out = engine.rewrite(text).await;
    assert_eq!(
        out,
        "---\nproject: \"[[Alpha]]\"\n---\nNext step: review [[Plan]].\n"
    );
}

#[tokio::test]
async fn code_blocks_are_never_rewritten() {
    let vault = vault_with(&[("notes/Plan.md", "")]);
    let engine = LinkEngine::new(vault);

    let text = "```\ncat notes/Plan.md\n[[notes/Plan.md]]\n```\nOutside: notes/Plan.md";
    let out = engine.rewrite(text).await;
    assert_eq!(
        out,
        "```\ncat notes/Plan.md\n[[notes/Plan.md]]\n```\nOutside: [[Plan]]"
    );
}

#[tokio::test]
async fn rewrite_is_idempotent_across_feature_mix() {
    let vault = vault_with(&[
        ("Archive/Old Idea.md", ""),
        ("notes/Project Plan.md", ""),
        ("Research/mental_models.md", ""),
    ]);
    let engine = LinkEngine::new(vault);

    let inputs = [
        "See \"notes/Project Plan.md\" and [[../Archive/Old Idea.md]]",
        "---\ntags: [x]\n---\nbased on Research/mental_models.md\n",
        "nothing links anywhere",
        "unresolved [[ghost/note.md]] stays put",
    ];
    for input in inputs {
        let once = engine.rewrite(input).await;
        let twice = engine.rewrite(&once).await;
        assert_eq!(once, twice, "not idempotent for {:?}", input);
    }
}

#[tokio::test]
async fn unresolved_mentions_and_urls_left_alone() {
    let vault = vault_with(&[]);
    let engine = LinkEngine::new(vault);

    let text = "Read \"missing/file.md\" or https://example.com/page.md later";
    assert_eq!(engine.rewrite(text).await, text);
}
