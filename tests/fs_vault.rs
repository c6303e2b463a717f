//! End-to-end checks against a real on-disk vault.

use std::sync::Arc;
use vaultlink::{FsVault, LinkEngine, VaultStore};

async fn disk_vault(notes: &[(&str, &str)]) -> (tempfile::TempDir, Arc<FsVault>) {
    let dir = tempfile::tempdir().unwrap();
    let vault = FsVault::open(dir.path()).unwrap();
    for (path, content) in notes {
        vault.write(path, content).await.unwrap();
    }
    (dir, Arc::new(vault))
}

#[tokio::test]
async fn rewrite_then_write_round_trips_through_disk() {
    let (_dir, vault) = disk_vault(&[("notes/Project Plan.md", "# Plan")]).await;
    let engine = LinkEngine::new(vault.clone());

    let content = engine
        .rewrite("Progress today, see \"notes/Project Plan.md\".")
        .await;
    vault.write("journal/today.md", &content).await.unwrap();

    assert_eq!(
        vault.read("journal/today.md").await.unwrap(),
        "Progress today, see [[Project Plan]]."
    );

    let report = engine.extract_links("journal/today.md").await.unwrap();
    assert_eq!(report.wiki_links, vec!["Project Plan"]);
}

#[tokio::test]
async fn backlinks_found_across_directories() {
    let (_dir, vault) = disk_vault(&[
        ("Projects/Alpha.md", "# Alpha"),
        ("journal/a.md", "see [[Alpha]]"),
        ("deep/nested/b.md", "also [details](Projects/Alpha.md)"),
        ("noise.md", "Alpha mentioned but not linked"),
    ])
    .await;
    let engine = LinkEngine::new(vault);

    let backlinks = engine.backlinks("Projects/Alpha.md").await.unwrap();
    assert_eq!(
        backlinks,
        vec!["deep/nested/b.md".to_string(), "journal/a.md".to_string()]
    );
}

#[tokio::test]
async fn rename_propagation_rewrites_files_on_disk() {
    let (_dir, vault) = disk_vault(&[
        ("Projects/Alpha.md", "# Alpha"),
        ("uses.md", "tracking [[Alpha]] closely"),
    ])
    .await;
    let engine = LinkEngine::new(vault.clone());

    let count = engine
        .update_links("Projects/Alpha.md", "Projects/Beta.md")
        .await
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(
        vault.read("uses.md").await.unwrap(),
        "tracking [[Beta]] closely"
    );
}

#[tokio::test]
async fn search_reports_context_around_matches() {
    let (_dir, vault) = disk_vault(&[
        ("a.md", "the quick brown fox jumps over the lazy dog"),
        ("b.md", "no match here"),
    ])
    .await;

    let hits = vault.search_text("FOX", 6).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].path, "a.md");
    assert!(hits[0].context.contains("fox"));
}

#[tokio::test]
async fn existence_cache_refreshes_after_invalidate() {
    let (_dir, vault) = disk_vault(&[]).await;
    let engine = LinkEngine::new(vault.clone());

    let text = "see \"notes/Plan.md\" maybe";
    assert_eq!(engine.rewrite(text).await, text);

    // The note appears mid-session; cached misses hide it until invalidated.
    vault.write("notes/Plan.md", "").await.unwrap();
    assert_eq!(engine.rewrite(text).await, text);

    engine.invalidate_cache();
    assert_eq!(engine.rewrite(text).await, "see [[Plan]] maybe");
}
