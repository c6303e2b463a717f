//! Link graph queries: forward links, backlinks, rename propagation.

use super::normalize::note_basename;
use super::rewrite::LinkEngine;
use crate::vault::VaultResult;
use pulldown_cmark::{Event, Options, Parser, Tag};
use serde::Serialize;
use std::collections::BTreeSet;

/// Forward links extracted from one note.
///
/// Both lists are in order of first appearance and keep duplicates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LinkReport {
    /// Wiki-link targets (`[[target]]`, display text dropped).
    pub wiki_links: Vec<String>,
    /// Markdown bracket-link destinations, `http(s)` URLs excluded.
    pub markdown_links: Vec<String>,
}

/// Scan raw note text for wiki-links and markdown bracket links.
pub(crate) fn scan_links(content: &str) -> LinkReport {
    let mut report = LinkReport::default();

    // Wiki-links are not markdown; walk the text directly.
    let mut i = 0;
    while i < content.len() {
        if content[i..].starts_with("[[") {
            if let Some(rel_close) = content[i + 2..].find("]]") {
                let inner = &content[i + 2..i + 2 + rel_close];
                if !inner.is_empty() && !inner.contains(']') {
                    let target = inner.split_once('|').map(|(t, _)| t).unwrap_or(inner);
                    report.wiki_links.push(target.to_string());
                    i += 2 + rel_close + 2;
                    continue;
                }
            }
        }
        let ch = content[i..].chars().next().expect("in-bounds char");
        i += ch.len_utf8();
    }

    // Bracket links via the markdown parser, mirroring how documents are
    // rendered; http(s) destinations are external and not part of the graph.
    let parser = Parser::new_ext(content, Options::all());
    for event in parser {
        if let Event::Start(Tag::Link { dest_url, .. }) = event {
            if !dest_url.starts_with("http") {
                report.markdown_links.push(dest_url.to_string());
            }
        }
    }

    report
}

/// Substitute wiki-link targets equal to `old_base` with `new_base`,
/// preserving display text, and rewrite markdown links whose destination is
/// literally `old_path`.
pub(crate) fn rename_targets(
    content: &str,
    old_base: &str,
    new_base: &str,
    old_path: &str,
    new_path: &str,
) -> String {
    let mut out = String::with_capacity(content.len());
    let mut i = 0;
    while i < content.len() {
        if content[i..].starts_with("[[") {
            if let Some(rel_close) = content[i + 2..].find("]]") {
                let inner = &content[i + 2..i + 2 + rel_close];
                if !inner.is_empty() && !inner.contains(']') {
                    let (target, display) = match inner.split_once('|') {
                        Some((t, d)) => (t, Some(d)),
                        None => (inner, None),
                    };
                    let target = if target == old_base { new_base } else { target };
                    match display {
                        Some(d) => out.push_str(&format!("[[{}|{}]]", target, d)),
                        None => out.push_str(&format!("[[{}]]", target)),
                    }
                    i += 2 + rel_close + 2;
                    continue;
                }
            }
        }
        let ch = content[i..].chars().next().expect("in-bounds char");
        out.push(ch);
        i += ch.len_utf8();
    }

    out.replace(
        &format!("]({})", old_path),
        &format!("]({})", new_path),
    )
}

impl LinkEngine {
    /// Forward links of a note.
    pub async fn extract_links(&self, path: &str) -> VaultResult<LinkReport> {
        let content = self.store.read(path).await?;
        Ok(scan_links(&content))
    }

    /// Notes that link to `path`.
    ///
    /// Search-based: candidate notes come from a text search for the bare
    /// name, then each candidate must contain an actual reference. Accepts
    /// false negatives; no reverse index is maintained.
    pub async fn backlinks(&self, path: &str) -> VaultResult<Vec<String>> {
        let base = note_basename(path);
        let hits = self.store.search_text(base, 100).await?;

        let mut found = BTreeSet::new();
        for hit in hits {
            if hit.path == path || found.contains(&hit.path) {
                continue;
            }
            let content = match self.store.read(&hit.path).await {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(path = %hit.path, error = %e, "skipping unreadable note in backlink scan");
                    continue;
                }
            };
            let report = scan_links(&content);
            let links_here = report
                .wiki_links
                .iter()
                .chain(report.markdown_links.iter())
                .any(|link| link.contains(base) || link.contains(path));
            if links_here {
                found.insert(hit.path);
            }
        }
        Ok(found.into_iter().collect())
    }

    /// Rewrite references after `old_path` was renamed to `new_path`.
    ///
    /// Every backlinking note gets an independent read-modify-write cycle;
    /// there is no atomicity across them, and a note that fails mid-way is
    /// skipped rather than aborting the rest. Returns the number of notes
    /// actually modified. The renamed note's own content is not touched.
    pub async fn update_links(&self, old_path: &str, new_path: &str) -> VaultResult<usize> {
        let old_base = note_basename(old_path).to_string();
        let new_base = note_basename(new_path).to_string();

        let mut updated = 0;
        for referrer in self.backlinks(old_path).await? {
            let content = match self.store.read(&referrer).await {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(path = %referrer, error = %e, "skipping unreadable note in rename propagation");
                    continue;
                }
            };
            let rewritten = rename_targets(&content, &old_base, &new_base, old_path, new_path);
            if rewritten == content {
                continue;
            }
            match self.store.write(&referrer, &rewritten).await {
                Ok(()) => updated += 1,
                Err(e) => {
                    tracing::warn!(path = %referrer, error = %e, "failed to rewrite backlink");
                }
            }
        }
        Ok(updated)
    }
}
