//! Mention detector: promotes path-like body text to wiki-links.
//!
//! A mention is an undelimited occurrence of a note path — quoted, after a
//! contextual keyword, or a bare `dir/file.md` token. Only mentions that
//! resolve to an existing note are promoted, and bodies that are already
//! link-dense are left alone.

use super::exists::ExistenceIndex;
use super::normalize::{
    base_name, in_code_span, in_fenced_block, normalize_references, strip_md_ext,
};
use crate::vault::VaultStore;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Bodies with more than this many wiki-links skip mention promotion.
const LINK_DENSITY_THRESHOLD: usize = 10;

static WIKI_LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[[^\]]+\]\]").unwrap());
static DOUBLE_QUOTED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]+\.md)""#).unwrap());
static SINGLE_QUOTED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"'([^']+\.md)'").unwrap());
static BACK_QUOTED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+\.md)`").unwrap());
static CONTEXTUAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:from|in|see|based on|according to|source:|reference:)\s+([A-Za-z0-9_\-\s/]+\.md)")
        .unwrap()
});
// Bare mentions are single tokens; paths with spaces are only picked up by
// the quoted and contextual classes.
static BARE_PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Za-z0-9_\-/]+/[A-Za-z0-9_\-/]+\.md)\b").unwrap());

/// Normalize existing references in `body`, then promote resolvable mentions.
pub(crate) async fn link_mentions(
    body: &str,
    index: &ExistenceIndex,
    store: &dyn VaultStore,
) -> String {
    // Existing references first; the caller may hand us messy, already
    // delimited links.
    let mut content = normalize_references(body, index, store).await;

    // Link-dense content has most likely been processed before; promoting
    // more mentions risks over-aggressive rewriting.
    if WIKI_LINK_RE.find_iter(&content).count() > LINK_DENSITY_THRESHOLD {
        return content;
    }

    for candidate in collect_candidates(&content) {
        if candidate.starts_with("http://") || candidate.starts_with("https://") {
            continue;
        }

        // Already linked verbatim, with or without the extension.
        let without_ext = strip_md_ext(&candidate);
        if content.contains(&format!("[[{}]]", candidate))
            || content.contains(&format!("[[{}]]", without_ext))
        {
            continue;
        }

        if !index.check(store, &candidate).await {
            continue;
        }

        let link = format!("[[{}]]", strip_md_ext(base_name(&candidate)));
        for quote in ['"', '\'', '`'] {
            let delimited = format!("{}{}{}", quote, candidate, quote);
            content = replace_delimited(&content, &delimited, &link);
        }
        content = replace_unquoted(&content, &candidate, &link);
    }

    content
}

/// Gather unique mention candidates from all pattern classes.
///
/// A `BTreeSet` keeps the iteration order deterministic.
fn collect_candidates(content: &str) -> BTreeSet<String> {
    let mut candidates = BTreeSet::new();
    for re in [
        &*DOUBLE_QUOTED_RE,
        &*SINGLE_QUOTED_RE,
        &*BACK_QUOTED_RE,
        &*CONTEXTUAL_RE,
        &*BARE_PATH_RE,
    ] {
        for caps in re.captures_iter(content) {
            let candidate = caps[1].trim();
            if !candidate.is_empty() {
                candidates.insert(candidate.to_string());
            }
        }
    }
    candidates
}

/// Replace every quote-delimited occurrence of a candidate (quotes included)
/// outside fenced code blocks and outside existing wiki-links.
fn replace_delimited(content: &str, needle: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut from = 0;
    while let Some(offset) = content[from..].find(needle) {
        let pos = from + offset;
        let end = pos + needle.len();
        if in_fenced_block(content, pos) || inside_wiki_link(content, pos) {
            out.push_str(&content[from..end]);
        } else {
            out.push_str(&content[from..pos]);
            out.push_str(replacement);
        }
        from = end;
    }
    out.push_str(&content[from..]);
    out
}

/// Replace bare, word-boundary-delimited occurrences of a candidate.
///
/// Occurrences adjacent to quotes or word characters, inside an existing
/// wiki-link, or inside any code span are left alone.
fn replace_unquoted(content: &str, candidate: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut from = 0;
    while let Some(offset) = content[from..].find(candidate) {
        let pos = from + offset;
        let end = pos + candidate.len();

        let prev = content[..pos].chars().next_back();
        let next = content[end..].chars().next();
        let boundary_char =
            |c: char| c == '"' || c == '\'' || c == '`' || c.is_alphanumeric() || c == '_';

        let blocked = content[..pos].ends_with("[[")
            || content[end..].starts_with("]]")
            || prev.is_some_and(boundary_char)
            || next.is_some_and(boundary_char)
            || inside_wiki_link(content, pos)
            || in_code_span(content, pos);

        if blocked {
            out.push_str(&content[from..end]);
        } else {
            out.push_str(&content[from..pos]);
            out.push_str(replacement);
        }
        from = end;
    }
    out.push_str(&content[from..]);
    out
}

/// Whether `pos` falls between an unclosed `[[` and its `]]`.
fn inside_wiki_link(content: &str, pos: usize) -> bool {
    match content[..pos].rfind("[[") {
        Some(open) => !content[open..pos].contains("]]"),
        None => false,
    }
}
