//! Reference normalizer: canonicalizes wiki-link targets to bare note names.
//!
//! A reference arrives as `[[target]]` or `[[target|display]]` where `target`
//! may be a relative or deep path, with or without the `.md` extension. If the
//! target resolves to a note in the corpus it is rewritten to the bare name
//! form; if not, the span is left byte-for-byte unchanged so a later pass (or
//! a human) can fix it. Display text is never touched.

use super::exists::ExistenceIndex;
use crate::vault::VaultStore;

/// Strip any run of leading `../` and `./` segments.
pub(crate) fn strip_relative(mut s: &str) -> &str {
    loop {
        if let Some(rest) = s.strip_prefix("../") {
            s = rest;
        } else if let Some(rest) = s.strip_prefix("./") {
            s = rest;
        } else {
            return s;
        }
    }
}

/// Strip a trailing `.md` extension if present.
pub(crate) fn strip_md_ext(s: &str) -> &str {
    s.strip_suffix(".md").unwrap_or(s)
}

/// Final path segment.
pub(crate) fn base_name(s: &str) -> &str {
    s.rsplit('/').next().unwrap_or(s)
}

/// Bare note name of a corpus path: no directories, no extension.
pub(crate) fn note_basename(path: &str) -> &str {
    strip_md_ext(base_name(path))
}

/// Whether `pos` sits inside a code span: an odd number of ``` fences, or an
/// odd number of remaining single backticks, before it.
pub(crate) fn in_code_span(text: &str, pos: usize) -> bool {
    let before = &text[..pos];
    let fences = before.matches("```").count();
    let singles = before.matches('`').count() - fences * 3;
    fences % 2 == 1 || singles % 2 == 1
}

/// Whether `pos` sits inside a fenced ``` block (inline code spans do not
/// count here).
pub(crate) fn in_fenced_block(text: &str, pos: usize) -> bool {
    text[..pos].matches("```").count() % 2 == 1
}

/// Test a reference target against the corpus.
///
/// `original_clean` preserves a deep path the author may have given;
/// `normalized` is the bare-name candidate. Each is tried without and with
/// the note extension, first hit wins.
async fn resolves(
    index: &ExistenceIndex,
    store: &dyn VaultStore,
    original_clean: &str,
    normalized: &str,
) -> bool {
    let with_ext_original = format!("{}.md", original_clean);
    let with_ext_normalized = format!("{}.md", normalized);
    for candidate in [
        original_clean,
        &with_ext_original,
        normalized,
        &with_ext_normalized,
    ] {
        if index.check(store, candidate).await {
            return true;
        }
    }
    false
}

/// Normalize the inner text of one `[[...]]` span, or return it unchanged if
/// the target does not resolve.
async fn normalize_span(inner: &str, index: &ExistenceIndex, store: &dyn VaultStore) -> String {
    let (target, display) = match inner.split_once('|') {
        Some((t, d)) => (t.trim(), Some(d)),
        None => (inner, None),
    };

    let stripped = strip_relative(target);
    let original_clean = strip_md_ext(stripped);
    let normalized = strip_md_ext(base_name(stripped));

    if normalized.is_empty() || !resolves(index, store, original_clean, normalized).await {
        return format!("[[{}]]", inner);
    }

    match display {
        Some(d) => format!("[[{}|{}]]", normalized, d),
        None => format!("[[{}]]", normalized),
    }
}

/// Rewrite every resolvable `[[...]]` reference in `text` to canonical form.
///
/// Single forward pass building a new string; spans inside code are left
/// alone, as is anything that does not look like a well-formed reference.
pub(crate) async fn normalize_references(
    text: &str,
    index: &ExistenceIndex,
    store: &dyn VaultStore,
) -> String {
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < text.len() {
        if text[i..].starts_with("[[") {
            if let Some(rel_close) = text[i + 2..].find("]]") {
                let inner = &text[i + 2..i + 2 + rel_close];
                if !inner.is_empty() && !inner.contains(']') && !in_code_span(text, i) {
                    out.push_str(&normalize_span(inner, index, store).await);
                    i += 2 + rel_close + 2;
                    continue;
                }
            }
        }
        let ch = text[i..].chars().next().expect("in-bounds char");
        out.push(ch);
        i += ch.len_utf8();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::MemoryVault;

    async fn normalize(text: &str, notes: &[&str]) -> String {
        let vault = MemoryVault::new();
        for note in notes {
            vault.insert(note, "");
        }
        let index = ExistenceIndex::new();
        normalize_references(text, &index, &vault).await
    }

    #[tokio::test]
    async fn test_strips_relative_prefixes_and_directories() {
        let out = normalize("See [[../../Archive/Old Idea.md]]", &["Archive/Old Idea.md"]).await;
        assert_eq!(out, "See [[Old Idea]]");
    }

    #[tokio::test]
    async fn test_preserves_display_text() {
        let out = normalize(
            "[[../../Archive/Old Idea.md|my idea]]",
            &["Archive/Old Idea.md"],
        )
        .await;
        assert_eq!(out, "[[Old Idea|my idea]]");
    }

    #[tokio::test]
    async fn test_unresolved_reference_left_unchanged() {
        let text = "See [[missing/file.md]] and [[Also Missing|shown]]";
        assert_eq!(normalize(text, &[]).await, text);
    }

    #[tokio::test]
    async fn test_already_canonical_is_stable() {
        let out = normalize("[[Old Idea]]", &["Archive/Old Idea.md"]).await;
        assert_eq!(out, "[[Old Idea]]");
    }

    #[tokio::test]
    async fn test_deep_path_resolution_still_emits_bare_name() {
        // The deep path exists; the canonical form is still the bare name.
        let out = normalize("[[notes/sub/Topic]]", &["notes/sub/Topic.md"]).await;
        assert_eq!(out, "[[Topic]]");
    }

    #[tokio::test]
    async fn test_reference_inside_code_span_untouched() {
        let text = "`[[notes/Plan.md]]` and ```\n[[notes/Plan.md]]\n```";
        assert_eq!(normalize(text, &["notes/Plan.md"]).await, text);
    }

    #[tokio::test]
    async fn test_malformed_spans_untouched() {
        let text = "[[]] and [[a]b]] and [[unclosed";
        assert_eq!(normalize(text, &["a.md"]).await, text);
    }

    #[test]
    fn test_path_helpers() {
        assert_eq!(strip_relative(".././../a/b.md"), "a/b.md");
        assert_eq!(note_basename("a/b/Note.md"), "Note");
        assert_eq!(note_basename("Note"), "Note");
    }

    #[test]
    fn test_code_span_detection() {
        let text = "x `code` y ```\nfenced\n``` z";
        let inline = text.find("code").unwrap();
        let fenced = text.find("fenced").unwrap();
        let after = text.find(" z").unwrap();
        assert!(in_code_span(text, inline));
        assert!(in_code_span(text, fenced));
        assert!(in_fenced_block(text, fenced));
        assert!(!in_code_span(text, after));
        assert!(!in_fenced_block(text, after));
    }
}
