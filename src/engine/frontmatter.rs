//! Frontmatter block splitting and reassembly.
//!
//! The delimiter is a line containing exactly three hyphens. Splitting and
//! reassembly are exact inverses: no whitespace inside the header or the body
//! is added or removed here.

/// Split raw note text into `(header_text, body_text)`.
///
/// Returns `None` when the text does not open with a `---` line or no closing
/// `---` line follows; the caller then treats the whole text as body.
/// `header_text` keeps its trailing newline so that
/// [`reassemble`] reproduces the input byte for byte.
pub(crate) fn split(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix("---\n")?;

    // Empty header block: the closing delimiter is the very next line.
    if let Some(body) = rest.strip_prefix("---\n") {
        return Some(("", body));
    }

    let close = rest.find("\n---\n")?;
    Some((&rest[..close + 1], &rest[close + 5..]))
}

/// Inverse of [`split`].
pub(crate) fn reassemble(header: &str, body: &str) -> String {
    format!("---\n{}---\n{}", header, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_basic() {
        let text = "---\ntitle: Test\ntags: [a]\n---\n# Body\n";
        let (header, body) = split(text).unwrap();
        assert_eq!(header, "title: Test\ntags: [a]\n");
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn test_roundtrip_is_exact() {
        let cases = [
            "---\ntitle: Test\n---\nbody text\n",
            "---\ntitle: Test\n---\n\nbody after blank line",
            "---\nk: v\n---\n",
            "---\n---\nbody only",
        ];
        for text in cases {
            let (header, body) = split(text).unwrap();
            assert_eq!(reassemble(header, body), text);
        }
    }

    #[test]
    fn test_no_header_when_delimiter_not_first_line() {
        assert!(split("intro\n---\nk: v\n---\n").is_none());
        assert!(split("# heading\n").is_none());
        assert!(split("").is_none());
    }

    #[test]
    fn test_no_header_when_unclosed() {
        assert!(split("---\ntitle: Test\nno closing delimiter").is_none());
        // Closing delimiter must be a full line; a trailing "---" at EOF
        // without a newline does not count.
        assert!(split("---\ntitle: Test\n---").is_none());
    }

    #[test]
    fn test_four_hyphens_is_not_a_delimiter() {
        assert!(split("---\ntitle: Test\n----\nbody").is_none());
        assert!(split("----\ntitle: Test\n---\nbody").is_none());
    }
}
