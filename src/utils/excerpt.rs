//! Excerpt extraction from markdown bodies.
//!
//! Lines are cleaned one at a time and accumulated until the excerpt is long
//! enough, so only the head of a long post is ever processed.

use crate::utils::html::collapse_whitespace;
use regex::Regex;
use std::sync::LazyLock;

/// Default excerpt length in characters
pub const DEFAULT_EXCERPT_LENGTH: usize = 140;

/// Appended when an excerpt is cut short
const ELLIPSIS: char = '…';

static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static RE_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap());
static RE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(?P<text>[^\]]+)\]\([^)]+\)").unwrap());
static RE_MARKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[`*_>#-]").unwrap());

/// Build an excerpt of at most `max_length` characters from a markdown body.
///
/// The body must already be free of its front-matter block. Headings and
/// blank lines are skipped. An excerpt that runs past `max_length` is cut to
/// `max_length - 1` characters plus `…`.
pub fn excerpt_from_body(body: &str, max_length: usize) -> String {
    let mut cleaned: Vec<String> = Vec::new();
    let mut joined_len = 0;

    for line in body.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let text = clean_markdown_line(line);
        if !text.is_empty() {
            if !cleaned.is_empty() {
                joined_len += 1;
            }
            joined_len += text.chars().count();
            cleaned.push(text);
        }
        if joined_len >= max_length {
            break;
        }
    }

    let out = cleaned.join(" ");
    if joined_len > max_length {
        let mut cut: String = out.chars().take(max_length.saturating_sub(1)).collect();
        cut.push(ELLIPSIS);
        cut
    } else {
        out
    }
}

/// Plain text of a whole markdown body, for search.
///
/// Uses the same per-line cleaning as excerpts, but keeps heading text and
/// never truncates.
pub fn markdown_to_text(body: &str) -> String {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(clean_markdown_line)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip inline HTML and markdown syntax from a single line.
pub fn clean_markdown_line(line: &str) -> String {
    let text = RE_TAG.replace_all(line, "");
    let text = RE_IMAGE.replace_all(&text, "");
    let text = RE_LINK.replace_all(&text, "$text");
    let text = RE_MARKS.replace_all(&text, "");
    collapse_whitespace(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // clean_markdown_line
    // ========================================================================

    #[test]
    fn test_clean_line_inline_markup() {
        assert_eq!(
            clean_markdown_line("Some **bold** and _em_ and `code`"),
            "Some bold and em and code"
        );
        assert_eq!(clean_markdown_line("> quoted   text"), "quoted text");
        assert_eq!(clean_markdown_line("- list item"), "list item");
    }

    #[test]
    fn test_clean_line_links_and_images() {
        assert_eq!(
            clean_markdown_line("see [the docs](https://example.com) ![alt](a.png)"),
            "see the docs"
        );
        assert_eq!(clean_markdown_line("![only an image](x.jpg)"), "");
    }

    #[test]
    fn test_clean_line_html() {
        assert_eq!(
            clean_markdown_line(r#"<span class="x">hi</span> there<br/>"#),
            "hi there"
        );
    }

    // ========================================================================
    // excerpt_from_body
    // ========================================================================

    #[test]
    fn test_excerpt_truncates_with_ellipsis() {
        let body = "# Title\n\nSome **bold** text with a [link](http://x).\n";
        let excerpt = excerpt_from_body(body, 20);
        assert_eq!(excerpt, "Some bold text with…");
        assert_eq!(excerpt.chars().count(), 20);
    }

    #[test]
    fn test_excerpt_short_body_untouched() {
        let body = "# Title\n\nShort one.\n\nSecond line.";
        assert_eq!(excerpt_from_body(body, 140), "Short one. Second line.");
    }

    #[test]
    fn test_excerpt_exact_length_not_truncated() {
        assert_eq!(excerpt_from_body("abcde", 5), "abcde");
        assert_eq!(excerpt_from_body("abcdef", 5), "abcd…");
    }

    #[test]
    fn test_excerpt_stops_accumulating() {
        let body = "first line here\nsecond line\nthird line";
        // "first line here" is 15 chars and already reaches the limit
        assert_eq!(excerpt_from_body(body, 15), "first line here");
    }

    #[test]
    fn test_excerpt_counts_characters() {
        let body = "今日はとても良い天気でした。散歩に行きました。";
        assert_eq!(excerpt_from_body(body, 10), "今日はとても良い天…");
    }

    #[test]
    fn test_excerpt_empty() {
        assert_eq!(excerpt_from_body("", 140), "");
        assert_eq!(excerpt_from_body("# Only\n## Headings\n", 140), "");
        assert_eq!(excerpt_from_body("![img](a.png)\n---\n", 140), "");
    }

    // ========================================================================
    // markdown_to_text
    // ========================================================================

    #[test]
    fn test_markdown_to_text_keeps_headings() {
        let body = "# Title\n\nSome **bold** text with a [link](http://x).\n";
        assert_eq!(
            markdown_to_text(body),
            "Title Some bold text with a link."
        );
    }
}
