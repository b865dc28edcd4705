//! Plain-text extraction from rendered HTML.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static RE_SCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script\s*>").unwrap());
static RE_STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b.*?</style\s*>").unwrap());
static RE_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static RE_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(?:nbsp|#160|amp|lt|gt|quot|#39);").unwrap());
static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Strip markup from an HTML fragment and return its visible text.
///
/// Script/style blocks and comments are removed entirely, every tag becomes
/// a space, common entities are decoded once and whitespace is collapsed.
pub fn html_to_text(html: &str) -> String {
    let text = RE_SCRIPT.replace_all(html, " ");
    let text = RE_STYLE.replace_all(&text, " ");
    let text = RE_COMMENT.replace_all(&text, " ");
    let text = RE_TAG.replace_all(&text, " ");
    let text = RE_ENTITY.replace_all(&text, |caps: &Captures| decode_entity(&caps[0]));
    collapse_whitespace(&text)
}

/// Collapse whitespace runs into single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    RE_WHITESPACE.replace_all(text, " ").trim().to_owned()
}

fn decode_entity(entity: &str) -> &'static str {
    match entity {
        "&amp;" => "&",
        "&lt;" => "<",
        "&gt;" => ">",
        "&quot;" => "\"",
        "&#39;" => "'",
        // &nbsp; / &#160;
        _ => " ",
    }
}
