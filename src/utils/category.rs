//! Category normalization, collation and listing routes.
//!
//! Front matter may carry `category: 日記` or `category: [日記, Rust]`.
//! Everything downstream works on the normalized list.

use super::slug::trim_text;
use serde::Serialize;
use std::cmp::Ordering;

/// A `category` field as written in front matter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CategoryField {
    One(String),
    Many(Vec<String>),
}

impl CategoryField {
    /// Normalize elements while keeping the scalar/list shape.
    ///
    /// Returns `None` when nothing survives normalization.
    pub fn normalized(&self) -> Option<Self> {
        let items = normalize_category(Some(self));
        match self {
            _ if items.is_empty() => None,
            Self::One(_) => items.into_iter().next().map(Self::One),
            Self::Many(_) => Some(Self::Many(items)),
        }
    }
}

/// Coerce a category field into a list of trimmed, non-empty names.
///
/// Input order is preserved; duplicates within one post are kept.
pub fn normalize_category(field: Option<&CategoryField>) -> Vec<String> {
    let items: &[String] = match field {
        None => &[],
        Some(CategoryField::One(one)) => std::slice::from_ref(one),
        Some(CategoryField::Many(many)) => many,
    };
    items
        .iter()
        .map(|c| trim_text(c))
        .filter(|c| !c.is_empty())
        .map(str::to_owned)
        .collect()
}

// ============================================================================
// Collation
// ============================================================================

/// Script groups at the primary collation level, in sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Script {
    Space,
    Punct,
    Digit,
    Latin,
    Greek,
    Cyrillic,
    OtherAlpha,
    Kana,
    Han,
    Other,
}

/// Locale-aware comparison for category names in mixed Latin/Japanese text.
///
/// Primary level: script group (Latin before kana before kanji), then the
/// case-, width- and kana-folded character. Ties fall back to lowercase
/// before uppercase and hiragana before katakana, then code point order.
pub fn collate(a: &str, b: &str) -> Ordering {
    let primary = |s: &str| s.chars().map(primary_key).collect::<Vec<_>>();
    let tertiary = |s: &str| {
        s.chars()
            .map(|c| (c.is_uppercase(), is_katakana(c)))
            .collect::<Vec<_>>()
    };

    primary(a)
        .cmp(&primary(b))
        .then_with(|| tertiary(a).cmp(&tertiary(b)))
        .then_with(|| a.cmp(b))
}

fn primary_key(c: char) -> (Script, char) {
    let c = fold_width(c);
    let script = match c {
        _ if c.is_whitespace() => Script::Space,
        _ if c.is_numeric() => Script::Digit,
        '\u{3041}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}' => Script::Kana,
        '\u{3005}' | '\u{3400}'..='\u{4DBF}' | '\u{4E00}'..='\u{9FFF}' | '\u{F900}'..='\u{FAFF}' => {
            Script::Han
        }
        _ if c.is_alphabetic() && (c.is_ascii() || ('\u{00C0}'..='\u{024F}').contains(&c)) => {
            Script::Latin
        }
        '\u{0370}'..='\u{03FF}' => Script::Greek,
        '\u{0400}'..='\u{04FF}' => Script::Cyrillic,
        _ if c.is_alphabetic() => Script::OtherAlpha,
        _ if c.is_ascii_punctuation() || (!c.is_alphanumeric() && !c.is_control()) => {
            Script::Punct
        }
        _ => Script::Other,
    };
    let folded = match script {
        Script::Kana if is_katakana(c) => char::from_u32(c as u32 - 0x60).unwrap_or(c),
        _ => c.to_lowercase().next().unwrap_or(c),
    };
    (script, folded)
}

/// Fullwidth ASCII (`Ａ`, `１`) compares like its ASCII counterpart.
#[inline]
fn fold_width(c: char) -> char {
    match c {
        '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
        '\u{3000}' => ' ',
        _ => c,
    }
}

/// Katakana letters that have a hiragana counterpart (ァ..ヶ).
#[inline]
fn is_katakana(c: char) -> bool {
    ('\u{30A1}'..='\u{30F6}').contains(&c)
}

// ============================================================================
// Listing Routes
// ============================================================================

/// Route of a category listing page, e.g. `/blog/category/%E6%97%A5%E8%A8%98/`.
pub fn category_route(posts_route: &str, category: &str) -> String {
    format!(
        "{}/category/{}/",
        posts_route.trim_end_matches('/'),
        urlencoding::encode(category)
    )
}

/// Route of a month archive page, e.g. `/blog/month/2025-06/`.
pub fn month_route(posts_route: &str, month: &str) -> String {
    format!("{}/month/{month}/", posts_route.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn many(items: &[&str]) -> CategoryField {
        CategoryField::Many(items.iter().map(|s| s.to_string()).collect())
    }

    fn sorted(mut items: Vec<&str>) -> Vec<&str> {
        items.sort_by(|a, b| collate(a, b));
        items
    }

    // ========================================================================
    // normalize_category
    // ========================================================================

    #[test]
    fn test_normalize_category_list() {
        assert_eq!(normalize_category(Some(&many(&["  A ", "", "B"]))), vec!["A", "B"]);
    }

    #[test]
    fn test_normalize_category_absent_and_scalar() {
        assert!(normalize_category(None).is_empty());
        assert_eq!(
            normalize_category(Some(&CategoryField::One(" 日記 ".into()))),
            vec!["日記"]
        );
        assert_eq!(
            normalize_category(Some(&CategoryField::One("\u{feff}Notes".into()))),
            vec!["Notes"]
        );
        assert!(normalize_category(Some(&CategoryField::One("   ".into()))).is_empty());
    }

    #[test]
    fn test_normalize_category_preserves_order() {
        assert_eq!(
            normalize_category(Some(&many(&["b", "a", "b"]))),
            vec!["b", "a", "b"]
        );
    }

    #[test]
    fn test_normalized_keeps_shape() {
        assert_eq!(
            CategoryField::One(" Notes ".into()).normalized(),
            Some(CategoryField::One("Notes".into()))
        );
        assert_eq!(
            many(&["Notes", " ", "Life"]).normalized(),
            Some(many(&["Notes", "Life"]))
        );
        assert_eq!(many(&[" ", ""]).normalized(), None);
        assert_eq!(CategoryField::One(String::new()).normalized(), None);
    }

    #[test]
    fn test_category_field_serializes_untagged() {
        let one = serde_json::to_string(&CategoryField::One("a".into())).unwrap();
        let list = serde_json::to_string(&many(&["a", "b"])).unwrap();
        assert_eq!(one, r#""a""#);
        assert_eq!(list, r#"["a","b"]"#);
    }

    // ========================================================================
    // collate
    // ========================================================================

    #[test]
    fn test_collate_latin_case_insensitive() {
        assert_eq!(sorted(vec!["b", "a"]), vec!["a", "b"]);
        assert_eq!(sorted(vec!["Notes", "Life"]), vec!["Life", "Notes"]);
        assert_eq!(sorted(vec!["banana", "Apple", "cherry"]), vec!["Apple", "banana", "cherry"]);
        assert_eq!(sorted(vec!["A", "a"]), vec!["a", "A"]);
    }

    #[test]
    fn test_collate_script_order() {
        assert_eq!(
            sorted(vec!["日記", "にっき", "Rust", "2024", "ニュース"]),
            vec!["2024", "Rust", "にっき", "ニュース", "日記"]
        );
    }

    #[test]
    fn test_collate_kana_folding() {
        // katakana and hiragana share primary weights
        assert_eq!(sorted(vec!["カメラ", "いぬ"]), vec!["いぬ", "カメラ"]);
        assert_eq!(sorted(vec!["カ", "か"]), vec!["か", "カ"]);
    }

    #[test]
    fn test_collate_fullwidth() {
        assert_eq!(sorted(vec!["Ｂ", "a"]), vec!["a", "Ｂ"]);
    }

    #[test]
    fn test_collate_is_total() {
        assert_eq!(collate("a", "a"), Ordering::Equal);
        assert_ne!(collate("Ａ", "A"), Ordering::Equal);
    }

    // ========================================================================
    // routes
    // ========================================================================

    #[test]
    fn test_category_route_encodes() {
        assert_eq!(category_route("/blog", "Notes"), "/blog/category/Notes/");
        assert_eq!(
            category_route("/blog/", "日記"),
            "/blog/category/%E6%97%A5%E8%A8%98/"
        );
        assert_eq!(category_route("/blog", "a b"), "/blog/category/a%20b/");
    }

    #[test]
    fn test_month_route() {
        assert_eq!(month_route("/blog", "2025-06"), "/blog/month/2025-06/");
    }
}
