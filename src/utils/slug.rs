//! Class-name slugs, category hues and post routes.
//!
//! Slugs and hues are derived with 32-bit FNV-1a so the same category string
//! always produces the same class and colour, in this tool and in any
//! front-end script that hashes the same way.

use anyhow::{Result, anyhow};
use regex::Regex;
use std::{path::Path, sync::LazyLock};

/// FNV-1a 32-bit offset basis
const FNV_OFFSET: u32 = 0x811c_9dc5;
/// FNV-1a 32-bit prime
const FNV_PRIME: u32 = 0x0100_0193;

/// Class used when the input is blank
const FALLBACK_CLASS: &str = "tag";
/// Hue used when the input is blank
const DEFAULT_HUE: u32 = 210;

/// Markdown extensions recognized as posts
pub const POST_EXTENSIONS: &[&str] = &["md", "mdx"];

// ============================================================================
// Hashing
// ============================================================================

/// 32-bit FNV-1a over the UTF-16 code units of `input`.
pub fn fnv1a32(input: &str) -> u32 {
    input.encode_utf16().fold(FNV_OFFSET, |hash, unit| {
        (hash ^ u32::from(unit)).wrapping_mul(FNV_PRIME)
    })
}

// ============================================================================
// Slugification
// ============================================================================

/// Trim whitespace and U+FEFF from both ends, as JavaScript's `trim` does.
pub fn trim_text(input: &str) -> &str {
    input.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

/// Convert arbitrary text (usually a category) into a CSS-safe class name.
///
/// Latin text becomes a readable slug (`"Hello World!"` → `"hello-world"`).
/// Text with nothing ASCII-representable, e.g. `"日本語"`, becomes
/// `tag-<fnv1a hex>`.
pub fn slugify_class(input: &str) -> String {
    static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
    static RE_HYPHENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").unwrap());

    let raw = trim_text(input);
    if raw.is_empty() {
        return FALLBACK_CLASS.to_owned();
    }

    let lowered = raw.to_lowercase();
    let dashed = RE_WHITESPACE.replace_all(&lowered, "-");
    let kept: String = dashed
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_'))
        .collect();
    let collapsed = RE_HYPHENS.replace_all(&kept, "-");
    let ascii = collapsed.trim_matches(['-', '_']);

    if ascii.is_empty() {
        format!("{FALLBACK_CLASS}-{:x}", fnv1a32(raw))
    } else {
        ascii.to_owned()
    }
}

/// Stable colour hue in `[0, 360)` for a category.
pub fn category_hue(input: &str) -> u32 {
    let raw = trim_text(input);
    if raw.is_empty() {
        return DEFAULT_HUE;
    }
    fnv1a32(raw) % 360
}

// ============================================================================
// Routes
// ============================================================================

/// Compute the public route of a post from its source path.
///
/// # Route Mapping Examples
///
/// | Source (relative to pages) | Route |
/// |----------------------------|-------|
/// | `blog/hello.md` | `/blog/hello/` |
/// | `blog/202601/trip/index.md` | `/blog/202601/trip/` |
/// | `index.md` | `/` |
pub fn route_from_source(source: &Path, pages_dir: &Path) -> Result<String> {
    let relative = source.strip_prefix(pages_dir).map_err(|_| {
        anyhow!(
            "{} is outside the pages directory {}",
            source.display(),
            pages_dir.display()
        )
    })?;

    let has_post_ext = relative
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| POST_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
    if !has_post_ext {
        return Err(anyhow!("Not a markdown post: {}", source.display()));
    }

    let mut parts = relative
        .with_extension("")
        .components()
        .map(|c| {
            c.as_os_str()
                .to_str()
                .map(str::to_owned)
                .ok_or_else(|| anyhow!("Invalid path encoding: {}", source.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    // index.md is the route of its directory
    if parts.last().is_some_and(|last| last == "index") {
        parts.pop();
    }

    if parts.is_empty() {
        Ok("/".to_owned())
    } else {
        Ok(format!("/{}/", parts.join("/")))
    }
}
