//! Post metadata and lazily loaded content.
//!
//! A `Post` is created from its front matter alone. The body is fetched
//! through a [`ContentSource`] the first time it is needed and cached for the
//! rest of the build.
//!
//! # Fields
//!
//! | Field | Example | Used By |
//! |-------|---------|---------|
//! | `paths.source` | `src/pages/blog/hello.md` | routing, body loading |
//! | `paths.relative` | `blog/hello.md` | logging |
//! | `meta` | parsed front matter | collections, search index |

use super::frontmatter::{FrontMatter, decode_lossy, read_front_matter, split_front_matter};
use crate::{
    log,
    utils::{
        category::normalize_category,
        date::{DateValue, date_from_slug},
        excerpt::excerpt_from_body,
        slug::route_from_source,
    },
};
use anyhow::{Context, Result};
use pulldown_cmark::{Options, Parser, html};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    sync::{Arc, OnceLock},
};

// ============================================================================
// Content Source
// ============================================================================

/// Capability to fetch the full text (front matter included) of a post.
pub trait ContentSource: Send + Sync {
    fn load(&self) -> Result<String>;
}

/// Reads the post from disk on demand.
#[derive(Debug, Clone)]
pub struct FileSource(pub PathBuf);

impl ContentSource for FileSource {
    fn load(&self) -> Result<String> {
        fs::read(&self.0)
            .with_context(|| format!("Failed to read {}", self.0.display()))
            .map(|bytes| decode_lossy(bytes, &self.0))
    }
}

/// In-memory text, used for posts that never touched the disk.
impl ContentSource for String {
    fn load(&self) -> Result<String> {
        Ok(self.clone())
    }
}

// ============================================================================
// Post
// ============================================================================

/// Path information for a post.
#[derive(Debug, Clone)]
pub struct PostPaths {
    /// Source file path
    pub source: PathBuf,
    /// Path relative to the pages directory (for logging)
    pub relative: String,
}

/// A markdown post with its front matter.
pub struct Post {
    pub paths: PostPaths,
    pub meta: FrontMatter,
    source: Arc<dyn ContentSource>,
    raw: OnceLock<String>,
}

impl fmt::Debug for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Post")
            .field("paths", &self.paths)
            .field("meta", &self.meta)
            .field("loaded", &self.raw.get().is_some())
            .finish()
    }
}

impl Post {
    pub fn new(paths: PostPaths, meta: FrontMatter, source: Arc<dyn ContentSource>) -> Self {
        Self {
            paths,
            meta,
            source,
            raw: OnceLock::new(),
        }
    }

    /// Create a post from a file, reading only its front-matter block.
    ///
    /// Invalid YAML is logged and leaves the post with default metadata.
    pub fn from_file(source: PathBuf, pages_dir: &Path) -> Result<Self> {
        let yaml = read_front_matter(&source)?;
        let meta = parse_meta(yaml.as_deref(), &source);
        let paths = PostPaths {
            relative: relative_path(&source, pages_dir),
            source: source.clone(),
        };

        Ok(Self::new(paths, meta, Arc::new(FileSource(source))))
    }

    /// Create a post from in-memory text at a virtual `source` path.
    #[cfg(test)]
    pub fn from_text(source: PathBuf, pages_dir: &Path, text: impl Into<String>) -> Self {
        let text = text.into();
        let meta = parse_meta(split_front_matter(&text).0, &source);
        let paths = PostPaths {
            relative: relative_path(&source, pages_dir),
            source,
        };

        Self::new(paths, meta, Arc::new(text))
    }

    /// Full text of the post, front matter included.
    ///
    /// Loaded once. A failed load is logged and yields `""`.
    pub fn raw_content(&self) -> &str {
        self.raw.get_or_init(|| {
            self.source.load().unwrap_or_else(|err| {
                log!("post"; "{:#}", err);
                String::new()
            })
        })
    }

    /// Markdown body with the front-matter block stripped.
    pub fn body(&self) -> &str {
        split_front_matter(self.raw_content()).1
    }

    /// Body rendered to HTML.
    pub fn compiled_content(&self) -> String {
        let parser = Parser::new_ext(self.body(), markdown_options());
        let mut out = String::new();
        html::push_html(&mut out, parser);
        out
    }

    /// Excerpt shown in listings and search results.
    ///
    /// A hand-written `excerpt` or `description` is used verbatim; otherwise
    /// one is extracted from the body.
    pub fn excerpt(&self, max_length: usize) -> String {
        self.meta
            .excerpt
            .as_ref()
            .or(self.meta.description.as_ref())
            .cloned()
            .unwrap_or_else(|| excerpt_from_body(self.body(), max_length))
    }

    /// Public route of the post, e.g. `/blog/hello/`.
    pub fn url(&self, pages_dir: &Path) -> Result<String> {
        route_from_source(&self.paths.source, pages_dir)
    }

    pub fn title(&self) -> &str {
        self.meta.title.as_deref().unwrap_or_default()
    }

    pub fn date(&self) -> Option<&DateValue> {
        self.meta.date.as_ref()
    }

    pub fn categories(&self) -> Vec<String> {
        normalize_category(self.meta.category.as_ref())
    }

    /// Use a `YYYY-MM-DD-` file-name prefix as the date when front matter has none.
    ///
    /// Returns whether a date was filled in.
    pub fn fill_date_from_slug(&mut self) -> bool {
        if self.meta.date.is_some() {
            return false;
        }
        let Some(date) = self
            .paths
            .source
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(date_from_slug)
        else {
            return false;
        };
        self.meta.date = Some(DateValue::Text(date));
        true
    }
}

fn parse_meta(yaml: Option<&str>, source: &Path) -> FrontMatter {
    let Some(yaml) = yaml else {
        return FrontMatter::default();
    };
    FrontMatter::parse(yaml).unwrap_or_else(|err| {
        log!("post"; "{}: {}, using defaults", source.display(), err);
        FrontMatter::default()
    })
}

fn relative_path(source: &Path, pages_dir: &Path) -> String {
    source
        .strip_prefix(pages_dir)
        .unwrap_or(source)
        .to_string_lossy()
        .replace('\\', "/")
}

fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
}
