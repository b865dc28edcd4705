//! Search index generation.
//!
//! Writes a flat JSON array for a client-side search UI. There is no ranking
//! or inverted index; the client matches against `content` directly.
//!
//! # Index Format
//!
//! ```json
//! [
//!   {
//!     "title": "Hello",
//!     "description": "First post…",
//!     "date": "2025-06-15",
//!     "url": "/blog/hello/",
//!     "category": ["Notes", "Life"],
//!     "content": "Hello First post body"
//!   }
//! ]
//! ```

use crate::{
    build::Site,
    config::SearchContent,
    content::Post,
    log,
    utils::{
        category::CategoryField, date::format_date, excerpt::markdown_to_text, html::html_to_text,
    },
};
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Public API
// ============================================================================

/// Build the search index if enabled in config.
///
/// Returns the path written, or `None` when disabled.
pub fn build_search(site: &Site) -> Result<Option<PathBuf>> {
    let config = site.config;
    if !config.build.search.enable {
        return Ok(None);
    }

    let index = SearchIndex::from_posts(
        &site.posts,
        &config.build.pages,
        config.build.excerpt.max_length,
        config.build.search.content,
    );
    let path = config.search_path();
    index.write(&path, config.build.search.pretty)?;

    Ok(Some(path))
}

// ============================================================================
// Search Index
// ============================================================================

/// One post in the search index.
///
/// Field order is the key order of the JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchEntry {
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DD`, or `""` when the post has no usable date
    pub date: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryField>,
    /// Plain text of the body
    pub content: String,
}

/// Search index sorted by date, newest first.
#[derive(Debug, Default)]
pub struct SearchIndex {
    pub entries: Vec<SearchEntry>,
}

impl SearchIndex {
    /// Build entries for all posts.
    ///
    /// Posts whose URL cannot be resolved are logged and dropped. Ties in
    /// date keep the order of `posts`.
    pub fn from_posts(
        posts: &[Post],
        pages_dir: &Path,
        excerpt_length: usize,
        content: SearchContent,
    ) -> Self {
        let mut entries: Vec<SearchEntry> = posts
            .par_iter()
            .filter_map(|post| {
                SearchEntry::from_post(post, pages_dir, excerpt_length, content)
                    .inspect_err(|err| {
                        log!("search"; "skipping {}: {:#}", post.paths.relative, err)
                    })
                    .ok()
            })
            .collect();

        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Serialize as a JSON array.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(&self.entries)
        } else {
            serde_json::to_string(&self.entries)
        };
        json.context("Failed to serialize search index")
    }

    /// Write the index to `path`, creating parent directories as needed.
    pub fn write(&self, path: &Path, pretty: bool) -> Result<()> {
        let json = self.to_json(pretty)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::write(path, json)
            .with_context(|| format!("Failed to write search index to {}", path.display()))?;

        log!(
            "search";
            "{} ({} entries)",
            path.file_name().unwrap_or_default().to_string_lossy(),
            self.len()
        );
        Ok(())
    }
}

impl SearchEntry {
    fn from_post(
        post: &Post,
        pages_dir: &Path,
        excerpt_length: usize,
        content: SearchContent,
    ) -> Result<Self> {
        let url = post.url(pages_dir)?;
        let content = match content {
            SearchContent::Html => html_to_text(&post.compiled_content()),
            SearchContent::Markdown => markdown_to_text(post.body()),
        };

        Ok(Self {
            title: post.title().to_owned(),
            description: post
                .meta
                .description
                .clone()
                .unwrap_or_else(|| post.excerpt(excerpt_length)),
            date: format_date(post.date()),
            url,
            category: post.meta.category.as_ref().and_then(CategoryField::normalized),
            content,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
