//! Per-build state and command orchestration.
//!
//! A [`Site`] is created once per invocation and dropped at the end, so
//! memoized values never outlive a single build.
//!
//! # Architecture
//!
//! ```text
//! Site::load()
//!     │
//!     ├── load_posts() ──► Post[] (front matter only)
//!     │
//!     ├── build_search() ──► search.json
//!     │
//!     └── categories() / months() / sorted_posts() / last_updated()
//! ```

use crate::{
    config::SiteConfig,
    content::{Post, get_categories, get_months, last_updated, load_posts, sort_posts_desc},
    generator::search::build_search,
    log,
    utils::{
        category::{category_route, month_route},
        date::{format_date, month_key, to_iso},
        slug::{category_hue, slugify_class},
    },
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::OnceLock;

/// Posts and derived data for one build.
pub struct Site<'a> {
    pub config: &'a SiteConfig,
    pub posts: Vec<Post>,
    /// Build time, used for posts without a date
    pub now: DateTime<Utc>,
    last_updated: OnceLock<Option<String>>,
}

impl<'a> Site<'a> {
    pub fn new(config: &'a SiteConfig, posts: Vec<Post>, now: DateTime<Utc>) -> Self {
        Self {
            config,
            posts,
            now,
            last_updated: OnceLock::new(),
        }
    }

    /// Scan the posts directory.
    pub fn load(config: &'a SiteConfig) -> Result<Self> {
        let posts = load_posts(
            &config.build.pages,
            &config.posts_dir(),
            config.build.date_from_slug,
        )
        .context("Failed to load posts")?;
        Ok(Self::new(config, posts, Utc::now()))
    }

    pub fn categories(&self) -> Vec<String> {
        get_categories(&self.posts)
    }

    pub fn months(&self) -> Vec<String> {
        get_months(&self.posts)
    }

    pub fn sorted_posts(&self) -> Vec<&Post> {
        sort_posts_desc(&self.posts, self.now)
    }

    /// Newest post date as `YYYY/MM/DD`, computed once per build.
    pub fn last_updated(&self) -> Option<&str> {
        self.last_updated
            .get_or_init(|| last_updated(&self.posts))
            .as_deref()
    }

    /// Number of posts in each category.
    pub fn category_counts(&self) -> FxHashMap<String, usize> {
        let mut counts = FxHashMap::default();
        for post in &self.posts {
            let unique: FxHashSet<String> = post.categories().into_iter().collect();
            for category in unique {
                *counts.entry(category).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Number of posts in each `YYYY-MM` month.
    pub fn month_counts(&self) -> FxHashMap<String, usize> {
        let mut counts = FxHashMap::default();
        for month in self.posts.iter().filter_map(|p| month_key(p.date())) {
            *counts.entry(month).or_insert(0) += 1;
        }
        counts
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Scan posts and write the search index.
pub fn build_site(config: &SiteConfig) -> Result<()> {
    let site = Site::load(config)?;

    match build_search(&site)? {
        Some(path) => log!("build"; "wrote {}", path.display()),
        None => log!("build"; "search index disabled, nothing to write"),
    }
    if let Some(date) = site.last_updated() {
        log!("build"; "last updated {}", date);
    }

    Ok(())
}

/// Print posts newest first with their excerpts.
pub fn list_posts(config: &SiteConfig, limit: Option<usize>, iso: bool) -> Result<()> {
    let site = Site::load(config)?;
    let pages = &config.build.pages;
    let max_length = config.build.excerpt.max_length;

    log!(
        "list";
        "{} ({} posts, last updated {})",
        config.base.title,
        site.posts.len(),
        site.last_updated().unwrap_or("never")
    );

    let width = if iso { 24 } else { 10 };
    for post in site.sorted_posts().into_iter().take(limit.unwrap_or(usize::MAX)) {
        let url = post
            .url(pages)
            .unwrap_or_else(|_| post.paths.relative.clone());
        println!("{:<width$}  {}  {}", date_column(post, iso), post.title(), url);

        let excerpt = post.excerpt(max_length);
        if !excerpt.is_empty() {
            println!("{:width$}  {excerpt}", "");
        }
    }

    Ok(())
}

/// Date shown in `list` rows; empty when the post has no usable date.
fn date_column(post: &Post, iso: bool) -> String {
    if iso {
        to_iso(post.date()).unwrap_or_default()
    } else {
        format_date(post.date())
    }
}

/// Print categories with class, hue, count and listing route.
pub fn list_categories(config: &SiteConfig) -> Result<()> {
    let site = Site::load(config)?;
    let counts = site.category_counts();
    let posts_route = config.posts_route();

    for category in site.categories() {
        println!(
            "{}  .{}  hue={}  posts={}  {}",
            category,
            slugify_class(&category),
            category_hue(&category),
            counts.get(&category).copied().unwrap_or_default(),
            category_route(&posts_route, &category)
        );
    }

    Ok(())
}

/// Print months newest first with post counts and archive routes.
pub fn list_months(config: &SiteConfig) -> Result<()> {
    let site = Site::load(config)?;
    let counts = site.month_counts();
    let posts_route = config.posts_route();

    for month in site.months() {
        println!(
            "{}  posts={}  {}",
            month,
            counts.get(&month).copied().unwrap_or_default(),
            month_route(&posts_route, &month)
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::{
        fs,
        path::{Path, PathBuf},
    };
    use tempfile::TempDir;

    fn config_at(root: &Path) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.set_root(root);
        config.build.pages = root.join("src/pages");
        config.build.output = root.join("public");
        config
    }

    fn write_post(config: &SiteConfig, name: &str, content: &str) {
        let path = config.posts_dir().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn post(name: &str, front: &str) -> Post {
        Post::from_text(
            PathBuf::from("src/pages/blog").join(name),
            Path::new("src/pages"),
            format!("---\n{front}\n---\n"),
        )
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_last_updated_memoized() {
        let config = SiteConfig::default();
        let site = Site::new(
            &config,
            vec![post("a.md", "date: 2025-01-05"), post("b.md", "date: 2025-06-15")],
            now(),
        );

        let first = site.last_updated();
        assert_eq!(first, Some("2025/06/15"));
        let second = site.last_updated();
        assert!(std::ptr::eq(first.unwrap(), second.unwrap()));
    }

    #[test]
    fn test_last_updated_none_without_dates() {
        let config = SiteConfig::default();
        let site = Site::new(&config, vec![post("a.md", "title: x")], now());
        assert_eq!(site.last_updated(), None);
    }

    #[test]
    fn test_counts() {
        let config = SiteConfig::default();
        let site = Site::new(
            &config,
            vec![
                post("a.md", "date: 2025-06-01\ncategory: Notes"),
                post("b.md", "date: 2025-06-15\ncategory: [Notes, Life, Notes]"),
                post("c.md", "date: 2025-05-02"),
            ],
            now(),
        );

        let categories = site.category_counts();
        assert_eq!(categories["Notes"], 2);
        assert_eq!(categories["Life"], 1);

        let months = site.month_counts();
        assert_eq!(months["2025-06"], 2);
        assert_eq!(months["2025-05"], 1);
        assert_eq!(site.months(), vec!["2025-06", "2025-05"]);
        assert_eq!(site.categories(), vec!["Life", "Notes"]);
    }

    #[test]
    fn test_date_column() {
        let dated = post("a.md", "date: 2025-01-05");
        assert_eq!(date_column(&dated, false), "2025-01-05");
        assert_eq!(date_column(&dated, true), "2025-01-05T00:00:00.000Z");

        let undated = post("b.md", "title: x");
        assert_eq!(date_column(&undated, false), "");
        assert_eq!(date_column(&undated, true), "");
    }

    #[test]
    fn test_build_site_writes_index() {
        let dir = TempDir::new().unwrap();
        let config = config_at(dir.path());
        write_post(&config, "hello.md", "---\ntitle: Hello\ndate: 2025-06-01\n---\nHi.\n");

        build_site(&config).unwrap();

        let json = fs::read_to_string(config.search_path()).unwrap();
        assert!(json.contains(r#""url": "/blog/hello/""#));
    }

    #[test]
    fn test_build_site_disabled_search() {
        let dir = TempDir::new().unwrap();
        let mut config = config_at(dir.path());
        config.build.search.enable = false;
        write_post(&config, "hello.md", "Hi.\n");

        build_site(&config).unwrap();
        assert!(!config.search_path().exists());
    }

    #[test]
    fn test_build_site_missing_posts_dir() {
        let dir = TempDir::new().unwrap();
        let config = config_at(dir.path());
        assert!(build_site(&config).is_err());
    }

    #[test]
    fn test_list_commands_run() {
        let dir = TempDir::new().unwrap();
        let config = config_at(dir.path());
        write_post(&config, "a.md", "---\ntitle: A\ndate: 2025-06-01\ncategory: 日記\n---\nBody.\n");
        write_post(&config, "b.md", "---\ntitle: B\n---\n");

        assert!(list_posts(&config, Some(1), false).is_ok());
        assert!(list_posts(&config, None, true).is_ok());
        assert!(list_categories(&config).is_ok());
        assert!(list_months(&config).is_ok());
    }
}
