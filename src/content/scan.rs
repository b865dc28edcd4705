//! Post discovery.
//!
//! Walks the posts directory in file-name order so repeated scans of the same
//! tree always yield posts in the same order.

use super::meta::Post;
use crate::{log, utils::slug::POST_EXTENSIONS};
use anyhow::{Result, bail};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Files to ignore during directory traversal
const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// Check whether `path` has a markdown post extension.
pub fn is_post_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| POST_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Collect all post files below `dir`, sorted by path.
///
/// Entries that cannot be read are logged and skipped. A missing `dir` is an
/// error.
pub fn collect_post_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("Posts directory not found: {}", dir.display());
    }

    let files = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| {
            entry
                .inspect_err(|err| log!("scan"; "skipping entry: {}", err))
                .ok()
        })
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name)
        })
        .filter(|e| is_post_file(e.path()))
        .map(DirEntry::into_path)
        .collect();

    Ok(files)
}

/// Load every post below `posts_dir`, reading only front matter.
///
/// With `date_from_slug`, posts lacking a front-matter date take it from a
/// `YYYY-MM-DD-` file-name prefix.
pub fn load_posts(pages_dir: &Path, posts_dir: &Path, date_from_slug: bool) -> Result<Vec<Post>> {
    let files = collect_post_files(posts_dir)?;

    let posts: Vec<Post> = files
        .into_par_iter()
        .filter_map(|path| {
            Post::from_file(path, pages_dir)
                .inspect_err(|err| log!("scan"; "{:#}", err))
                .ok()
        })
        .map(|mut post| {
            if date_from_slug {
                post.fill_date_from_slug();
            }
            post
        })
        .collect();

    log!("scan"; "found {} posts in {}", posts.len(), posts_dir.display());
    Ok(posts)
}
