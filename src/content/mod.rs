//! Post model, discovery and derived collections.
//!
//! - **frontmatter**: YAML front-matter parsing
//! - **meta**: `Post` and lazy content loading
//! - **scan**: Post discovery below the posts directory
//!
//! # Flow
//!
//! ```text
//! load_posts() ──► Post[] ──┬──► get_categories() / get_months()
//!                           ├──► sort_posts_desc()
//!                           └──► build_search_index()
//! ```

pub mod frontmatter;
pub mod meta;
pub mod scan;

pub use meta::Post;
pub use scan::load_posts;

use crate::utils::{
    category::collate,
    date::{format_ymd_slash, month_key, parse_date},
};
use chrono::{DateTime, Utc};
use rustc_hash::FxHashSet;

/// All categories used by `posts`, deduplicated and collated.
pub fn get_categories(posts: &[Post]) -> Vec<String> {
    let unique: FxHashSet<String> = posts.iter().flat_map(Post::categories).collect();
    let mut categories: Vec<String> = unique.into_iter().collect();
    categories.sort_by(|a, b| collate(a, b));
    categories
}

/// All `YYYY-MM` months that have a post, newest first.
pub fn get_months(posts: &[Post]) -> Vec<String> {
    let unique: FxHashSet<String> = posts.iter().filter_map(|p| month_key(p.date())).collect();
    let mut months: Vec<String> = unique.into_iter().collect();
    months.sort_unstable_by(|a, b| b.cmp(a));
    months
}

/// Posts ordered newest first.
///
/// A post without a usable date sorts as if published at `now`. The sort is
/// stable, so equal dates keep their scan order.
pub fn sort_posts_desc(posts: &[Post], now: DateTime<Utc>) -> Vec<&Post> {
    let mut keyed: Vec<(DateTime<Utc>, &Post)> = posts
        .iter()
        .map(|p| (p.date().and_then(parse_date).unwrap_or(now), p))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| b.cmp(a));
    keyed.into_iter().map(|(_, p)| p).collect()
}

/// Newest parseable post date as `YYYY/MM/DD`.
pub fn last_updated(posts: &[Post]) -> Option<String> {
    posts
        .iter()
        .filter_map(|p| p.date().and_then(parse_date))
        .max()
        .map(format_ymd_slash)
}
