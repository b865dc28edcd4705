//! Site configuration management.
//!
//! Handles loading, parsing, and validating the `hibi.toml` configuration file.

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Default values for serde deserialization
pub mod config_defaults {
    pub fn r#true() -> bool {
        true
    }

    pub fn r#false() -> bool {
        false
    }

    pub mod base {
        pub fn title() -> String {
            "hibi".into()
        }
    }

    pub mod build {
        use std::path::PathBuf;

        pub fn root() -> Option<PathBuf> {
            None
        }
        pub fn pages() -> PathBuf {
            "src/pages".into()
        }
        pub fn posts() -> PathBuf {
            "blog".into()
        }
        pub fn output() -> PathBuf {
            "public".into()
        }

        pub mod excerpt {
            pub fn max_length() -> usize {
                crate::utils::excerpt::DEFAULT_EXCERPT_LENGTH
            }
        }

        pub mod search {
            use crate::config::SearchContent;
            use std::path::PathBuf;

            pub fn path() -> PathBuf {
                "search.json".into()
            }
            pub fn content() -> SearchContent {
                SearchContent::default()
            }
        }
    }
}

/// Where the searchable `content` text of an index entry comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchContent {
    /// Render the body to HTML, then strip markup (default)
    #[default]
    Html,
    /// Strip markdown syntax from the raw body
    Markdown,
}

/// `[base]` section in hibi.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BaseConfig {
    /// Blog title
    #[serde(default = "config_defaults::base::title")]
    #[educe(Default = config_defaults::base::title())]
    pub title: String,

    /// Blog description
    #[serde(default)]
    pub description: String,
}

/// `[build]` section in hibi.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Root directory path
    #[serde(default = "config_defaults::build::root")]
    #[educe(Default = config_defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Pages directory, the routing root (relative to root)
    #[serde(default = "config_defaults::build::pages")]
    #[educe(Default = config_defaults::build::pages())]
    pub pages: PathBuf,

    /// Posts directory (relative to pages)
    #[serde(default = "config_defaults::build::posts")]
    #[educe(Default = config_defaults::build::posts())]
    pub posts: PathBuf,

    /// Output directory path (relative to root)
    #[serde(default = "config_defaults::build::output")]
    #[educe(Default = config_defaults::build::output())]
    pub output: PathBuf,

    /// Fill missing dates from `YYYY-MM-DD-` file-name prefixes
    #[serde(default = "config_defaults::r#false")]
    #[educe(Default = false)]
    pub date_from_slug: bool,

    /// Excerpt settings
    #[serde(default)]
    pub excerpt: ExcerptConfig,

    /// Search index settings
    #[serde(default)]
    pub search: SearchConfig,
}

/// `[build.excerpt]` section
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ExcerptConfig {
    /// Maximum excerpt length in characters
    #[serde(default = "config_defaults::build::excerpt::max_length")]
    #[educe(Default = config_defaults::build::excerpt::max_length())]
    pub max_length: usize,
}

/// `[build.search]` section
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Enable search index generation
    #[serde(default = "config_defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    /// Output path for the index (relative to output)
    #[serde(default = "config_defaults::build::search::path")]
    #[educe(Default = config_defaults::build::search::path())]
    pub path: PathBuf,

    /// Source of the searchable text
    #[serde(default = "config_defaults::build::search::content")]
    #[educe(Default = config_defaults::build::search::content())]
    pub content: SearchContent,

    /// Pretty-print the JSON
    #[serde(default = "config_defaults::r#true")]
    #[educe(Default = true)]
    pub pretty: bool,
}

/// Root configuration structure representing hibi.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Path of the loaded config file
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Basic blog information
    #[serde(default)]
    pub base: BaseConfig,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let mut config = Self::from_str(&content)?;
        config.config_path = path.to_path_buf();
        Ok(config)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Directory holding the posts
    pub fn posts_dir(&self) -> PathBuf {
        self.build.pages.join(&self.build.posts)
    }

    /// Route prefix of the posts, e.g. `/blog`
    pub fn posts_route(&self) -> String {
        let posts = self.build.posts.to_string_lossy().replace('\\', "/");
        let posts = posts.trim_matches('/');
        if posts.is_empty() {
            String::new()
        } else {
            format!("/{posts}")
        }
    }

    /// Full path of the search index file
    pub fn search_path(&self) -> PathBuf {
        self.build.output.join(&self.build.search.path)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli
            .root
            .as_ref()
            .cloned()
            .unwrap_or_else(|| self.get_root().to_owned());
        let root = PathBuf::from(shellexpand::tilde(&root.to_string_lossy()).into_owned());

        Self::update_option(&mut self.build.pages, cli.pages.as_ref());
        Self::update_option(&mut self.build.output, cli.output.as_ref());
        self.update_path_with_root(&root);

        if let Commands::Build {
            pretty,
            date_from_slug,
        } = &cli.command
        {
            Self::update_option(&mut self.build.search.pretty, pretty.as_ref());
            Self::update_option(&mut self.build.date_from_slug, date_from_slug.as_ref());
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Update all paths relative to root directory
    fn update_path_with_root(&mut self, root: &Path) {
        self.set_root(root);
        self.build.pages = root.join(&self.build.pages);
        self.build.output = root.join(&self.build.output);
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.build.excerpt.max_length == 0 {
            bail!(ConfigError::Validation(
                "[build.excerpt.max_length] must be greater than 0".into()
            ));
        }

        let search_path = &self.build.search.path;
        if search_path.as_os_str().is_empty() {
            bail!(ConfigError::Validation("[build.search.path] must not be empty".into()));
        }
        if search_path.is_absolute() {
            bail!(ConfigError::Validation(
                "[build.search.path] must be relative to [build.output]".into()
            ));
        }

        if self.build.posts.is_absolute() {
            bail!(ConfigError::Validation(
                "[build.posts] must be relative to [build.pages]".into()
            ));
        }

        Ok(())
    }
}

#[test]
fn validate_base_config() {
    let config = r#"
        [base]
        title = "愛と幽相"
        description = "ただのブログ。"
    "#;
    let config: SiteConfig = toml::from_str(config).unwrap();

    assert_eq!(config.base.title, "愛と幽相");
    assert_eq!(config.base.description, "ただのブログ。");
}

#[test]
fn test_base_config_defaults() {
    let config: SiteConfig = toml::from_str("[base]\n").unwrap();

    assert_eq!(config.base.title, "hibi");
    assert_eq!(config.base.description, "");
}

#[test]
fn test_build_config_defaults() {
    let config: SiteConfig = toml::from_str("").unwrap();

    assert_eq!(config.build.root, None);
    assert_eq!(config.build.pages, PathBuf::from("src/pages"));
    assert_eq!(config.build.posts, PathBuf::from("blog"));
    assert_eq!(config.build.output, PathBuf::from("public"));
    assert!(!config.build.date_from_slug);
    assert_eq!(config.build.excerpt.max_length, 140);
    assert!(config.build.search.enable);
    assert_eq!(config.build.search.path, PathBuf::from("search.json"));
    assert_eq!(config.build.search.content, SearchContent::Html);
    assert!(config.build.search.pretty);
}

#[test]
fn test_default_matches_empty_file() {
    let parsed: SiteConfig = toml::from_str("").unwrap();
    let default = SiteConfig::default();

    assert_eq!(parsed.base.title, default.base.title);
    assert_eq!(parsed.build.pages, default.build.pages);
    assert_eq!(parsed.build.excerpt.max_length, default.build.excerpt.max_length);
    assert_eq!(parsed.build.search.enable, default.build.search.enable);
    assert_eq!(parsed.build.search.pretty, default.build.search.pretty);
}

#[test]
fn test_build_search_config() {
    let config = r#"
        [build.search]
        enable = false
        path = "assets/index.json"
        content = "markdown"
        pretty = false
    "#;
    let config: SiteConfig = toml::from_str(config).unwrap();

    assert!(!config.build.search.enable);
    assert_eq!(config.build.search.path, PathBuf::from("assets/index.json"));
    assert_eq!(config.build.search.content, SearchContent::Markdown);
    assert!(!config.build.search.pretty);
}

#[test]
fn test_build_excerpt_config() {
    let config = r#"
        [build]
        date_from_slug = true

        [build.excerpt]
        max_length = 80
    "#;
    let config: SiteConfig = toml::from_str(config).unwrap();

    assert!(config.build.date_from_slug);
    assert_eq!(config.build.excerpt.max_length, 80);
}

#[test]
fn test_search_content_parsing() {
    let config = r#"
        [build.search]
        content = "pdf"
    "#;
    assert!(toml::from_str::<SiteConfig>(config).is_err());
}

#[test]
fn test_unknown_field_rejection_in_base() {
    let config = r#"
        [base]
        title = "Test"
        unknown_field = "should fail"
    "#;
    assert!(toml::from_str::<SiteConfig>(config).is_err());
}

#[test]
fn test_unknown_field_rejection_in_build() {
    let config = r#"
        [build]
        minify = true
    "#;
    assert!(toml::from_str::<SiteConfig>(config).is_err());
}

#[test]
fn test_unknown_section_rejection() {
    let config = r#"
        [serve]
        port = 8080
    "#;
    assert!(toml::from_str::<SiteConfig>(config).is_err());
}

#[test]
fn test_from_str_invalid_toml() {
    let result = SiteConfig::from_str("[base\ntitle = ");
    let err = result.unwrap_err();
    assert!(err.downcast_ref::<ConfigError>().is_some());
}

#[test]
fn test_from_path() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("hibi.toml");
    fs::write(&path, "[base]\ntitle = \"x\"\n").unwrap();

    let config = SiteConfig::from_path(&path).unwrap();
    assert_eq!(config.base.title, "x");
    assert_eq!(config.config_path, path);
}

#[test]
fn test_from_path_missing() {
    let dir = tempfile::TempDir::new().unwrap();
    let err = SiteConfig::from_path(&dir.path().join("hibi.toml")).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::Io(..))
    ));
}

#[test]
fn test_get_root_default() {
    let config = SiteConfig::default();
    assert_eq!(config.get_root(), Path::new("./"));
}

#[test]
fn test_set_root() {
    let mut config = SiteConfig::default();
    config.set_root(Path::new("/custom/path"));
    assert_eq!(config.get_root(), Path::new("/custom/path"));
}

#[test]
fn test_derived_paths() {
    let mut config = SiteConfig::default();
    config.update_path_with_root(Path::new("/site"));

    assert_eq!(config.build.pages, PathBuf::from("/site/src/pages"));
    assert_eq!(config.posts_dir(), PathBuf::from("/site/src/pages/blog"));
    assert_eq!(config.search_path(), PathBuf::from("/site/public/search.json"));
    assert_eq!(config.posts_route(), "/blog");
}

#[test]
fn test_posts_route_nested() {
    let mut config = SiteConfig::default();
    config.build.posts = PathBuf::from("notes/daily/");
    assert_eq!(config.posts_route(), "/notes/daily");

    config.build.posts = PathBuf::from("");
    assert_eq!(config.posts_route(), "");
}

#[test]
fn test_update_with_cli() {
    use clap::Parser;

    let cli = Cli::parse_from([
        "hibi", "-r", "/site", "-o", "dist", "build", "--pretty=false", "--date-from-slug",
    ]);
    let mut config = SiteConfig::default();
    config.update_with_cli(&cli);

    assert_eq!(config.get_root(), Path::new("/site"));
    assert_eq!(config.build.output, PathBuf::from("/site/dist"));
    assert_eq!(config.build.pages, PathBuf::from("/site/src/pages"));
    assert!(!config.build.search.pretty);
    assert!(config.build.date_from_slug);
}

#[test]
fn test_update_with_cli_keeps_config_values() {
    use clap::Parser;

    let cli = Cli::parse_from(["hibi", "-r", "/site", "list"]);
    let mut config: SiteConfig = toml::from_str("[build]\ndate_from_slug = true\n").unwrap();
    config.update_with_cli(&cli);

    assert!(config.build.date_from_slug);
    assert!(config.build.search.pretty);
}

#[test]
fn test_validate() {
    assert!(SiteConfig::default().validate().is_ok());

    let mut config = SiteConfig::default();
    config.build.excerpt.max_length = 0;
    assert!(config.validate().is_err());

    let mut config = SiteConfig::default();
    config.build.search.path = PathBuf::new();
    assert!(config.validate().is_err());

    let mut config = SiteConfig::default();
    config.build.search.path = PathBuf::from("/abs/search.json");
    let err = config.validate().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::Validation(_))
    ));
}

#[test]
fn test_config_error_display() {
    let io_err = ConfigError::Io(
        PathBuf::from("test.toml"),
        std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
    );
    let display = format!("{}", io_err);
    assert!(display.contains("IO error"));
    assert!(display.contains("test.toml"));

    let validation_err = ConfigError::Validation("Test validation error".to_string());
    let display = format!("{}", validation_err);
    assert!(display.contains("Test validation error"));
}
