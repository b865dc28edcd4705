//! hibi - Metadata and search index tooling for a markdown blog.

mod build;
mod cli;
mod config;
mod content;
mod generator;
mod logger;
mod utils;

use anyhow::Result;
use build::{build_site, list_categories, list_months, list_posts};
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use std::path::Path;

fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));
    let config: &'static SiteConfig = Box::leak(Box::new(load_config(cli)?));

    let result = match &cli.command {
        Commands::Build { .. } => build_site(config),
        Commands::List { limit, iso } => list_posts(config, *limit, *iso),
        Commands::Categories => list_categories(config),
        Commands::Months => list_months(config),
    };

    if let Err(err) = &result {
        log!("error"; "{:#}", err);
    }
    result
}

/// Load and validate configuration from CLI arguments
fn load_config(cli: &'static Cli) -> Result<SiteConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let root = shellexpand::tilde(&root.to_string_lossy()).into_owned();
    let config_path = Path::new(&root).join(&cli.config);

    let mut config = if config_path.exists() {
        SiteConfig::from_path(&config_path)?
    } else {
        log!("warn"; "{} not found, using defaults", config_path.display());
        SiteConfig::default()
    };
    config.update_with_cli(cli);
    config.validate()?;

    log!("config"; "pages: {}", config.build.pages.display());
    Ok(config)
}
