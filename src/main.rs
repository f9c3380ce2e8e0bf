use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod badge;
mod blocks;
mod calendar;
mod config;
mod enrichment;
mod generate;
mod git;
mod index;
mod library;
mod links;
mod patch;
mod render;
mod sitemap;
mod types;
mod update;
mod utils;
mod validate;

use config::{RunOptions, SiteConfig, SitePaths};

#[derive(Parser)]
#[command(name = "ohc-site")]
#[command(about = "Generate and patch the Obscure Holiday Calendar website")]
struct Cli {
    /// Site root containing holidays.json and the holiday/ pages
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Warnings and errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every holiday page, badges, the library page and sitemaps
    Generate {
        /// Date shown as "last updated" (YYYY-MM-DD), defaults to today
        #[arg(long)]
        last_updated: Option<NaiveDate>,
    },
    /// Apply the content blocks to every existing page
    Patch,
    /// Relocate stray footers, drop legacy CSS and trim trailing junk
    Cleanup,
    /// Rebuild sitemaps from the pages on disk
    Sitemap,
    /// Check holidays.json for data-quality problems
    Validate {
        /// Also write the issues as JSON
        #[arg(long)]
        json_out: Option<PathBuf>,
    },
    /// Fetch the remote database, reconcile and regenerate
    Update {
        /// Commit and push the result
        #[arg(long)]
        commit: bool,
        #[arg(long)]
        last_updated: Option<NaiveDate>,
    },
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let level = if cli.verbose {
        log::Level::Debug
    } else if cli.quiet {
        log::Level::Warn
    } else {
        log::Level::Info
    };
    simple_logger::init_with_level(level)?;

    let paths = SitePaths::new(&cli.root);
    let config = SiteConfig::load(&cli.root)?;

    match cli.command {
        Commands::Generate { last_updated } => generate::run_generate(
            &paths,
            &config,
            &RunOptions::from_env(),
            last_updated.unwrap_or_else(today),
        ),
        Commands::Patch => generate::run_patch(&paths, &config),
        Commands::Cleanup => generate::run_cleanup(&paths),
        Commands::Sitemap => generate::run_sitemap(&paths, &config),
        Commands::Validate { json_out } => {
            let counts = validate::run_validate(&paths.holidays_json(), json_out.as_deref())?;
            if counts.errors > 0 {
                bail!("Validation found {} errors", counts.errors);
            }
            Ok(())
        }
        Commands::Update {
            commit,
            last_updated,
        } => update::run_update(
            &paths,
            &config,
            &RunOptions::from_env(),
            last_updated.unwrap_or_else(today),
            commit,
        ),
    }
}
