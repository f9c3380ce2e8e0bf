//! Site-level commands: generate, patch, cleanup and sitemap

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs;

use crate::badge::build_badge_svg;
use crate::blocks::HolidayBlocks;
use crate::config::{RunOptions, SiteConfig, SitePaths};
use crate::enrichment::{Enricher, EnrichmentStore};
use crate::index::{build_index, HolidayDatabase};
use crate::library::render_library;
use crate::links::CalendarLinks;
use crate::patch::{cleanup_page, PatchPipeline};
use crate::render::{PageRenderer, GENERATOR_MARKER};
use crate::sitemap::SitemapBuilder;
use crate::utils::{osc8_file_link, write_if_changed};

#[derive(Debug, Default)]
struct WriteCounts {
    written: usize,
    unchanged: usize,
}

impl WriteCounts {
    fn record(&mut self, changed: bool) {
        if changed {
            self.written += 1;
        } else {
            self.unchanged += 1;
        }
    }
}

pub fn run_generate(
    paths: &SitePaths,
    config: &SiteConfig,
    options: &RunOptions,
    last_updated: NaiveDate,
) -> Result<()> {
    println!("Loading holidays...");
    let database = HolidayDatabase::load(&paths.holidays_json())?;
    let index = build_index(&database);
    println!("Loaded {} holidays", index.len());
    if !index.skipped().is_empty() || !index.collisions().is_empty() {
        let distinct = index.collisions().iter().filter(|c| !c.same_name()).count();
        println!(
            "Skipped {} records, {} slug collisions ({} between different names)",
            index.skipped().len(),
            index.collisions().len(),
            distinct
        );
    }

    if index.is_empty() {
        println!("No holidays found in {}", paths.holidays_json().display());
        return Ok(());
    }

    let links = CalendarLinks::new(&index, &config.popular);
    let enricher = Enricher::new(EnrichmentStore::new(paths.enrichment_dir()), options);
    let renderer = PageRenderer::new(config, &index, last_updated);
    let pipeline = PatchPipeline::generated();

    if !options.months.is_empty() {
        log::info!("Limiting pages to months {}", options.months.join(","));
    }

    log::info!("Generating holiday pages");
    let mut pages = WriteCounts::default();
    let mut badges = WriteCounts::default();
    for record in index.calendar_order() {
        let in_scope = match record.month_day() {
            Some(md) => options.includes_month(&md.month_key()),
            None => options.months.is_empty(),
        };
        if !in_scope {
            continue;
        }
        let Some(neighbors) = links.neighbors(&record.slug) else {
            continue;
        };

        let enrichment = enricher.enrich(record);
        let html = renderer.render(record, &neighbors, enrichment.as_ref());
        let blocks = HolidayBlocks::new(config, &index, record, Some(neighbors));
        let report = pipeline.apply(&html, &blocks);
        for (block, outcome) in report.problems() {
            log::warn!("{}: {:?} block {:?}", record.slug, block, outcome);
        }

        let page_path = paths.page_path(&record.slug);
        let changed = write_if_changed(&page_path, &report.html)?;
        if changed {
            log::debug!("Wrote {}", page_path.display());
        }
        pages.record(changed);

        let svg = build_badge_svg(&record.name, &record.slug);
        badges.record(write_if_changed(&paths.badge_path(&record.slug), &svg)?);
    }

    log::info!("Generating library page");
    let library = paths.library_page();
    write_if_changed(&library, &render_library(config, &index, last_updated))?;

    log::info!("Generating sitemaps");
    let sitemap_files = write_sitemaps(paths, config)?;

    println!(
        "Pages: {} written, {} unchanged. Badges: {} written, {} unchanged. Sitemap files changed: {}",
        pages.written, pages.unchanged, badges.written, badges.unchanged, sitemap_files
    );
    println!(
        "Done! Generated site in {}",
        osc8_file_link(&paths.holiday_dir(), &paths.holiday_dir().display().to_string())
    );
    Ok(())
}

/// Run the block pipeline over every page already on disk. Pages this tool
/// rendered get the generated pipeline; anything else is treated as legacy.
pub fn run_patch(paths: &SitePaths, config: &SiteConfig) -> Result<()> {
    let database = HolidayDatabase::load(&paths.holidays_json())?;
    let index = build_index(&database);
    let links = CalendarLinks::new(&index, &config.popular);
    let generated = PatchPipeline::generated();
    let legacy = PatchPipeline::legacy();
    log::debug!("Legacy pipeline: {:?}", legacy.blocks());

    let mut counts = WriteCounts::default();
    let mut skipped = 0;
    for slug in paths.existing_page_slugs()? {
        let Some(record) = index.get(&slug) else {
            log::warn!("No holiday record for existing page holiday/{}/, skipping", slug);
            skipped += 1;
            continue;
        };
        let path = paths.page_path(&slug);
        let html = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let pipeline = if html.contains(GENERATOR_MARKER) {
            &generated
        } else {
            &legacy
        };
        let blocks = HolidayBlocks::new(config, &index, record, links.neighbors(&slug));
        let report = pipeline.apply(&html, &blocks);
        for (block, outcome) in report.problems() {
            log::warn!("{}: {:?} block {:?}", slug, block, outcome);
        }

        let changed = report.changed() && write_if_changed(&path, &report.html)?;
        if changed {
            log::debug!("Patched {}", path.display());
        }
        counts.record(changed);
    }

    println!(
        "Patched {} pages, {} already up to date, {} skipped",
        counts.written, counts.unchanged, skipped
    );
    Ok(())
}

pub fn run_cleanup(paths: &SitePaths) -> Result<()> {
    let mut counts = WriteCounts::default();
    for slug in paths.existing_page_slugs()? {
        let path = paths.page_path(&slug);
        let html = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let changed = write_if_changed(&path, &cleanup_page(&html))?;
        if changed {
            log::debug!("Cleaned {}", path.display());
        }
        counts.record(changed);
    }
    println!("Cleaned {} pages, {} unchanged", counts.written, counts.unchanged);
    Ok(())
}

fn write_sitemaps(paths: &SitePaths, config: &SiteConfig) -> Result<usize> {
    let builder = SitemapBuilder::new(config);
    let pages = builder.collect_pages(paths)?;
    let set = builder.build(&pages);
    builder.write(&set, paths)
}

pub fn run_sitemap(paths: &SitePaths, config: &SiteConfig) -> Result<()> {
    let changed = write_sitemaps(paths, config)?;
    println!(
        "Sitemaps: {} files changed, index at {}",
        changed,
        osc8_file_link(&paths.sitemap_index(), "sitemap-index.xml")
    );
    Ok(())
}
