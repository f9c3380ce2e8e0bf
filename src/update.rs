//! Reconcile the local holiday database with the remote copy

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{RunOptions, SiteConfig, SitePaths};
use crate::generate::run_generate;
use crate::git::{commit_and_push, commit_message};
use crate::index::{build_index, HolidayDatabase, HolidayIndex};
use crate::utils::{osc8_file_link, write_if_changed};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SlugDiff {
    pub added: BTreeSet<String>,
    pub removed: BTreeSet<String>,
    pub unchanged: BTreeSet<String>,
}

pub fn diff_slugs(old: &HolidayIndex, new: &HolidayIndex) -> SlugDiff {
    let old_slugs: BTreeSet<String> = old.slugs().map(str::to_string).collect();
    let new_slugs: BTreeSet<String> = new.slugs().map(str::to_string).collect();
    SlugDiff {
        added: new_slugs.difference(&old_slugs).cloned().collect(),
        removed: old_slugs.difference(&new_slugs).cloned().collect(),
        unchanged: old_slugs.intersection(&new_slugs).cloned().collect(),
    }
}

/// Download the remote database. The shape is checked before anything is
/// written so a bad response aborts the update.
pub fn fetch_remote(url: &str) -> Result<Value> {
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()?;
    let value: Value = client
        .get(url)
        .send()
        .with_context(|| format!("Failed to fetch {}", url))?
        .error_for_status()
        .with_context(|| format!("Remote returned an error for {}", url))?
        .json()
        .with_context(|| format!("Remote response from {} is not JSON", url))?;

    HolidayDatabase::from_value(value.clone())
        .with_context(|| format!("Remote database from {} is malformed", url))?;
    Ok(value)
}

fn pretty_json(value: &Value) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}

pub fn write_snapshot(paths: &SitePaths, value: &Value, now: DateTime<Utc>) -> Result<PathBuf> {
    let path = paths.snapshot_dir().join(format!(
        "holidays_snapshot_{}.json",
        now.format("%Y%m%dT%H%M%SZ")
    ));
    write_if_changed(&path, &pretty_json(value)?)?;
    Ok(path)
}

/// Delete the page directory and badge of every removed slug
pub fn remove_pages(paths: &SitePaths, removed: &BTreeSet<String>) -> Result<usize> {
    let mut count = 0;
    for slug in removed {
        let dir = paths.holiday_dir().join(slug);
        if dir.is_dir() {
            fs::remove_dir_all(&dir)
                .with_context(|| format!("Failed to remove {}", dir.display()))?;
            log::debug!("Removed holiday/{}/", slug);
            count += 1;
        }
        let badge = paths.badge_path(slug);
        if badge.is_file() {
            fs::remove_file(&badge)
                .with_context(|| format!("Failed to remove {}", badge.display()))?;
        }
    }
    Ok(count)
}

/// Diff against the old database, drop pages that disappeared and overwrite
/// `holidays.json` with the remote document.
pub fn apply_remote(paths: &SitePaths, old: &HolidayDatabase, remote: &Value) -> Result<SlugDiff> {
    let new = HolidayDatabase::from_value(remote.clone())?;
    let diff = diff_slugs(&build_index(old), &build_index(&new));
    println!(
        "Slugs: {} added, {} removed, {} unchanged",
        diff.added.len(),
        diff.removed.len(),
        diff.unchanged.len()
    );
    for slug in &diff.added {
        log::info!("New holiday: {}", slug);
    }

    let removed = remove_pages(paths, &diff.removed)?;
    if removed > 0 {
        println!("Removed {} stale pages", removed);
    }

    let path = paths.holidays_json();
    fs::write(&path, pretty_json(remote)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(diff)
}

pub fn run_update(
    paths: &SitePaths,
    config: &SiteConfig,
    options: &RunOptions,
    last_updated: NaiveDate,
    commit: bool,
) -> Result<()> {
    let local = paths.holidays_json();
    let old = if local.exists() {
        HolidayDatabase::load(&local)?
    } else {
        log::warn!("No local {}, treating every holiday as new", local.display());
        HolidayDatabase::default()
    };
    println!("Loaded {} local holidays", old.entry_count());

    log::info!("Fetching {}", config.remote_url);
    let remote = fetch_remote(&config.remote_url)?;

    let snapshot = write_snapshot(paths, &remote, Utc::now())?;
    println!(
        "Saved snapshot {}",
        osc8_file_link(&snapshot, &snapshot.display().to_string())
    );

    apply_remote(paths, &old, &remote)?;
    run_generate(paths, config, options, last_updated)?;

    if commit {
        commit_and_push(&paths.root, &commit_message(Utc::now()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn db(value: Value) -> HolidayDatabase {
        HolidayDatabase::from_value(value).unwrap()
    }

    #[test]
    fn test_diff_slugs() {
        let old = db(json!({"holidays": {
            "03-14": [{"name": "Pi Day"}, {"name": "Potato Chip Day"}]
        }}));
        let new = db(json!({"holidays": {
            "03-14": [{"name": "Pi Day"}],
            "04-01": [{"name": "Fun Day"}]
        }}));
        let diff = diff_slugs(&build_index(&old), &build_index(&new));
        assert_eq!(diff.added, BTreeSet::from(["fun-day".to_string()]));
        assert_eq!(diff.removed, BTreeSet::from(["potato-chip-day".to_string()]));
        assert_eq!(diff.unchanged, BTreeSet::from(["pi-day".to_string()]));
    }

    #[test]
    fn test_apply_remote_removes_stale_pages() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SitePaths::new(dir.path());
        for slug in ["pi-day", "potato-chip-day"] {
            write_if_changed(&paths.page_path(slug), "<html></html>").unwrap();
            write_if_changed(&paths.badge_path(slug), "<svg/>").unwrap();
        }

        let old = db(json!({"holidays": {
            "03-14": [{"name": "Pi Day"}, {"name": "Potato Chip Day"}]
        }}));
        let remote = json!({"holidays": {"03-14": [{"name": "Pi Day"}]}});
        let diff = apply_remote(&paths, &old, &remote).unwrap();

        assert_eq!(diff.removed.len(), 1);
        assert!(paths.page_path("pi-day").exists());
        assert!(!paths.holiday_dir().join("potato-chip-day").exists());
        assert!(!paths.badge_path("potato-chip-day").exists());

        let written = HolidayDatabase::load(&paths.holidays_json()).unwrap();
        assert_eq!(written.entry_count(), 1);
    }

    #[test]
    fn test_apply_remote_rejects_malformed_document() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SitePaths::new(dir.path());
        let err = apply_remote(&paths, &HolidayDatabase::default(), &json!({"days": {}}));
        assert!(err.is_err());
        assert!(!paths.holidays_json().exists());
    }

    #[test]
    fn test_snapshot_name() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SitePaths::new(dir.path());
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        let path = write_snapshot(&paths, &json!({"holidays": {}}), now).unwrap();
        assert!(path.ends_with("snapshots/holidays_snapshot_20250314T092653Z.json"));
        assert!(fs::read_to_string(&path).unwrap().ends_with("}\n"));
    }
}
