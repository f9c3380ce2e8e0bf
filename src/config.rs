//! Site configuration, file layout, and run toggles

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "ohc.toml";

/// A popular holiday used for the "Popular" pick
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PopularHoliday {
    pub slug: String,
    pub name: String,
}

impl PopularHoliday {
    fn new(slug: &str, name: &str) -> Self {
        Self {
            slug: slug.to_string(),
            name: name.to_string(),
        }
    }
}

/// Immutable site settings passed to the renderer, patcher and sitemap builder
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub site_name: String,
    pub site_base: String,
    pub ads_client: String,
    pub ads_slot: String,
    pub analytics_id: String,
    pub ios_url: String,
    pub android_url: String,
    pub ios_app_id: String,
    pub android_package: String,
    pub instagram_url: String,
    pub remote_url: String,
    pub sitemap_year: i32,
    pub popular: Vec<PopularHoliday>,
    /// Site-relative paths listed in the static sitemap
    pub static_pages: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_name: "Obscure Holiday Calendar".to_string(),
            site_base: "https://www.obscureholidaycalendar.com".to_string(),
            ads_client: "ca-pub-7162731177966348".to_string(),
            ads_slot: "7747026448".to_string(),
            analytics_id: "G-JTLDP7FMGV".to_string(),
            ios_url: "https://apps.apple.com/us/app/obscure-holiday-calendar/id6755315850"
                .to_string(),
            android_url: "https://play.google.com/store/apps/details?id=com.codeman8806.obscureholidaycalendar"
                .to_string(),
            ios_app_id: "6755315850".to_string(),
            android_package: "com.codeman8806.obscureholidaycalendar".to_string(),
            instagram_url: "https://instagram.com/obscureholidaycalendar".to_string(),
            remote_url: "https://gen-lang-client-0034763265-default-rtdb.firebaseio.com/.json"
                .to_string(),
            sitemap_year: 2025,
            popular: vec![
                PopularHoliday::new("pi-day", "Pi Day"),
                PopularHoliday::new("talk-like-a-pirate-day", "Talk Like a Pirate Day"),
                PopularHoliday::new("national-cat-day", "National Cat Day"),
                PopularHoliday::new("national-pizza-day", "National Pizza Day"),
                PopularHoliday::new("star-wars-day", "Star Wars Day (May the 4th)"),
            ],
            static_pages: vec![
                "/".to_string(),
                "/holiday/".to_string(),
                "/app/".to_string(),
                "/about/".to_string(),
                "/contact/".to_string(),
                "/privacy/".to_string(),
                "/discord-bot/".to_string(),
            ],
        }
    }
}

impl SiteConfig {
    /// Load `ohc.toml` from the site root if present, then apply env overrides.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Self::from_toml_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env_overrides(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(base) = get("OHC_SITE_BASE").filter(|v| !v.trim().is_empty()) {
            self.site_base = base.trim().trim_end_matches('/').to_string();
        }
        if let Some(url) = get("OHC_REMOTE_URL").filter(|v| !v.trim().is_empty()) {
            self.remote_url = url.trim().to_string();
        }
    }

    pub fn holiday_url(&self, slug: &str) -> String {
        format!("{}/holiday/{}/", self.site_base, slug)
    }

    pub fn absolute_url(&self, path: &str) -> String {
        format!("{}{}", self.site_base, path)
    }

    pub fn app_url(&self) -> String {
        self.absolute_url("/app/")
    }

    pub fn icon_url(&self) -> String {
        self.absolute_url("/assets/app-icon.png")
    }
}

/// Every file location the tool reads or writes, derived from the site root
#[derive(Debug, Clone)]
pub struct SitePaths {
    pub root: PathBuf,
}

impl SitePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn holidays_json(&self) -> PathBuf {
        self.root.join("holidays.json")
    }

    pub fn holiday_dir(&self) -> PathBuf {
        self.root.join("holiday")
    }

    pub fn page_path(&self, slug: &str) -> PathBuf {
        self.holiday_dir().join(slug).join("index.html")
    }

    pub fn library_page(&self) -> PathBuf {
        self.holiday_dir().join("index.html")
    }

    pub fn badge_dir(&self) -> PathBuf {
        self.root.join("assets").join("badges")
    }

    pub fn badge_path(&self, slug: &str) -> PathBuf {
        self.badge_dir().join(format!("{}.svg", slug))
    }

    pub fn sitemap_dir(&self) -> PathBuf {
        self.root.join("sitemaps")
    }

    pub fn sitemap_index(&self) -> PathBuf {
        self.root.join("sitemap-index.xml")
    }

    pub fn enrichment_dir(&self) -> PathBuf {
        self.root.join("enrichment").join("holidays")
    }

    pub fn snapshot_dir(&self) -> PathBuf {
        self.root.join("snapshots")
    }

    /// Slugs of every `holiday/<slug>/index.html` on disk, sorted
    pub fn existing_page_slugs(&self) -> Result<Vec<String>> {
        let dir = self.holiday_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut slugs = Vec::new();
        for entry in fs::read_dir(&dir)
            .with_context(|| format!("Failed to list {}", dir.display()))?
        {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if entry.path().join("index.html").is_file() {
                slugs.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        slugs.sort();
        Ok(slugs)
    }
}

/// Environment toggles for a generation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub enrich: bool,
    pub enrich_model: Option<String>,
    /// Two-digit month keys; empty means every month
    pub months: Vec<String>,
}

impl RunOptions {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let enrich = get("OHC_ENRICH")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);
        let enrich_model = get("OHC_ENRICH_MODEL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let months = get("OHC_MONTHS")
            .map(|v| parse_months(&v))
            .unwrap_or_default();
        Self {
            enrich,
            enrich_model,
            months,
        }
    }

    pub fn includes_month(&self, month_key: &str) -> bool {
        self.months.is_empty() || self.months.iter().any(|m| m == month_key)
    }
}

/// Parse "3, 04,12" into ["03", "04", "12"]; out-of-range entries are dropped
fn parse_months(value: &str) -> Vec<String> {
    let mut months: Vec<String> = value
        .split(',')
        .filter_map(|part| part.trim().parse::<u32>().ok())
        .filter(|m| (1..=12).contains(m))
        .map(|m| format!("{:02}", m))
        .collect();
    months.sort();
    months.dedup();
    months
}
