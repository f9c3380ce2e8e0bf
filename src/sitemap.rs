//! Monthly XML sitemaps and the sitemap index

use anyhow::{Context, Result};
use scraper::{Html, Selector};
use std::collections::BTreeMap;
use std::fs;

use crate::calendar::MonthDay;
use crate::config::{SiteConfig, SitePaths};
use crate::utils::write_if_changed;

const XMLNS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const STATIC_FILE: &str = "sitemap-static.xml";
/// Pages without a readable date are listed under December
const DEFAULT_MONTH: u32 = 12;

/// One holiday page as the sitemap sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapPage {
    pub url: String,
    pub date: Option<MonthDay>,
}

impl SitemapPage {
    /// Read the observance date from the page's `div.date`
    pub fn from_html(url: &str, html: &str) -> Self {
        let document = Html::parse_document(html);
        let date = Selector::parse("div.date").ok().and_then(|selector| {
            document
                .select(&selector)
                .next()
                .map(|el| el.text().collect::<String>())
                .and_then(|text| MonthDay::from_pretty(&text))
        });
        Self {
            url: url.to_string(),
            date,
        }
    }
}

pub fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Rendered sitemap files, keyed by file name under `sitemaps/`
#[derive(Debug, Clone, Default)]
pub struct SitemapSet {
    pub index: String,
    pub files: BTreeMap<String, String>,
}

pub struct SitemapBuilder<'a> {
    config: &'a SiteConfig,
}

impl<'a> SitemapBuilder<'a> {
    pub fn new(config: &'a SiteConfig) -> Self {
        Self { config }
    }

    fn monthly_file_name(&self, month: u32) -> String {
        format!("sitemap-{}-{:02}.xml", self.config.sitemap_year, month)
    }

    pub fn build(&self, pages: &[SitemapPage]) -> SitemapSet {
        let year = self.config.sitemap_year;
        let mut months: BTreeMap<u32, Vec<(String, Option<String>)>> = BTreeMap::new();
        for page in pages {
            let (month, lastmod) = match page.date {
                Some(md) => (
                    md.month,
                    md.in_year(year).map(|d| d.format("%Y-%m-%d").to_string()),
                ),
                None => (DEFAULT_MONTH, None),
            };
            months
                .entry(month)
                .or_default()
                .push((page.url.clone(), lastmod));
        }

        let mut files = BTreeMap::new();
        for (month, mut entries) in months {
            entries.sort();
            files.insert(self.monthly_file_name(month), urlset(&entries));
        }

        let static_entries: Vec<(String, Option<String>)> = self
            .config
            .static_pages
            .iter()
            .map(|path| (self.config.absolute_url(path), None))
            .collect();
        files.insert(STATIC_FILE.to_string(), urlset(&static_entries));

        let mut names: Vec<&str> = files
            .keys()
            .map(String::as_str)
            .filter(|n| *n != STATIC_FILE)
            .collect();
        names.push(STATIC_FILE);
        let index = self.index_xml(&names);

        SitemapSet { index, files }
    }

    fn index_xml(&self, names: &[&str]) -> String {
        let mut xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<sitemapindex xmlns=\"{}\">\n",
            XMLNS
        );
        for name in names {
            xml.push_str(&format!(
                "  <sitemap>\n    <loc>{}</loc>\n  </sitemap>\n",
                xml_escape(&self.config.absolute_url(&format!("/sitemaps/{}", name)))
            ));
        }
        xml.push_str("</sitemapindex>\n");
        xml
    }

    /// Read every generated holiday page on disk
    pub fn collect_pages(&self, paths: &SitePaths) -> Result<Vec<SitemapPage>> {
        let mut pages = Vec::new();
        for slug in paths.existing_page_slugs()? {
            let path = paths.page_path(&slug);
            let html = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let page = SitemapPage::from_html(&self.config.holiday_url(&slug), &html);
            if page.date.is_none() {
                log::warn!("No readable date in {}; listing it under December", path.display());
            }
            pages.push(page);
        }
        Ok(pages)
    }

    /// Write the set; returns how many files changed
    pub fn write(&self, set: &SitemapSet, paths: &SitePaths) -> Result<usize> {
        let mut changed = 0;
        for (name, xml) in &set.files {
            if write_if_changed(&paths.sitemap_dir().join(name), xml)? {
                log::debug!("Wrote sitemaps/{}", name);
                changed += 1;
            }
        }
        if write_if_changed(&paths.sitemap_index(), &set.index)? {
            changed += 1;
        }
        Ok(changed)
    }
}

fn urlset(entries: &[(String, Option<String>)]) -> String {
    let mut xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"{}\">\n",
        XMLNS
    );
    for (loc, lastmod) in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", xml_escape(loc)));
        if let Some(lastmod) = lastmod {
            xml.push_str(&format!("    <lastmod>{}</lastmod>\n", lastmod));
        }
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(slug: &str, date: &str) -> SitemapPage {
        SitemapPage::from_html(
            &format!("https://www.obscureholidaycalendar.com/holiday/{}/", slug),
            &format!("<html><body><h1>x</h1><div class=\"date\">{}</div></body></html>", date),
        )
    }

    #[test]
    fn test_from_html_reads_date() {
        assert_eq!(page("pi-day", "March 14").date, MonthDay::new(3, 14));
        assert_eq!(page("odd-day", "13 40").date, None);
        let no_div = SitemapPage::from_html("u", "<html><body><h1>x</h1></body></html>");
        assert_eq!(no_div.date, None);
    }

    #[test]
    fn test_monthly_files_and_index() {
        let config = SiteConfig::default();
        let set = SitemapBuilder::new(&config).build(&[
            page("pi-day", "March 14"),
            page("ides-day", "March 15"),
            page("cat-day", "October 29"),
        ]);

        let march = &set.files["sitemap-2025-03.xml"];
        assert!(march.contains("<lastmod>2025-03-14</lastmod>"));
        assert!(march.find("ides-day").unwrap() < march.find("pi-day").unwrap());
        assert!(set.files.contains_key("sitemap-2025-10.xml"));
        assert!(!set.files.contains_key("sitemap-2025-12.xml"));

        let statics = &set.files["sitemap-static.xml"];
        assert!(statics.contains("<loc>https://www.obscureholidaycalendar.com/discord-bot/</loc>"));

        assert!(set.index.contains("/sitemaps/sitemap-2025-03.xml</loc>"));
        assert!(set.index.contains("/sitemaps/sitemap-2025-10.xml</loc>"));
        assert!(set.index.trim_end().ends_with("</sitemapindex>"));
        let static_at = set.index.find("sitemap-static.xml").unwrap();
        assert!(static_at > set.index.find("sitemap-2025-10.xml").unwrap());
    }

    #[test]
    fn test_bad_date_goes_to_december() {
        let config = SiteConfig::default();
        let set = SitemapBuilder::new(&config).build(&[page("odd-day", "13 40")]);
        let december = &set.files["sitemap-2025-12.xml"];
        assert!(december.contains("odd-day"));
        assert!(!december.contains("<lastmod>"));
    }

    #[test]
    fn test_leap_day_without_lastmod() {
        let config = SiteConfig::default();
        let set = SitemapBuilder::new(&config).build(&[page("leap-day", "February 29")]);
        let february = &set.files["sitemap-2025-02.xml"];
        assert!(february.contains("leap-day"));
        assert!(!february.contains("<lastmod>"));
    }

    #[test]
    fn test_urls_are_escaped() {
        let xml = urlset(&[("https://x.test/?a=1&b=2".to_string(), None)]);
        assert!(xml.contains("<loc>https://x.test/?a=1&amp;b=2</loc>"));
    }

    #[test]
    fn test_write_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SitePaths::new(dir.path());
        fs::create_dir_all(paths.holiday_dir().join("pi-day")).unwrap();
        fs::write(
            paths.page_path("pi-day"),
            "<html><body><div class=\"date\">March 14</div></body></html>",
        )
        .unwrap();

        let config = SiteConfig::default();
        let builder = SitemapBuilder::new(&config);
        let pages = builder.collect_pages(&paths).unwrap();
        let set = builder.build(&pages);
        assert_eq!(builder.write(&set, &paths).unwrap(), 3);
        assert!(paths.sitemap_dir().join("sitemap-2025-03.xml").is_file());
        assert!(paths.sitemap_index().is_file());
        assert_eq!(builder.write(&set, &paths).unwrap(), 0);
    }
}
