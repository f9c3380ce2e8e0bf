//! The `/holiday/` library page listing every holiday by month

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

use crate::calendar::month_name;
use crate::config::SiteConfig;
use crate::index::HolidayIndex;
use crate::render::html_escape;

struct LibraryEntry<'a> {
    day: u32,
    name: &'a str,
    slug: &'a str,
}

/// Month number -> entries sorted by day, then case-insensitive name.
/// Records with an unusable date are left out.
fn entries_by_month(index: &HolidayIndex) -> BTreeMap<u32, Vec<LibraryEntry<'_>>> {
    let mut months: BTreeMap<u32, Vec<LibraryEntry<'_>>> = BTreeMap::new();
    for record in index.records() {
        let Some(md) = record.month_day() else {
            continue;
        };
        months.entry(md.month).or_default().push(LibraryEntry {
            day: md.day,
            name: &record.name,
            slug: &record.slug,
        });
    }
    for entries in months.values_mut() {
        entries.sort_by(|a, b| {
            a.day
                .cmp(&b.day)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
    }
    months
}

fn month_section(month: u32, entries: &[LibraryEntry<'_>]) -> String {
    let items: Vec<String> = entries
        .iter()
        .map(|e| {
            format!(
                r#"        <li><span class="day">{}</span> <a href="/holiday/{}/">{}</a></li>"#,
                e.day,
                html_escape(e.slug),
                html_escape(e.name)
            )
        })
        .collect();
    format!(
        "    <section class=\"month-section\">\n      <h2>{}</h2>\n      <ul class=\"month-list\">\n{}\n      </ul>\n    </section>\n",
        month_name(month).unwrap_or_default(),
        items.join("\n")
    )
}

pub fn render_library(config: &SiteConfig, index: &HolidayIndex, last_updated: NaiveDate) -> String {
    let sections: String = entries_by_month(index)
        .iter()
        .map(|(month, entries)| month_section(*month, entries))
        .collect();

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Holiday Library | {site}</title>
  <meta name="description" content="Browse every fun and obscure holiday by month. Quick links to each day's page, plus app downloads for reminders and widgets.">
  <meta name="google-adsense-account" content="{ads_client}">
  <link rel="canonical" href="{canonical}">
  <link rel="icon" href="/favicon.ico" type="image/x-icon">
  <link rel="icon" type="image/png" href="/assets/app-icon.png">
  <link rel="apple-touch-icon" href="/apple-touch-icon.png">
  <link rel="stylesheet" href="/styles.css">
  <script async src="https://www.googletagmanager.com/gtag/js?id={ga}"></script>
  <script>
    window.dataLayer = window.dataLayer || [];
    function gtag(){{dataLayer.push(arguments);}}
    gtag('js', new Date());
    gtag('config', '{ga}');
  </script>
</head>
<body class="page">
  <header class="site-header">
    <a class="brand" href="/">
      <img src="/assets/app-icon.png" alt="{site} icon" class="brand-mark" />
      <div class="brand-text">
        <span class="brand-name">{site}</span>
        <span class="brand-tagline">Daily fun, weird, and wonderful observances</span>
      </div>
    </a>
    <nav class="nav-links">
      <a href="/holiday/">Holidays</a>
      <a href="/discord-bot/">Discord Bot</a>
      <a href="/about/">About</a>
      <a href="/contact/">Contact</a>
      <a href="/privacy/">Privacy</a>
    </nav>
  </header>

  <main class="content-page">
    <h1>Holiday library</h1>
    <p>Browse every holiday in the {site} by month. Tap a day to jump straight to its page and grab the app for reminders and widgets.</p>
    <p class="muted">Last updated: {updated}</p>
{sections}  </main>

  <footer class="site-footer">
    <div class="footer-links">
      <a href="/">Home</a>
      <a href="/holiday/">Holidays</a>
      <a href="/about/">About</a>
      <a href="/contact/">Contact</a>
      <a href="/privacy/">Privacy</a>
    </div>
    <p>&copy; {year} {site}</p>
  </footer>
</body>
</html>
"##,
        site = html_escape(&config.site_name),
        ads_client = html_escape(&config.ads_client),
        canonical = html_escape(&config.absolute_url("/holiday/")),
        ga = html_escape(&config.analytics_id),
        updated = last_updated,
        sections = sections,
        year = last_updated.year(),
    )
}
