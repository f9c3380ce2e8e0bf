//! Calendar neighbors and deterministic picks for cross-linking pages

use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::SeedableRng;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};

use crate::config::PopularHoliday;
use crate::index::HolidayIndex;

const RELATED_COUNT: usize = 3;
const NO_MONTH: &str = "00";

/// Links rendered around one holiday page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbors {
    pub prev: String,
    pub next: String,
    pub random: String,
    pub popular: Option<PopularHoliday>,
    pub related: Vec<String>,
}

/// RNG seeded from a label, stable across runs and platforms
pub fn seeded_rng(label: &str) -> StdRng {
    let digest = Sha256::digest(label.as_bytes());
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&digest);
    StdRng::from_seed(seed)
}

pub struct CalendarLinks<'a> {
    ordered: Vec<&'a str>,
    position: HashMap<&'a str, usize>,
    by_month: BTreeMap<String, Vec<&'a str>>,
    month_of: HashMap<&'a str, String>,
    popular: &'a [PopularHoliday],
}

impl<'a> CalendarLinks<'a> {
    pub fn new(index: &'a HolidayIndex, popular: &'a [PopularHoliday]) -> Self {
        let mut ordered = Vec::with_capacity(index.len());
        let mut position = HashMap::new();
        let mut by_month: BTreeMap<String, Vec<&'a str>> = BTreeMap::new();
        let mut month_of = HashMap::new();

        for (i, record) in index.calendar_order().into_iter().enumerate() {
            let slug = record.slug.as_str();
            let month = record
                .month_day()
                .map(|md| md.month_key())
                .unwrap_or_else(|| NO_MONTH.to_string());
            ordered.push(slug);
            position.insert(slug, i);
            by_month.entry(month.clone()).or_default().push(slug);
            month_of.insert(slug, month);
        }

        Self {
            ordered,
            position,
            by_month,
            month_of,
            popular,
        }
    }

    /// Neighbors of a slug, or None when the slug is not indexed
    pub fn neighbors(&self, slug: &str) -> Option<Neighbors> {
        let i = *self.position.get(slug)?;
        let n = self.ordered.len();
        let prev = self.ordered[(i + n - 1) % n].to_string();
        let next = self.ordered[(i + 1) % n].to_string();

        let others: Vec<&str> = self
            .ordered
            .iter()
            .copied()
            .filter(|s| *s != slug)
            .collect();
        let random = others
            .choose(&mut seeded_rng(&format!("random-{}", slug)))
            .map_or_else(|| slug.to_string(), |s| s.to_string());

        let popular = self
            .popular
            .choose(&mut seeded_rng(&format!("popular-{}", slug)))
            .cloned();

        Some(Neighbors {
            prev,
            next,
            random,
            popular,
            related: self.related(slug),
        })
    }

    /// Up to three related slugs, same month first, then from the whole calendar
    fn related(&self, slug: &str) -> Vec<String> {
        let mut rng = seeded_rng(&format!("related-{}", slug));
        let month = self.month_of.get(slug).map_or(NO_MONTH, String::as_str);

        let mut pool: Vec<&str> = self
            .by_month
            .get(month)
            .map(|slugs| slugs.iter().copied().filter(|s| *s != slug).collect())
            .unwrap_or_default();
        pool.shuffle(&mut rng);
        pool.truncate(RELATED_COUNT);

        if pool.len() < RELATED_COUNT {
            let mut extra: Vec<&str> = self
                .ordered
                .iter()
                .copied()
                .filter(|s| *s != slug && !pool.contains(s))
                .collect();
            extra.shuffle(&mut rng);
            let missing = RELATED_COUNT - pool.len();
            pool.extend(extra.into_iter().take(missing));
        }

        pool.into_iter().map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::index::{build_index, HolidayDatabase};
    use serde_json::json;

    fn sample_index() -> HolidayIndex {
        let db = HolidayDatabase::from_value(json!({"holidays": {
            "01-01": [{"name": "New Year Day"}],
            "03-01": [{"name": "Peach Day"}],
            "03-14": [{"name": "Pi Day"}, {"name": "Potato Chip Day"}],
            "03-20": [{"name": "Snowman Day"}],
            "12-31": [{"name": "Make Up Your Mind Day"}]
        }}))
        .unwrap();
        build_index(&db)
    }

    #[test]
    fn test_prev_next_wrap_around() {
        let index = sample_index();
        let config = SiteConfig::default();
        let links = CalendarLinks::new(&index, &config.popular);

        let first = links.neighbors("new-year-day").unwrap();
        assert_eq!(first.prev, "make-up-your-mind-day");
        assert_eq!(first.next, "peach-day");

        let last = links.neighbors("make-up-your-mind-day").unwrap();
        assert_eq!(last.next, "new-year-day");

        assert!(links.neighbors("missing").is_none());
    }

    #[test]
    fn test_related_prefers_same_month() {
        let index = sample_index();
        let links = CalendarLinks::new(&index, &[]);
        let neighbors = links.neighbors("pi-day").unwrap();

        assert_eq!(neighbors.related.len(), 3);
        let mut related = neighbors.related.clone();
        related.sort();
        assert_eq!(related, vec!["peach-day", "potato-chip-day", "snowman-day"]);
        assert!(neighbors.popular.is_none());
    }

    #[test]
    fn test_related_fills_from_calendar() {
        let index = sample_index();
        let links = CalendarLinks::new(&index, &[]);
        let neighbors = links.neighbors("new-year-day").unwrap();
        assert_eq!(neighbors.related.len(), 3);
        assert!(!neighbors.related.contains(&"new-year-day".to_string()));
    }

    #[test]
    fn test_picks_are_deterministic() {
        let index = sample_index();
        let config = SiteConfig::default();
        let links = CalendarLinks::new(&index, &config.popular);
        let a = links.neighbors("snowman-day").unwrap();
        let b = links.neighbors("snowman-day").unwrap();
        assert_eq!(a, b);
        assert_ne!(a.random, "snowman-day");
        assert!(a.popular.is_some());
    }

    #[test]
    fn test_single_holiday_links_to_itself() {
        let db = HolidayDatabase::from_value(json!({"holidays": {"03-14": [{"name": "Pi Day"}]}}))
            .unwrap();
        let index = build_index(&db);
        let links = CalendarLinks::new(&index, &[]);
        let neighbors = links.neighbors("pi-day").unwrap();
        assert_eq!(neighbors.prev, "pi-day");
        assert_eq!(neighbors.next, "pi-day");
        assert_eq!(neighbors.random, "pi-day");
        assert!(neighbors.related.is_empty());
    }
}
