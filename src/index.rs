//! Holiday database loading and the slug index built from it

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::types::{HolidayRecord, RawHoliday};

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("malformed holiday database: {0}")]
    Malformed(String),
    #[error("holiday database is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// `{"holidays": {"MM-DD": [record, ...]}}`, with entries kept as raw JSON
/// so one bad record cannot fail the whole load
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HolidayDatabase {
    pub holidays: BTreeMap<String, Vec<Value>>,
}

impl HolidayDatabase {
    pub fn from_value(value: Value) -> Result<Self, DatabaseError> {
        let Value::Object(mut root) = value else {
            return Err(DatabaseError::Malformed(
                "top level is not a JSON object".to_string(),
            ));
        };
        let Some(Value::Object(days)) = root.remove("holidays") else {
            return Err(DatabaseError::Malformed(
                "missing top-level \"holidays\" object".to_string(),
            ));
        };

        let mut holidays = BTreeMap::new();
        for (date_key, items) in days {
            match items {
                Value::Array(list) => {
                    holidays.insert(date_key, list);
                }
                _ => {
                    return Err(DatabaseError::Malformed(format!(
                        "date key '{}' does not map to a list of holidays",
                        date_key
                    )))
                }
            }
        }
        Ok(Self { holidays })
    }

    pub fn from_json_str(content: &str) -> Result<Self, DatabaseError> {
        Self::from_value(serde_json::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read holiday database: {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Failed to load holiday database: {}", path.display()))
    }

    pub fn entry_count(&self) -> usize {
        self.holidays.values().map(Vec::len).sum()
    }
}

/// Convert a holiday name to its URL slug.
///
/// Lowercase, `&` becomes `and`, every run of characters outside `[a-z0-9]`
/// becomes a single hyphen, and hyphens are trimmed from both ends.
pub fn slugify(name: &str) -> String {
    let lower = name.to_lowercase().replace('&', "and");
    let mut slug = String::with_capacity(lower.len());
    let mut pending_hyphen = false;
    for c in lower.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// A later record replaced an earlier one under the same slug
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugCollision {
    pub slug: String,
    pub kept_name: String,
    pub kept_date: String,
    pub replaced_name: String,
    pub replaced_date: String,
}

impl SlugCollision {
    pub fn same_name(&self) -> bool {
        self.kept_name == self.replaced_name
    }
}

/// A record that could not be indexed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub date_key: String,
    pub position: usize,
    pub reason: String,
}

/// slug -> record, built in a fixed order: date keys ascending, then list order.
/// On collision the later record wins and the overwrite is recorded.
#[derive(Debug, Clone, Default)]
pub struct HolidayIndex {
    records: BTreeMap<String, HolidayRecord>,
    collisions: Vec<SlugCollision>,
    skipped: Vec<SkippedRecord>,
}

impl HolidayIndex {
    pub fn get(&self, slug: &str) -> Option<&HolidayRecord> {
        self.records.get(slug)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn records(&self) -> impl Iterator<Item = &HolidayRecord> {
        self.records.values()
    }

    pub fn collisions(&self) -> &[SlugCollision] {
        &self.collisions
    }

    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    /// Display name for a slug, falling back to a title-cased slug
    pub fn title(&self, slug: &str) -> String {
        match self.records.get(slug) {
            Some(record) => record.name.clone(),
            None => title_from_slug(slug),
        }
    }

    /// Records in calendar order (month, day, slug); bad dates sort last
    pub fn calendar_order(&self) -> Vec<&HolidayRecord> {
        let mut ordered: Vec<&HolidayRecord> = self.records.values().collect();
        ordered.sort_by(|a, b| {
            a.sort_key()
                .cmp(&b.sort_key())
                .then_with(|| a.slug.cmp(&b.slug))
        });
        ordered
    }

    fn insert(&mut self, record: HolidayRecord) {
        if let Some(previous) = self.records.get(&record.slug) {
            let collision = SlugCollision {
                slug: record.slug.clone(),
                kept_name: record.name.clone(),
                kept_date: record.date.clone(),
                replaced_name: previous.name.clone(),
                replaced_date: previous.date.clone(),
            };
            log::warn!(
                "Duplicate slug '{}': '{}' ({}) replaces '{}' ({})",
                collision.slug,
                collision.kept_name,
                collision.kept_date,
                collision.replaced_name,
                collision.replaced_date
            );
            self.collisions.push(collision);
        }
        self.records.insert(record.slug.clone(), record);
    }
}

pub fn title_from_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// A slug is usable only if slugify leaves it unchanged
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty() && slugify(slug) == slug
}

/// The record's slug: the explicit one when it is already a clean slug,
/// otherwise one derived from the name.
fn resolve_slug(explicit: Option<&str>, name: &str, date_key: &str) -> String {
    match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) if is_valid_slug(slug) => slug.to_string(),
        Some(slug) => {
            let derived = slugify(name);
            log::warn!(
                "{}: slug '{}' for '{}' is not URL-safe, using '{}'",
                date_key,
                slug,
                name,
                derived
            );
            derived
        }
        None => slugify(name),
    }
}

fn record_from_raw(raw: RawHoliday, date_key: &str) -> Option<HolidayRecord> {
    let name = raw.trimmed_name()?.to_string();
    let fun_facts = raw.fun_fact_list();
    let slug = resolve_slug(raw.slug.as_deref(), &name, date_key);
    let date = raw
        .date
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(date_key)
        .to_string();

    Some(HolidayRecord {
        name,
        slug,
        date,
        description: raw.description.unwrap_or_default().trim().to_string(),
        emoji: raw.emoji.unwrap_or_default().trim().to_string(),
        fun_facts,
        source_url: raw
            .source_url
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    })
}

/// Build the slug index from a loaded database
pub fn build_index(database: &HolidayDatabase) -> HolidayIndex {
    let mut index = HolidayIndex::default();

    for (date_key, items) in &database.holidays {
        for (position, item) in items.iter().enumerate() {
            let raw: RawHoliday = match serde_json::from_value(item.clone()) {
                Ok(raw) => raw,
                Err(e) => {
                    log::warn!("Skipping {}[{}]: not a holiday object ({})", date_key, position, e);
                    index.skipped.push(SkippedRecord {
                        date_key: date_key.clone(),
                        position,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            match record_from_raw(raw, date_key) {
                Some(record) if !record.slug.is_empty() => index.insert(record),
                Some(record) => {
                    log::warn!(
                        "Skipping {}[{}]: name '{}' has no usable slug",
                        date_key,
                        position,
                        record.name
                    );
                    index.skipped.push(SkippedRecord {
                        date_key: date_key.clone(),
                        position,
                        reason: "empty slug".to_string(),
                    });
                }
                None => {
                    log::warn!("Skipping {}[{}]: missing name", date_key, position);
                    index.skipped.push(SkippedRecord {
                        date_key: date_key.clone(),
                        position,
                        reason: "missing name".to_string(),
                    });
                }
            }
        }
    }

    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn database(value: Value) -> HolidayDatabase {
        HolidayDatabase::from_value(value).unwrap()
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Pi Day"), "pi-day");
        assert_eq!(slugify("Peanut Butter & Jelly Day"), "peanut-butter-and-jelly-day");
        assert_eq!(slugify("  --Star Wars Day (May the 4th)!! "), "star-wars-day-may-the-4th");
        assert_eq!(slugify("Mother's Day"), "mother-s-day");
        assert_eq!(slugify("Café Day"), "caf-day");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_is_idempotent() {
        for name in ["Pi Day", "A & B", "--x--y--", "Día de los Muertos", "123 GO"] {
            let once = slugify(name);
            assert_eq!(slugify(&once), once, "slugify not idempotent for {:?}", name);
        }
    }

    #[test]
    fn test_malformed_database() {
        let err = HolidayDatabase::from_value(json!({"days": {}})).unwrap_err();
        assert!(matches!(err, DatabaseError::Malformed(_)));

        let err = HolidayDatabase::from_value(json!([1, 2])).unwrap_err();
        assert!(matches!(err, DatabaseError::Malformed(_)));

        let err = HolidayDatabase::from_value(json!({"holidays": {"01-01": "nope"}})).unwrap_err();
        assert!(matches!(err, DatabaseError::Malformed(_)));

        let err = HolidayDatabase::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, DatabaseError::Json(_)));
    }

    #[test]
    fn test_build_index_derives_slug_and_date() {
        let db = database(json!({"holidays": {"03-14": [
            {"name": "Pi Day", "description": " Celebrate pi. ", "funFacts": ["3.14", "", 7]},
            {"name": "Custom", "slug": "my-custom-slug"}
        ]}}));
        let index = build_index(&db);

        let pi = index.get("pi-day").unwrap();
        assert_eq!(pi.date, "03-14");
        assert_eq!(pi.description, "Celebrate pi.");
        assert_eq!(pi.fun_facts, vec!["3.14".to_string()]);
        assert!(index.get("my-custom-slug").is_some());
        assert!(index.collisions().is_empty());
    }

    #[test]
    fn test_unsafe_explicit_slug_falls_back_to_name() {
        let db = database(json!({"holidays": {"03-14": [
            {"name": "Pi Day", "slug": ".."},
            {"name": "Spaced", "slug": "My Slug/x"},
            {"name": "Cat Day", "slug": "../../etc"}
        ]}}));
        let index = build_index(&db);

        let slugs: Vec<&str> = index.slugs().collect();
        assert_eq!(slugs, vec!["cat-day", "pi-day", "spaced"]);
        assert!(index.slugs().all(is_valid_slug));
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("pi-day"));
        assert!(is_valid_slug("4th-of-july"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug(".."));
        assert!(!is_valid_slug("My Slug/x"));
        assert!(!is_valid_slug("-pi-day"));
        assert!(!is_valid_slug("pi--day"));
    }

    #[test]
    fn test_build_index_skips_bad_records() {
        let db = database(json!({"holidays": {"01-01": [
            {"description": "no name"},
            "just a string",
            {"name": "   "},
            {"name": "New Year's Day"}
        ]}}));
        let index = build_index(&db);
        assert_eq!(index.len(), 1);
        assert_eq!(index.skipped().len(), 3);
        assert!(index.get("new-year-s-day").is_some());
    }

    #[test]
    fn test_duplicate_names_resolve_last_write_wins() {
        let db = database(json!({"holidays": {
            "10-28": [{"name": "Chocolate Day", "description": "October one"}],
            "07-07": [{"name": "Chocolate Day", "description": "July one"}]
        }}));
        let index = build_index(&db);

        // date keys are visited in ascending order, so 10-28 is seen last
        let record = index.get("chocolate-day").unwrap();
        assert_eq!(record.date, "10-28");
        assert_eq!(index.collisions().len(), 1);
        let collision = &index.collisions()[0];
        assert_eq!(collision.replaced_date, "07-07");
        assert!(collision.same_name());
    }

    #[test]
    fn test_distinct_names_same_slug_are_flagged() {
        let db = database(json!({"holidays": {"05-04": [
            {"name": "Star Wars Day"},
            {"name": "Star-Wars Day!"}
        ]}}));
        let index = build_index(&db);
        assert_eq!(index.len(), 1);
        assert_eq!(index.collisions().len(), 1);
        assert!(!index.collisions()[0].same_name());
        assert_eq!(index.get("star-wars-day").unwrap().name, "Star-Wars Day!");
    }

    #[test]
    fn test_calendar_order() {
        let db = database(json!({"holidays": {
            "12-25": [{"name": "Z Day"}],
            "01-02": [{"name": "B Day"}, {"name": "A Day"}],
            "bogus": [{"name": "Lost Day"}]
        }}));
        let index = build_index(&db);
        let order: Vec<&str> = index.calendar_order().iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(order, vec!["a-day", "b-day", "z-day", "lost-day"]);
    }

    #[test]
    fn test_title_from_slug() {
        assert_eq!(title_from_slug("talk-like-a-pirate-day"), "Talk Like A Pirate Day");
        let index = HolidayIndex::default();
        assert_eq!(index.title("pi-day"), "Pi Day");
    }

    #[test]
    fn test_entry_count_includes_unusable_records() {
        let db = database(json!({"holidays": {"03-14": [{"name": "Pi Day"}, "junk"]}}));
        assert_eq!(db.entry_count(), 2);
    }
}
