//! Offline data-quality checks for holidays.json

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use crate::calendar::{MonthDay, MONTH_NAMES};
use crate::index::{is_valid_slug, slugify, DatabaseError};

const SHORT_DESCRIPTION: usize = 60;
const THIN_DESCRIPTION: usize = 80;
const LOW_CONFIDENCE: f64 = 0.5;
const LOW_DATE_CONFIDENCE: f64 = 0.4;
const PRINTED_ISSUES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warn,
    Info,
}

impl Severity {
    fn label(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warn => "warn",
            Severity::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub severity: Severity,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dates: Vec<String>,
    pub msg: String,
}

impl Issue {
    fn at(severity: Severity, kind: &'static str, date: &str, index: Option<usize>, msg: impl Into<String>) -> Self {
        Self {
            severity,
            kind,
            date: Some(date.to_string()),
            index,
            name: None,
            slug: None,
            dates: Vec::new(),
            msg: msg.into(),
        }
    }

    fn summary_line(&self) -> String {
        let suffix = self.index.map(|i| format!(" idx={}", i)).unwrap_or_default();
        let location = self
            .date
            .clone()
            .or_else(|| self.slug.clone())
            .or_else(|| self.name.clone())
            .unwrap_or_default();
        format!(
            "- [{}] {} @ {}{}: {}",
            self.severity.label(),
            self.kind,
            location,
            suffix,
            self.msg
        )
    }
}

fn text_field<'a>(entry: &'a Map<String, Value>, key: &str) -> &'a str {
    entry.get(key).and_then(Value::as_str).map_or("", str::trim)
}

fn round2(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

/// Completeness score in [0, 1]
pub fn data_confidence(entry: &Map<String, Value>) -> f64 {
    let mut score: f64 = 1.0;
    let description = text_field(entry, "description").chars().count();
    let facts = entry
        .get("funFacts")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);

    if description == 0 {
        score -= 0.4;
    } else if description < THIN_DESCRIPTION {
        score -= 0.2;
    }
    if facts == 0 {
        score -= 0.3;
    } else if facts < 2 {
        score -= 0.15;
    }
    if text_field(entry, "emoji").is_empty() {
        score -= 0.05;
    }
    if text_field(entry, "sourceUrl").is_empty() {
        score -= 0.1;
    }
    round2(score.clamp(0.0, 1.0))
}

/// Month numbers named anywhere in the text
fn months_in_text(text: &str) -> Vec<u32> {
    let lower = text.to_lowercase();
    MONTH_NAMES
        .iter()
        .enumerate()
        .filter(|(_, name)| lower.contains(&name.to_lowercase()))
        .map(|(i, _)| i as u32 + 1)
        .collect()
}

/// How plausible the date key is given the text: 0.6 baseline, nudged up when
/// the text names the same month and down when it names only other months
pub fn date_plausibility(date: Option<MonthDay>, entry: &Map<String, Value>) -> f64 {
    let Some(date) = date else {
        return 0.0;
    };
    let mut score: f64 = 0.6;
    let text = format!("{} {}", text_field(entry, "name"), text_field(entry, "description"));
    let months = months_in_text(&text);
    if !months.is_empty() {
        if months.contains(&date.month) {
            score += 0.2;
        } else {
            score -= 0.2;
        }
    }
    round2(score.clamp(0.0, 1.0))
}

fn date_key_shape(key: &str) -> Option<(u32, u32)> {
    let (mm, dd) = key.split_once('-')?;
    if mm.len() != 2 || dd.len() != 2 || !mm.bytes().chain(dd.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((mm.parse().ok()?, dd.parse().ok()?))
}

fn check_entry(issues: &mut Vec<Issue>, date_key: &str, idx: usize, date: Option<MonthDay>, entry: &Map<String, Value>) {
    let at = |severity, kind, msg: &str| Issue::at(severity, kind, date_key, Some(idx), msg);

    if text_field(entry, "name").is_empty() {
        issues.push(at(Severity::Error, "missing_name", "Missing name"));
    }

    let description = text_field(entry, "description");
    if description.is_empty() {
        issues.push(at(Severity::Warn, "missing_description", "Missing description"));
    } else if description.chars().count() < SHORT_DESCRIPTION {
        issues.push(at(Severity::Info, "short_description", "Description is short (<60 chars)"));
    }

    match entry.get("funFacts") {
        None | Some(Value::Null) => {
            issues.push(at(Severity::Warn, "missing_fun_facts", "No funFacts provided"))
        }
        Some(Value::Array(facts)) if facts.is_empty() => {
            issues.push(at(Severity::Warn, "missing_fun_facts", "No funFacts provided"))
        }
        Some(Value::String(s)) if s.is_empty() => {
            issues.push(at(Severity::Warn, "missing_fun_facts", "No funFacts provided"))
        }
        Some(Value::Array(facts)) => {
            let real = facts
                .iter()
                .filter(|f| match f {
                    Value::String(s) => !s.trim().is_empty(),
                    Value::Null => false,
                    _ => true,
                })
                .count();
            if real < 2 {
                issues.push(at(Severity::Info, "few_fun_facts", "Less than 2 fun facts"));
            }
        }
        Some(_) => issues.push(at(Severity::Warn, "bad_fun_facts_type", "funFacts is not a list")),
    }

    let confidence = data_confidence(entry);
    if confidence < LOW_CONFIDENCE {
        issues.push(at(Severity::Info, "low_confidence", &format!("Data confidence {}", confidence)));
    }
    let date_confidence = date_plausibility(date, entry);
    if date_confidence < LOW_DATE_CONFIDENCE {
        issues.push(at(
            Severity::Info,
            "low_date_confidence",
            &format!("Date plausibility {}", date_confidence),
        ));
    }
}

/// Run every check over a parsed `holidays.json` document
pub fn validate(root: &Value) -> Result<Vec<Issue>, DatabaseError> {
    let holidays = root
        .get("holidays")
        .and_then(Value::as_object)
        .ok_or_else(|| DatabaseError::Malformed("missing top-level \"holidays\" object".to_string()))?;

    let mut issues = Vec::new();
    let mut name_dates: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut slug_dates: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut slug_names: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (date_key, items) in holidays {
        let Some((month, day)) = date_key_shape(date_key) else {
            issues.push(Issue::at(Severity::Error, "bad_date_key", date_key, None, "Date key not MM-DD"));
            continue;
        };
        let date = MonthDay::new(month, day);
        if date.is_none() {
            issues.push(Issue::at(
                Severity::Error,
                "invalid_calendar_day",
                date_key,
                None,
                "Day not valid for month",
            ));
        }

        let Some(items) = items.as_array() else {
            issues.push(Issue::at(
                Severity::Error,
                "bad_entry_list",
                date_key,
                None,
                "Expected list of holidays",
            ));
            continue;
        };

        for (idx, item) in items.iter().enumerate() {
            let Some(entry) = item.as_object() else {
                issues.push(Issue::at(
                    Severity::Error,
                    "bad_entry",
                    date_key,
                    Some(idx),
                    "Entry is not an object",
                ));
                continue;
            };
            check_entry(&mut issues, date_key, idx, date, entry);

            let name = text_field(entry, "name");
            if name.is_empty() {
                continue;
            }
            name_dates
                .entry(name.to_string())
                .or_default()
                .insert(date_key.clone());

            let explicit = text_field(entry, "slug");
            let slug = if explicit.is_empty() {
                slugify(name)
            } else if is_valid_slug(explicit) {
                explicit.to_string()
            } else {
                let mut issue = Issue::at(
                    Severity::Error,
                    "invalid_slug",
                    date_key,
                    Some(idx),
                    format!("Slug is not URL-safe; the page will use '{}'", slugify(name)),
                );
                issue.name = Some(name.to_string());
                issue.slug = Some(explicit.to_string());
                issues.push(issue);
                slugify(name)
            };
            if slug.is_empty() {
                continue;
            }
            slug_dates.entry(slug.clone()).or_default().insert(date_key.clone());
            slug_names.entry(slug).or_default().push(name.to_string());
        }
    }

    for (name, dates) in name_dates {
        if dates.len() > 1 {
            issues.push(Issue {
                severity: Severity::Warn,
                kind: "duplicate_name",
                date: None,
                index: None,
                name: Some(name),
                slug: None,
                dates: dates.into_iter().collect(),
                msg: "Name appears on multiple dates".to_string(),
            });
        }
    }

    for (slug, dates) in &slug_dates {
        if dates.len() > 1 {
            issues.push(Issue {
                severity: Severity::Warn,
                kind: "duplicate_slug",
                date: None,
                index: None,
                name: None,
                slug: Some(slug.clone()),
                dates: dates.iter().cloned().collect(),
                msg: "Slug appears on multiple dates".to_string(),
            });
        }
    }

    // Only one record per slug gets a page
    for (slug, names) in slug_names {
        if names.len() > 1 {
            let dates = slug_dates.get(&slug).cloned().unwrap_or_default();
            issues.push(Issue {
                severity: Severity::Error,
                kind: "slug_collision",
                date: None,
                index: None,
                name: None,
                msg: format!(
                    "{} records share this slug ({}); only the last one gets a page",
                    names.len(),
                    names.join(", ")
                ),
                slug: Some(slug),
                dates: dates.into_iter().collect(),
            });
        }
    }

    Ok(issues)
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
}

pub fn count_severities(issues: &[Issue]) -> SeverityCounts {
    let mut counts = SeverityCounts::default();
    for issue in issues {
        match issue.severity {
            Severity::Error => counts.errors += 1,
            Severity::Warn => counts.warnings += 1,
            Severity::Info => counts.info += 1,
        }
    }
    counts
}

/// Validate a file, print the report, optionally write every issue as JSON.
/// Returns the severity counts so the caller can set the exit status.
pub fn run_validate(path: &Path, json_out: Option<&Path>) -> Result<SeverityCounts> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let root: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    let issues = validate(&root).with_context(|| format!("Cannot validate {}", path.display()))?;
    let counts = count_severities(&issues);

    println!(
        "Issues found: {} (errors: {}, warnings: {}, info: {})",
        issues.len(),
        counts.errors,
        counts.warnings,
        counts.info
    );
    for issue in issues.iter().take(PRINTED_ISSUES) {
        println!("{}", issue.summary_line());
    }
    if issues.len() > PRINTED_ISSUES {
        println!("...and {} more", issues.len() - PRINTED_ISSUES);
    }

    if let Some(out) = json_out {
        let json = serde_json::to_string_pretty(&issues)?;
        fs::write(out, json).with_context(|| format!("Failed to write {}", out.display()))?;
        println!("Wrote full issue list to {}", out.display());
    }

    Ok(counts)
}
