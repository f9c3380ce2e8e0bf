//! Holiday record types shared by the index, renderer and validator

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::calendar::{calendar_sort_key, pretty_date, MonthDay};

/// A holiday entry as it appears in holidays.json, before any cleanup
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHoliday {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub emoji: Option<String>,
    /// Kept loose: the upstream data sometimes has a string or null here
    #[serde(rename = "funFacts")]
    pub fun_facts: Option<Value>,
    #[serde(rename = "sourceUrl")]
    pub source_url: Option<String>,
}

impl RawHoliday {
    /// Non-empty fun facts, dropping anything that is not a string
    pub fn fun_fact_list(&self) -> Vec<String> {
        match &self.fun_facts {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn trimmed_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

/// A cleaned holiday record keyed by slug in the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayRecord {
    pub name: String,
    pub slug: String,
    /// "MM-DD"; may be malformed when the source data is
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(rename = "funFacts", default)]
    pub fun_facts: Vec<String>,
    #[serde(rename = "sourceUrl", skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl HolidayRecord {
    pub fn month_day(&self) -> Option<MonthDay> {
        MonthDay::parse(&self.date)
    }

    pub fn pretty_date(&self) -> String {
        pretty_date(&self.date)
    }

    pub fn sort_key(&self) -> (u32, u32) {
        calendar_sort_key(&self.date)
    }
}
