use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::RunOptions;
use crate::render::description_or_default;
use crate::types::HolidayRecord;
use crate::utils::write_if_changed;

pub const GEMINI_MODEL: &str = "gemini-2.5-flash-lite-preview-09-2025";
const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Generated "why it matters" text for one holiday
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayEnrichment {
    pub slug: String,
    /// Model that wrote the text
    pub model: String,
    pub why_it_matters: String,
}

// Gemini API types
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "thinkingConfig")]
    thinking_config: ThinkingConfig,
}

#[derive(Debug, Serialize)]
struct ThinkingConfig {
    #[serde(rename = "thinkingBudget")]
    thinking_budget: i32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiResponseContent,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

/// Response structure requested from Gemini
#[derive(Debug, Deserialize)]
struct GeminiAnalysis {
    why_it_matters: String,
}

fn get_api_key() -> Result<String> {
    std::env::var("GEMINI_API_KEY")
        .or_else(|_| std::env::var("GOOGLE_API_KEY"))
        .context("GEMINI_API_KEY or GOOGLE_API_KEY environment variable must be set")
}

/// One JSON file per slug under `enrichment/holidays/`
pub struct EnrichmentStore {
    dir: PathBuf,
}

impl EnrichmentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, slug: &str) -> PathBuf {
        self.dir.join(format!("{}.json", slug))
    }

    /// Cached entry, if one exists and parses
    pub fn load(&self, slug: &str) -> Option<HolidayEnrichment> {
        let path = self.path(slug);
        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str::<HolidayEnrichment>(&content) {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Ignoring unreadable enrichment cache {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, entry: &HolidayEnrichment) -> Result<()> {
        let mut json = serde_json::to_string_pretty(entry)?;
        json.push('\n');
        write_if_changed(&self.path(&entry.slug), &json)?;
        Ok(())
    }
}

fn build_prompt(record: &HolidayRecord) -> String {
    let facts = if record.fun_facts.is_empty() {
        "none".to_string()
    } else {
        record.fun_facts.join(" | ")
    };
    format!(
        r#"You write short copy for a website about fun and obscure holidays.

Holiday: {name}
Date: {date}
Description: {description}
Fun facts: {facts}

Write 2-3 sentences (under 320 characters) explaining why this holiday matters to the people who celebrate it. Do not invent statistics, dates or founders. Plain text, no markdown.

Respond with ONLY a JSON object: {{"why_it_matters": "string"}}"#,
        name = record.name,
        date = record.pretty_date(),
        description = description_or_default(record),
        facts = facts,
    )
}

fn request_enrichment(
    client: &reqwest::blocking::Client,
    api_key: &str,
    model: &str,
    record: &HolidayRecord,
) -> Result<HolidayEnrichment> {
    let request = GeminiRequest {
        contents: vec![GeminiContent {
            parts: vec![GeminiPart {
                text: build_prompt(record),
            }],
        }],
        generation_config: GenerationConfig {
            temperature: 0.2,
            response_mime_type: "application/json".to_string(),
            thinking_config: ThinkingConfig { thinking_budget: 0 },
        },
    };

    let url = format!("{}/{}:generateContent?key={}", GEMINI_API_URL, model, api_key);

    let response = client
        .post(&url)
        .json(&request)
        .send()
        .context("Failed to send request to Gemini API")?;

    let response_text = response.text().context("Failed to read Gemini response")?;
    let gemini_response: GeminiResponse =
        serde_json::from_str(&response_text).context("Failed to parse Gemini response JSON")?;

    if let Some(error) = gemini_response.error {
        bail!("Gemini API error: {}", error.message);
    }

    let candidates = gemini_response
        .candidates
        .context("No candidates in Gemini response")?;
    let text = candidates
        .first()
        .and_then(|c| c.content.parts.first())
        .and_then(|p| p.text.as_ref())
        .context("No text in Gemini response")?;
    let analysis: GeminiAnalysis = serde_json::from_str(text)
        .with_context(|| format!("Failed to parse enrichment JSON: {}", text))?;

    let why = analysis.why_it_matters.trim();
    if why.is_empty() {
        bail!("Gemini returned an empty paragraph");
    }

    Ok(HolidayEnrichment {
        slug: record.slug.clone(),
        model: model.to_string(),
        why_it_matters: why.to_string(),
    })
}

/// Cache-first enrichment. The API is only called when enrichment is
/// enabled and the cache has no entry for the slug.
pub struct Enricher {
    store: EnrichmentStore,
    api: Option<(reqwest::blocking::Client, String)>,
    model: String,
}

impl Enricher {
    pub fn new(store: EnrichmentStore, options: &RunOptions) -> Self {
        let model = options
            .enrich_model
            .clone()
            .unwrap_or_else(|| GEMINI_MODEL.to_string());
        let api = if options.enrich {
            match Self::client() {
                Ok(api) => Some(api),
                Err(e) => {
                    log::warn!("Enrichment disabled: {:#}", e);
                    None
                }
            }
        } else {
            None
        };
        Self { store, api, model }
    }

    fn client() -> Result<(reqwest::blocking::Client, String)> {
        let api_key = get_api_key()?;
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok((client, api_key))
    }

    pub fn enrich(&self, record: &HolidayRecord) -> Option<HolidayEnrichment> {
        if let Some(cached) = self.store.load(&record.slug) {
            return Some(cached);
        }
        let (client, api_key) = self.api.as_ref()?;
        match request_enrichment(client, api_key, &self.model, record) {
            Ok(entry) => {
                if let Err(e) = self.store.save(&entry) {
                    log::warn!("Could not cache enrichment for {}: {:#}", record.slug, e);
                }
                log::info!("Enriched {} with {}", record.slug, self.model);
                Some(entry)
            }
            Err(e) => {
                log::warn!("Enrichment failed for {}: {:#}", record.slug, e);
                None
            }
        }
    }
}
