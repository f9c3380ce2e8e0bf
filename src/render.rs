//! Holiday page template

use chrono::{Datelike, NaiveDate};
use serde_json::{json, Value};

use crate::config::SiteConfig;
use crate::enrichment::HolidayEnrichment;
use crate::index::HolidayIndex;
use crate::links::Neighbors;
use crate::types::HolidayRecord;

/// Present in every page this tool renders
pub const GENERATOR_MARKER: &str = r#"<meta name="generator" content="ohc-site" />"#;

pub const META_LIMIT: usize = 155;
const WHY_LIMIT: usize = 320;
const RELATED_LIMIT: usize = 110;
/// A sentence break before this many characters is too early to cut at
const MIN_SENTENCE_CUT: usize = 60;

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Shorten text for a meta description, counting characters.
///
/// Text within the limit is returned trimmed. Longer text is cut at the last
/// sentence break (`. `, `! `, `? `) within the first `limit + 1` characters,
/// as long as that break lies past the 60th character, keeping the
/// punctuation. Otherwise it is hard-cut at `limit`, trailing whitespace is
/// dropped and `...` appended. Empty text uses `fallback`.
pub fn shorten_for_meta(text: &str, fallback: &str, limit: usize) -> String {
    let trimmed = text.trim();
    let base = if trimmed.is_empty() { fallback } else { trimmed };
    if base.chars().count() <= limit {
        return base.to_string();
    }

    let cut: String = base.chars().take(limit + 1).collect();
    let boundary = [". ", "! ", "? "]
        .iter()
        .filter_map(|sep| cut.rfind(sep))
        .filter(|&pos| cut[..pos].chars().count() > MIN_SENTENCE_CUT)
        .max();
    if let Some(pos) = boundary {
        return cut[..=pos].trim().to_string();
    }

    let hard: String = cut.chars().take(limit).collect();
    format!("{}...", hard.trim_end())
}

/// Make JSON safe to embed in a `<script>` element
pub fn script_safe_json(json: &str) -> String {
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

/// Serialize a schema.org object into a script tag that cannot close early
pub fn json_ld_script(value: &Value) -> String {
    let body = script_safe_json(&serde_json::to_string_pretty(value).unwrap_or_default());
    format!("<script type=\"application/ld+json\">\n{}\n</script>", body)
}

/// Keyword-driven holiday category
#[derive(Debug, PartialEq, Eq)]
pub struct Category {
    pub label: &'static str,
    keywords: &'static [&'static str],
    pub great_for: &'static [&'static str],
    /// `{name}` is replaced with the holiday name
    ideas: &'static [&'static str],
}

const CATEGORIES: &[Category] = &[
    Category {
        label: "Food / Dessert",
        keywords: &[
            "chocolate", "cookie", "cake", "pie", "pizza", "ice cream", "bake", "candy",
            "dessert", "sandwich", "taco", "burger", "bread", "soup", "coffee", "tea", "wine",
            "beer", "cocktail", "cheese",
        ],
        great_for: &["Foodies", "Chocolate lovers", "Home bakers"],
        ideas: &[
            "Try a playful twist: cover non-traditional foods in chocolate or sauces inspired by {name}.",
            "Host a tasting plate with sweet and savory pairings.",
            "Share a recipe photo, tag friends, and swap your favorite topping ideas.",
        ],
    },
    Category {
        label: "Pets / Animals",
        keywords: &["cat", "dog", "pet", "kitten", "puppy"],
        great_for: &["Pet parents", "Shelters", "Veterinarians"],
        ideas: &[
            "Share photos of your pets enjoying a themed treat or outfit.",
            "Donate supplies to a local shelter or foster program.",
            "Schedule a short playdate or walk with a rescue in mind.",
        ],
    },
    Category {
        label: "Learning / Reading",
        keywords: &["book", "read", "poetry", "dictionary", "grammar", "library", "literacy"],
        great_for: &["Book clubs", "Teachers", "Students"],
        ideas: &[
            "Set aside 15 minutes to read or learn something tied to the day's theme.",
            "Share a favorite quote or fact with a friend or class.",
            "Start a tiny challenge: one page, one fact, one takeaway.",
        ],
    },
    Category {
        label: "Games & Fun",
        keywords: &["game", "chess", "puzzle", "crossword", "scrabble", "trivia"],
        great_for: &["Game nights", "Families", "Puzzle fans"],
        ideas: &[
            "Host a quick game round: board game, puzzle, or trivia tied to the theme.",
            "Share a digital puzzle link with friends and compare times.",
            "Teach someone a new game mechanic or strategy today.",
        ],
    },
    Category {
        label: "Nature / Outdoors",
        keywords: &["tree", "garden", "flower", "earth", "nature", "hike", "outdoors"],
        great_for: &["Gardeners", "Hikers", "Eco clubs"],
        ideas: &[
            "Step outside for a themed photo or short walk, noting what fits the day.",
            "Plant something small: herbs, seeds, or a window box.",
            "Share a conservation tip or nature fact with friends.",
        ],
    },
    Category {
        label: "Health / Wellness",
        keywords: &["fitness", "health", "run", "walk", "yoga", "meditation"],
        great_for: &["Wellness groups", "Gyms", "Health classes"],
        ideas: &[
            "Do a 10-minute movement session inspired by the day's theme.",
            "Prep a simple, nutritious snack to match the day.",
            "Share one healthy habit you're keeping this week.",
        ],
    },
    Category {
        label: "Kindness / Community",
        keywords: &["kindness", "friend", "hug", "thank", "compliment", "help", "appreciation"],
        great_for: &["Community groups", "Friends", "Coworkers"],
        ideas: &[
            "Send a kind note or shout-out to someone who fits the theme.",
            "Do one small favor quietly for a friend or coworker.",
            "Share a feel-good story tied to the observance.",
        ],
    },
    Category {
        label: "Geek / Tech",
        keywords: &[
            "tech", "computer", "internet", "coding", "science", "math", "pi", "engineer", "robot",
        ],
        great_for: &["Tech teams", "STEM clubs", "Developers"],
        ideas: &[
            "Share a favorite fact, meme, or tool related to the theme.",
            "Host a mini show-and-tell: a gadget, code snippet, or STEM story.",
            "Try a short experiment or demo that fits the day.",
        ],
    },
];

const GENERAL_CATEGORY: Category = Category {
    label: "Cultural / community observance",
    keywords: &[],
    great_for: &["Friends", "Families", "Classrooms", "Teams"],
    ideas: &[],
};

/// Whole-word keyword match; a plural `s` is allowed
fn mentions(words: &str, keyword: &str) -> bool {
    words.contains(&format!(" {} ", keyword)) || words.contains(&format!(" {}s ", keyword))
}

pub fn classify(name: &str, description: &str) -> &'static Category {
    let lower = format!("{} {}", name, description).to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let words = format!(" {} ", words.join(" "));
    CATEGORIES
        .iter()
        .find(|c| c.keywords.iter().any(|k| mentions(&words, k)))
        .unwrap_or(&GENERAL_CATEGORY)
}

/// Generic celebration ideas, led by a fun fact when there is one
pub fn celebration_ideas(name: &str, pretty: &str, fun_facts: &[String]) -> Vec<String> {
    let keyword = name.replace("Day", "");
    let hashtag = crate::index::slugify(name).replace('-', "");
    let mut ideas = vec![
        format!(
            "Plan something small on {}: a quick nod to {} with friends, family, or coworkers.",
            pretty, name
        ),
        format!(
            "Share the story of {} on social and tag it with #{} so others can join in.",
            name, hashtag
        ),
        format!(
            "Bring the theme into your day: decorate a workspace, cook or bake something inspired by {}, or play music that matches the mood.",
            keyword.trim()
        ),
        format!(
            "Add {} to your Obscure Holiday Calendar app widget so you get a reminder next year.",
            name
        ),
    ];
    if let Some(fact) = fun_facts.first() {
        ideas.insert(0, format!("Tell someone this fast fact about {}: {}", name, fact));
    }
    ideas
}

pub fn category_celebrations(category: &Category, name: &str, pretty: &str) -> Vec<String> {
    if category.ideas.is_empty() {
        return celebration_ideas(name, pretty, &[]);
    }
    category
        .ideas
        .iter()
        .map(|idea| idea.replace("{name}", name))
        .collect()
}

pub fn description_or_default(record: &HolidayRecord) -> String {
    if record.description.trim().is_empty() {
        format!(
            "Learn about {}, an unofficial observance celebrated on {}.",
            record.name,
            record.pretty_date()
        )
    } else {
        record.description.trim().to_string()
    }
}

pub fn meta_description(record: &HolidayRecord) -> String {
    let fallback = format!("{} is celebrated on {}.", record.name, record.pretty_date());
    shorten_for_meta(&description_or_default(record), &fallback, META_LIMIT)
}

pub fn fun_facts_or_default(record: &HolidayRecord) -> Vec<String> {
    if !record.fun_facts.is_empty() {
        return record.fun_facts.clone();
    }
    vec![
        format!(
            "{} is an informal observance that repeats every year on {}.",
            record.name,
            record.pretty_date()
        ),
        "Many people discover the day through social media or community calendars.".to_string(),
        "Small gestures like a note, a treat, or a themed activity keep the spirit of the holiday alive."
            .to_string(),
    ]
}

pub fn build_faq(name: &str, pretty: &str, description: &str, celebrate: &str) -> Vec<(String, String)> {
    vec![
        (
            format!("When is {}?", name),
            format!("It is observed on {} each year.", pretty),
        ),
        (format!("What is {}?", name), description.to_string()),
        (format!("How do people celebrate {}?", name), celebrate.to_string()),
    ]
}

pub struct PageRenderer<'a> {
    config: &'a SiteConfig,
    index: &'a HolidayIndex,
    last_updated: NaiveDate,
}

impl<'a> PageRenderer<'a> {
    pub fn new(config: &'a SiteConfig, index: &'a HolidayIndex, last_updated: NaiveDate) -> Self {
        Self {
            config,
            index,
            last_updated,
        }
    }

    fn holiday_link(&self, slug: &str, label: Option<&str>) -> String {
        let label = label.map_or_else(|| self.index.title(slug), str::to_string);
        format!(
            r#"<a href="/holiday/{}/">{}</a>"#,
            html_escape(slug),
            html_escape(&label)
        )
    }

    fn structured_data(
        &self,
        record: &HolidayRecord,
        canonical: &str,
        meta: &str,
        faq: &[(String, String)],
    ) -> String {
        let site = &self.config.site_name;
        let publisher = json!({
            "@type": "Organization",
            "name": site,
            "logo": {"@type": "ImageObject", "url": self.config.icon_url()},
        });
        let article = json!({
            "@context": "https://schema.org",
            "@type": "Article",
            "headline": record.name,
            "description": meta,
            "dateModified": self.last_updated.to_string(),
            "mainEntityOfPage": {"@type": "WebPage", "@id": canonical},
            "author": {"@type": "Organization", "name": site},
            "publisher": publisher,
        });
        let faq_page = json!({
            "@context": "https://schema.org",
            "@type": "FAQPage",
            "mainEntity": faq.iter().map(|(q, a)| json!({
                "@type": "Question",
                "name": q,
                "acceptedAnswer": {"@type": "Answer", "text": a},
            })).collect::<Vec<Value>>(),
        });
        let mobile_app = json!({
            "@context": "https://schema.org",
            "@type": "MobileApplication",
            "name": site,
            "operatingSystem": "Android, iOS",
            "applicationCategory": "LifestyleApplication",
            "url": self.config.app_url(),
            "downloadUrl": [self.config.android_url, self.config.ios_url],
            "offers": {"@type": "Offer", "price": 0, "priceCurrency": "USD"},
            "publisher": publisher,
        });
        let breadcrumb = breadcrumb_list(self.config, &record.name, canonical);
        let web_page = json!({
            "@context": "https://schema.org",
            "@type": "WebPage",
            "name": record.name,
            "url": canonical,
            "description": meta,
            "breadcrumb": breadcrumb,
            "isPartOf": {"@type": "WebSite", "name": site, "url": self.config.site_base},
        });

        [article, faq_page, mobile_app, breadcrumb, web_page]
            .iter()
            .map(|v| format!("  {}", json_ld_script(v)))
            .collect::<Vec<String>>()
            .join("\n")
    }

    fn related_items(&self, related: &[String]) -> String {
        related
            .iter()
            .map(|slug| {
                let (name, date, description) = match self.index.get(slug) {
                    Some(r) => (r.name.clone(), r.pretty_date(), r.description.clone()),
                    None => (self.index.title(slug), String::new(), String::new()),
                };
                let blurb = if description.trim().is_empty() {
                    format!("Discover {}.", name)
                } else {
                    description
                };
                let blurb = shorten_for_meta(&blurb, &format!("Learn about {}.", name), RELATED_LIMIT);
                format!(
                    r#"          <li>
            <span class="meta">{date}</span>
            <a href="/holiday/{slug}/">{name}</a>
            <p>{blurb}</p>
          </li>
"#,
                    date = html_escape(&date),
                    slug = html_escape(slug),
                    name = html_escape(&name),
                    blurb = html_escape(&blurb),
                )
            })
            .collect()
    }

    fn continue_items(&self, neighbors: &Neighbors) -> String {
        let mut items = vec![
            format!("Yesterday: {}", self.holiday_link(&neighbors.prev, None)),
            format!("Tomorrow: {}", self.holiday_link(&neighbors.next, None)),
            format!("Random pick: {}", self.holiday_link(&neighbors.random, None)),
        ];
        if let Some(popular) = &neighbors.popular {
            items.push(format!(
                "Popular: {}",
                self.holiday_link(&popular.slug, Some(&popular.name))
            ));
        }
        items
            .iter()
            .map(|item| format!("          <li>{}</li>\n", item))
            .collect()
    }

    fn store_buttons(&self, indent: &str) -> String {
        format!(
            r#"{i}<div class="store-buttons-top">
{i}  <a href="{ios}" target="_blank" rel="noopener">
{i}    <img src="https://developer.apple.com/assets/elements/badges/download-on-the-app-store.svg" alt="Download on the App Store" class="store-badge" />
{i}  </a>
{i}  <a href="{android}" target="_blank" rel="noopener">
{i}    <img src="https://play.google.com/intl/en_us/badges/static/images/badges/en_badge_web_generic.png" alt="Get it on Google Play" class="store-badge" />
{i}  </a>
{i}</div>"#,
            i = indent,
            ios = html_escape(&self.config.ios_url),
            android = html_escape(&self.config.android_url),
        )
    }

    /// Render a complete page. Output depends only on the arguments and
    /// `last_updated`.
    pub fn render(
        &self,
        record: &HolidayRecord,
        neighbors: &Neighbors,
        enrichment: Option<&HolidayEnrichment>,
    ) -> String {
        let config = self.config;
        let name = record.name.as_str();
        let slug = record.slug.as_str();
        let pretty = record.pretty_date();
        let emoji = if record.emoji.is_empty() { "✨" } else { record.emoji.as_str() };

        let description = description_or_default(record);
        let meta = meta_description(record);
        let fun_facts = fun_facts_or_default(record);
        let category = classify(name, &record.description);
        let celebrations = category_celebrations(category, name, &pretty);
        let celebrate_line = celebrations.first().cloned().unwrap_or_else(|| {
            "Share the story, plan a small themed activity, and spread a little joy.".to_string()
        });
        let faq = build_faq(name, &pretty, &description, &celebrate_line);
        let why = match enrichment {
            Some(e) if !e.why_it_matters.trim().is_empty() => {
                shorten_for_meta(&e.why_it_matters, &description, WHY_LIMIT)
            }
            _ => shorten_for_meta(
                &description,
                &format!("Discover why {} is celebrated on {}.", name, pretty),
                WHY_LIMIT,
            ),
        };

        let canonical = config.holiday_url(slug);
        let title = format!("{} | {}", name, config.site_name);
        let schema = self.structured_data(record, &canonical, &meta, &faq);
        let page_data = json!({"slug": slug, "name": name, "url": canonical});
        let page_data = script_safe_json(&serde_json::to_string(&page_data).unwrap_or_default());

        let list = |items: &[String]| -> String {
            items
                .iter()
                .map(|item| format!("          <li>{}</li>\n", html_escape(item)))
                .collect()
        };
        let faq_items: String = faq
            .iter()
            .map(|(q, a)| {
                format!(
                    "          <div class=\"faq-item\"><dt>{}</dt><dd>{}</dd></div>\n",
                    html_escape(q),
                    html_escape(a)
                )
            })
            .collect();
        let origin = match fun_facts.get(1) {
            Some(second) => format!(
                "        <p>{}</p>\n        <p>{}</p>",
                html_escape(&fun_facts[0]),
                html_escape(second)
            ),
            None => format!("        <p>{}</p>", html_escape(&fun_facts[0])),
        };
        let sources = match &record.source_url {
            Some(url) => format!(
                r#"<p>Source: <a href="{url}" target="_blank" rel="noopener nofollow">{url}</a></p>"#,
                url = html_escape(url)
            ),
            None => format!("<p>Primary note: {}</p>", html_escape(&fun_facts[0])),
        };

        format!(
            r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{title}</title>
  <meta name="description" content="{meta}" />
  <meta name="last-modified" content="{updated}" />
  {generator}
  <meta name="theme-color" content="#2c005f" />
  <meta name="google-adsense-account" content="{ads_client}" />
  <link rel="canonical" href="{canonical}" />
  <link rel="stylesheet" href="/styles.css" />
  <link rel="preconnect" href="https://www.googletagmanager.com" crossorigin />
  <link rel="preconnect" href="https://pagead2.googlesyndication.com" crossorigin />
  <link rel="icon" href="{base}/favicon.ico" type="image/x-icon" />
  <link rel="icon" type="image/png" href="{icon}" />
  <link rel="apple-touch-icon" href="{base}/apple-touch-icon.png" />
  <script async src="https://www.googletagmanager.com/gtag/js?id={ga}"></script>
  <script>
    window.dataLayer = window.dataLayer || [];
    function gtag(){{dataLayer.push(arguments);}}
    gtag('js', new Date());
    gtag('config', '{ga}');
  </script>
  <meta name="apple-itunes-app" content="app-id={ios_app_id}" />
  <meta name="google-play-app" content="app-id={android_package}" />
  <meta property="og:title" content="{title}" />
  <meta property="og:description" content="{meta}" />
  <meta property="og:type" content="article" />
  <meta property="og:url" content="{canonical}" />
  <meta property="og:image" content="{icon}" />
  <meta name="twitter:card" content="summary_large_image" />
  <meta name="twitter:title" content="{title}" />
  <meta name="twitter:description" content="{meta}" />
  <meta name="twitter:image" content="{icon}" />
  <script async src="https://pagead2.googlesyndication.com/pagead/js/adsbygoogle.js?client={ads_client}" crossorigin="anonymous"></script>
  <style>
{css}
  </style>
{schema}
</head>
<body class="page">
  <a class="skip-link" href="#main">Skip to main content</a>
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
      <a class="ig-link" href="{instagram}" target="_blank" rel="noopener" aria-label="Follow us on Instagram">@obscureholidaycalendar</a>
      <a href="/about/">About</a>
      <a href="/contact/">Contact</a>
      <a href="/privacy/">Privacy</a>
    </nav>
  </header>

  <main id="main" class="page-wrap">
    <nav class="breadcrumb" aria-label="Breadcrumb">
      <a href="/">Home</a>
      <span aria-hidden="true">›</span>
      <a href="/holiday/">Holidays</a>
      <span aria-hidden="true">›</span>
      <span>{name}</span>
    </nav>
    <div class="quick-links" aria-label="Page quick links">
      <a href="#overview">Overview</a>
      <a href="#celebrate">Celebrate</a>
      <a href="#fun-facts">Fun facts</a>
      <a href="#faq">FAQ</a>
      <a href="#related">Related</a>
    </div>
    <article class="holiday-card">
      <div class="eyebrow">Annual observance</div>
      <h1 class="holiday-title">{name} <span class="holiday-emoji" aria-hidden="true">{emoji}</span></h1>
      <div class="date">{pretty}</div>
      <img src="/assets/badges/{slug_attr}.svg" alt="{name} badge" class="hero-badge" loading="lazy" decoding="async" />
      <div class="meta-line">
        <span class="pill">{pretty}</span>
        <span class="pill pill-secondary">{type_label}</span>
        <span class="pill pill-secondary">Updated {updated}</span>
      </div>
      <div class="share-tools">
        <button class="btn-pill" type="button" id="share-btn" aria-label="Share this holiday">Share this holiday</button>
        <button class="btn-pill secondary" type="button" id="copy-btn" aria-label="Copy link to clipboard">Copy link</button>
      </div>
      <div class="share-feedback" id="share-feedback" aria-live="polite"></div>

      <p class="lead">This holiday is featured in the {site} app with emoji-style visuals, reminders, and daily fun facts.</p>

{store_top}

      <section class="section" id="overview">
        <h2>Overview</h2>
        <p>{description}</p>
        <p>Observed each year on {pretty}, {name} invites people to pause, share the story, and bring a little themed joy to their day.</p>
      </section>

      <div class="note-bar" role="note">
        <strong>Why it matters:</strong> {why}
      </div>

      <section class="section">
        <h2>Origin and story</h2>
{origin}
      </section>

      <div class="ad-section">
        <ins class="adsbygoogle"
             style="display:block"
             data-ad-client="{ads_client}"
             data-ad-slot="{ads_slot}"
             data-ad-format="auto"
             data-full-width-responsive="true"></ins>
        <script>(adsbygoogle = window.adsbygoogle || []).push({{}});</script>
      </div>

      <section class="section">
        <h2>Quick facts</h2>
        <ul class="fact-list">
          <li><span>Date</span><span>{pretty}</span></li>
          <li><span>Type</span><span>{type_label}</span></li>
          <li><span>Great for</span><span>{great_for}</span></li>
        </ul>
      </section>

      <section class="section" id="celebrate">
        <h2>Ways to celebrate</h2>
        <ul class="list">
{celebrations}        </ul>
      </section>

      <section class="section" id="fun-facts">
        <h2>Fun facts</h2>
        <ul class="list">
{fun_facts}        </ul>
      </section>

      <section class="section">
        <h2>Sources and attribution</h2>
        {sources}
      </section>

      <section class="section" id="related">
        <h2>Related holidays</h2>
        <ul class="link-list">
{related}        </ul>
      </section>

      <section class="section" id="faq">
        <h2>FAQ</h2>
        <dl class="faq">
{faq}        </dl>
      </section>

      <section class="section app-cta">
        <h2>Get the app</h2>
        <p>Thousands of obscure holidays, daily widgets, reminders, and fun facts, free on iOS and Android.</p>
{store_cta}
      </section>

      <section class="section" id="continue">
        <h2>Continue your streak</h2>
        <ul class="link-list">
{continue_items}        </ul>
      </section>

      <section class="section" id="recently-viewed">
        <h2>Recently viewed holidays</h2>
        <ul class="recent-list" aria-live="polite"></ul>
      </section>
    </article>
  </main>

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
  <script>
    (function() {{
      const pageData = {page_data};
      const shareBtn = document.getElementById('share-btn');
      const copyBtn = document.getElementById('copy-btn');
      const feedback = document.getElementById('share-feedback');
      const recentList = document.querySelector('.recent-list');
{page_script}
      addRecent();
      renderRecents();
    }})();
  </script>
</body>
</html>
"##,
            title = html_escape(&title),
            meta = html_escape(&meta),
            updated = self.last_updated,
            generator = GENERATOR_MARKER,
            ads_client = html_escape(&config.ads_client),
            ads_slot = html_escape(&config.ads_slot),
            canonical = html_escape(&canonical),
            base = html_escape(&config.site_base),
            icon = html_escape(&config.icon_url()),
            ga = html_escape(&config.analytics_id),
            ios_app_id = html_escape(&config.ios_app_id),
            android_package = html_escape(&config.android_package),
            css = PAGE_CSS,
            schema = schema,
            site = html_escape(&config.site_name),
            instagram = html_escape(&config.instagram_url),
            name = html_escape(name),
            emoji = html_escape(emoji),
            pretty = html_escape(&pretty),
            slug_attr = html_escape(slug),
            type_label = html_escape(category.label),
            great_for = html_escape(&category.great_for.join(", ")),
            store_top = self.store_buttons("      "),
            store_cta = self.store_buttons("        "),
            description = html_escape(&description),
            why = html_escape(&why),
            origin = origin,
            celebrations = list(&celebrations),
            fun_facts = list(&fun_facts),
            sources = sources,
            related = self.related_items(&neighbors.related),
            faq = faq_items,
            continue_items = self.continue_items(neighbors),
            year = self.last_updated.year(),
            page_data = page_data,
            page_script = PAGE_SCRIPT,
        )
    }
}

/// Home > Holidays > name
pub fn breadcrumb_list(config: &SiteConfig, name: &str, canonical: &str) -> Value {
    let crumbs = [
        ("Home".to_string(), config.absolute_url("/")),
        ("Holidays".to_string(), config.absolute_url("/holiday/")),
        (name.to_string(), canonical.to_string()),
    ];
    json!({
        "@context": "https://schema.org",
        "@type": "BreadcrumbList",
        "itemListElement": crumbs.iter().enumerate().map(|(i, (label, url))| json!({
            "@type": "ListItem",
            "position": i + 1,
            "name": label,
            "item": url,
        })).collect::<Vec<Value>>(),
    })
}

const PAGE_CSS: &str = r#"    :root {
      --brand-purple: #2c005f;
      --brand-pink: #f25d94;
      --brand-blue: #1c96f3;
      --border: #e4e7f2;
      --shadow: 0 24px 64px rgba(20, 12, 70, 0.16);
    }
    body {
      margin: 0;
      font-family: "Inter", "Manrope", system-ui, -apple-system, sans-serif;
      background: radial-gradient(circle at 20% 20%, #1a0c3f 0%, #0f0a2a 40%, #0b0b24 70%);
      color: #0f172a;
    }
    .skip-link {
      position: absolute;
      left: -999px;
    }
    .skip-link:focus {
      position: static;
      padding: 10px 14px;
      background: #ffffff;
    }
    .page-wrap {
      max-width: 1120px;
      margin: 0 auto;
      padding: 18px 16px 42px;
    }
    .site-header {
      display: flex;
      align-items: center;
      justify-content: space-between;
      gap: 16px;
      padding: 14px 16px;
      margin: 8px auto;
      max-width: 1120px;
    }
    .brand-mark {
      width: 44px;
      height: 44px;
      border-radius: 12px;
    }
    .brand-name, .nav-links a {
      color: #f0f4ff;
    }
    .breadcrumb a, .quick-links a {
      color: #f5f3ff;
      text-decoration: none;
      padding: 6px 10px;
      border-radius: 999px;
      background: rgba(255,255,255,0.08);
    }
    .holiday-card {
      background: linear-gradient(180deg, #ffffff 0%, #f8f5ff 100%);
      border: 1px solid var(--border);
      box-shadow: var(--shadow);
      border-radius: 22px;
      padding: 18px;
    }
    .holiday-title {
      color: var(--brand-purple);
      font-size: clamp(2rem, 2.4vw + 1.2rem, 2.8rem);
      line-height: 1.1;
    }
    .date {
      color: var(--brand-pink);
      font-weight: 800;
    }
    .hero-badge {
      max-width: 260px;
      width: min(90%, 260px);
    }
    .pill {
      display: inline-flex;
      padding: 6px 10px;
      border-radius: 999px;
      border: 1px solid #ece9ff;
    }
    .note-bar {
      padding: 12px 14px;
      border-radius: 14px;
      background: linear-gradient(90deg, rgba(44,0,95,0.14), rgba(28,150,243,0.14));
    }
    .link-list {
      list-style: none;
      padding: 0;
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(240px, 1fr));
      gap: 12px;
    }
    .link-list li {
      border: 1px solid #e8e8fb;
      border-radius: 16px;
      padding: 12px 14px;
    }
    .btn-pill {
      padding: 10px 14px;
      background: linear-gradient(120deg, #2c005f, #f25d94);
      color: #fff;
      border-radius: 999px;
      border: none;
      cursor: pointer;
    }
    .btn-pill.secondary {
      background: linear-gradient(120deg, #1c96f3, #5ad4ff);
    }
    .site-footer {
      text-align: center;
      color: #e2e8f0;
      padding: 24px 16px;
    }"#;

const PAGE_SCRIPT: &str = r#"
      function setFeedback(msg) {
        if (feedback) feedback.textContent = msg;
      }

      function copy() {
        try {
          navigator.clipboard.writeText(pageData.url);
          setFeedback('Link copied to clipboard.');
        } catch (e) {
          setFeedback('Copy not available in this browser.');
        }
      }

      async function share() {
        if (!navigator.share) {
          copy();
          return;
        }
        try {
          await navigator.share({ title: pageData.name, text: 'Check out ' + pageData.name, url: pageData.url });
          setFeedback('Thanks for sharing!');
        } catch (e) {
          setFeedback('Share canceled.');
        }
      }

      function loadRecents() {
        try {
          const raw = localStorage.getItem('ohc_recent');
          return raw ? JSON.parse(raw) : [];
        } catch (e) {
          return [];
        }
      }

      function saveRecents(list) {
        try { localStorage.setItem('ohc_recent', JSON.stringify(list)); } catch (e) {}
      }

      function addRecent() {
        const recents = loadRecents().filter(item => item.slug !== pageData.slug);
        recents.unshift(pageData);
        if (recents.length > 6) recents.length = 6;
        saveRecents(recents);
      }

      function renderRecents() {
        if (!recentList) return;
        const recents = loadRecents().filter(item => item.slug !== pageData.slug);
        recentList.textContent = '';
        if (!recents.length) {
          recents.push({ url: '/holiday/', name: 'Browse all holidays' });
        }
        recents.forEach(item => {
          const li = document.createElement('li');
          const a = document.createElement('a');
          a.href = item.url;
          a.textContent = item.name;
          li.appendChild(a);
          recentList.appendChild(li);
        });
      }

      if (shareBtn) shareBtn.addEventListener('click', share);
      if (copyBtn) copyBtn.addEventListener('click', copy);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{build_index, HolidayDatabase};
    use crate::links::CalendarLinks;
    use scraper::{Html, Selector};

    fn render_first(db: serde_json::Value, slug: &str) -> String {
        let db = HolidayDatabase::from_value(db).unwrap();
        let index = build_index(&db);
        let config = SiteConfig::default();
        let links = CalendarLinks::new(&index, &config.popular);
        let renderer = PageRenderer::new(
            &config,
            &index,
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        );
        let record = index.get(slug).unwrap();
        renderer.render(record, &links.neighbors(slug).unwrap(), None)
    }

    fn select_all(document: &Html, selector: &str) -> Vec<String> {
        let selector = Selector::parse(selector).unwrap();
        document
            .select(&selector)
            .map(|e| e.text().collect::<String>())
            .collect()
    }

    fn meta_content(document: &Html, name: &str) -> String {
        let selector = Selector::parse(&format!("meta[name=\"{}\"]", name)).unwrap();
        document
            .select(&selector)
            .next()
            .and_then(|e| e.value().attr("content"))
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_shorten_short_text_untouched() {
        assert_eq!(shorten_for_meta("  Short one.  ", "fallback", 155), "Short one.");
        assert_eq!(shorten_for_meta("   ", "fallback", 155), "fallback");
    }

    #[test]
    fn test_shorten_cuts_at_sentence() {
        let first = "A".repeat(70);
        let text = format!("{}. {}", first, "b ".repeat(100));
        let out = shorten_for_meta(&text, "x", 155);
        assert_eq!(out, format!("{}.", first));
    }

    #[test]
    fn test_shorten_ignores_early_sentence() {
        let text = format!("Hi. {}", "word ".repeat(60));
        let out = shorten_for_meta(&text, "x", 155);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 158);
    }

    #[test]
    fn test_shorten_counts_characters() {
        let text = "é".repeat(200);
        let out = shorten_for_meta(&text, "x", 155);
        assert_eq!(out.chars().count(), 158);
        assert!(out.starts_with("ééé"));
    }

    #[test]
    fn test_json_ld_cannot_close_script() {
        let script = json_ld_script(&json!({"name": "</script><script>alert(1)</script>"}));
        assert_eq!(script.matches("</script>").count(), 1);
        assert!(script.ends_with("</script>"));
        assert!(script.contains("\\u003c/script\\u003e"));
        let body = script
            .trim_start_matches("<script type=\"application/ld+json\">")
            .trim_end_matches("</script>");
        let parsed: Value = serde_json::from_str(body).unwrap();
        assert_eq!(parsed["name"], "</script><script>alert(1)</script>");
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("Pi Day", "").label, "Geek / Tech");
        assert_eq!(classify("Talk Like a Pirate Day", "").label, "Cultural / community observance");
        assert_eq!(classify("National Pizza Day", "").label, "Food / Dessert");
        assert_eq!(classify("National Cat Day", "Adopt cats").label, "Pets / Animals");
        assert_eq!(classify("Board Games Day", "").label, "Games & Fun");
    }

    #[test]
    fn test_default_celebrations_lead_with_fact() {
        let ideas = celebration_ideas("Pi Day", "March 14", &["Pi is irrational.".to_string()]);
        assert_eq!(ideas.len(), 5);
        assert!(ideas[0].contains("Pi is irrational."));
        assert!(ideas[2].contains("#piday"));
    }

    #[test]
    fn test_pi_day_page() {
        let html = render_first(
            json!({"holidays": {"03-14": [{"name": "Pi Day", "description": "", "funFacts": []}]}}),
            "pi-day",
        );
        let document = Html::parse_document(&html);

        let title = select_all(&document, "title");
        assert_eq!(title.len(), 1);
        assert!(!title[0].trim().is_empty());

        let description = meta_content(&document, "description");
        assert!(description.contains("Pi Day"));
        assert!(description.contains("March 14"));

        assert_eq!(select_all(&document, "div.date"), vec!["March 14".to_string()]);

        let blocks: Vec<serde_json::Value> = select_all(&document, r#"script[type="application/ld+json"]"#)
            .iter()
            .map(|s| serde_json::from_str(s).unwrap())
            .collect();
        let types: Vec<&str> = blocks.iter().map(|b| b["@type"].as_str().unwrap()).collect();
        assert_eq!(types, vec!["Article", "FAQPage", "MobileApplication", "BreadcrumbList", "WebPage"]);
        assert_eq!(blocks[0]["headline"], "Pi Day");
        assert_eq!(blocks[1]["mainEntity"].as_array().unwrap().len(), 3);

        // synthesized fun facts
        let facts = select_all(&document, "#fun-facts li");
        assert_eq!(facts.len(), 3);
        assert!(html.contains("&copy; 2025"));
        assert!(html.contains(GENERATOR_MARKER));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let html = render_first(
            json!({"holidays": {"05-05": [{
                "name": "Salsa & <Chips> Day",
                "description": "Dip \"everything\" </script>",
                "funFacts": ["<b>bold</b>"]
            }]}}),
            "salsa-and-chips-day",
        );
        assert!(!html.contains("<Chips>"));
        assert!(!html.contains("<b>bold</b>"));
        assert!(html.contains("Salsa &amp; &lt;Chips&gt; Day"));
        assert!(!html.contains("Dip \"everything\" </script>"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let db = json!({"holidays": {
            "03-14": [{"name": "Pi Day", "description": "Celebrate pi."}],
            "03-15": [{"name": "Ides Day"}],
            "04-01": [{"name": "Fools Day"}]
        }});
        assert_eq!(render_first(db.clone(), "ides-day"), render_first(db, "ides-day"));
    }

    #[test]
    fn test_renderer_provides_patch_anchors() {
        let html = render_first(
            json!({"holidays": {"03-14": [{"name": "Pi Day"}]}}),
            "pi-day",
        );
        for anchor in [
            crate::patch::STYLE_CLOSE,
            crate::patch::HOLIDAY_CARD_OPEN,
            crate::patch::CELEBRATE_SECTION,
            crate::patch::CONTINUE_HEADING,
            crate::patch::RECENTS_HOOK,
            crate::patch::NAV_HOLIDAYS_LINK,
        ] {
            assert!(html.contains(anchor), "missing anchor {:?}", anchor);
        }
    }
}
