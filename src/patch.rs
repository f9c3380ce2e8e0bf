//! Idempotent insertion and replacement of named HTML blocks.
//!
//! Every block a page can carry is a [`BlockId`]. Its entry in [`BLOCK_TABLE`]
//! fixes how it is detected, where it goes, and what happens when it is
//! already present:
//!
//! - [`Policy::StripAndReplace`] blocks hold content derived from holiday data.
//!   They are wrapped in start/end comments; an existing region is replaced in
//!   place and any extra copies are removed.
//! - [`Policy::InsertIfAbsent`] blocks are structural. A unique marker substring
//!   detects them, and a page that already has the marker is left alone.
//!
//! A missing anchor is never an error: the page comes back unchanged with
//! [`PatchOutcome::AnchorMissing`] and the caller decides whether to log it.

use regex::Regex;
use std::sync::LazyLock;

static DATE_DIV: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r#"(?is)<div\s+class="date"[^>]*>.*?</div>"#));

static LEGACY_CSS: LazyLock<Result<Vec<Regex>, regex::Error>> = LazyLock::new(|| {
    [
        r"(?is)<!-- STORE-BUTTONS-CSS-START -->.*?<!-- STORE-BUTTONS-CSS-END -->",
        r"(?is)<!-- BRAND-ICON-CSS-START -->.*?<!-- BRAND-ICON-CSS-END -->",
    ]
    .iter()
    .map(|p| Regex::new(p))
    .collect()
});

pub const SEO_START: &str = "<!-- START-SEO-BLOCK -->";
pub const SEO_END: &str = "<!-- END-SEO-BLOCK -->";
pub const BREADCRUMB_START: &str = "<!-- BREADCRUMB-SCHEMA -->";
pub const BREADCRUMB_END: &str = "<!-- /BREADCRUMB-SCHEMA -->";
pub const FOOTER_START: &str = "<!-- HOLIDAY-FOOTER -->";
pub const FOOTER_END: &str = "<!-- /HOLIDAY-FOOTER -->";

/// Anchor literals shared with the page renderer
pub const STYLE_CLOSE: &str = "  </style>";
pub const HOLIDAY_CARD_OPEN: &str = "    <article class=\"holiday-card\">";
pub const CELEBRATE_SECTION: &str = "      <section class=\"section\" id=\"celebrate\">";
pub const CONTINUE_HEADING: &str =
    "<section class=\"section\" id=\"continue\">\n        <h2>Continue your streak</h2>";
pub const RECENTS_HOOK: &str = "      addRecent();";
pub const NAV_HOLIDAYS_LINK: &str = "<a href=\"/holiday/\">Holidays</a>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlockId {
    AdsenseLoader,
    BreadcrumbSchema,
    SeoBlock,
    EngagementCss,
    PolishCss,
    NextRail,
    RelatedMid,
    ContinueLead,
    EngagementScript,
    AnalyticsScript,
    DiscordNav,
    HolidayFooter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    StripAndReplace {
        start: &'static str,
        end: &'static str,
    },
    InsertIfAbsent {
        marker: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Before the first `</head>`
    HeadClose,
    /// After the first `</h1>`
    AfterFirstH1,
    /// After the first `<div class="date">...</div>`
    AfterDateDiv,
    /// Before the last `</body>`, else before the last `</html>`
    DocumentEnd,
    Before(&'static str),
    After(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct BlockSpec {
    pub id: BlockId,
    pub policy: Policy,
    /// Tried in order; the first one found wins
    pub anchors: &'static [Anchor],
}

/// One row per block, in pipeline order. Row `i` describes the block whose
/// discriminant is `i`.
pub const BLOCK_TABLE: &[BlockSpec] = &[
    BlockSpec {
        id: BlockId::AdsenseLoader,
        policy: Policy::InsertIfAbsent {
            marker: "pagead/js/adsbygoogle.js",
        },
        anchors: &[Anchor::HeadClose],
    },
    BlockSpec {
        id: BlockId::BreadcrumbSchema,
        policy: Policy::StripAndReplace {
            start: BREADCRUMB_START,
            end: BREADCRUMB_END,
        },
        anchors: &[Anchor::HeadClose],
    },
    BlockSpec {
        id: BlockId::SeoBlock,
        policy: Policy::StripAndReplace {
            start: SEO_START,
            end: SEO_END,
        },
        anchors: &[Anchor::AfterDateDiv, Anchor::AfterFirstH1],
    },
    BlockSpec {
        id: BlockId::EngagementCss,
        policy: Policy::InsertIfAbsent {
            marker: "/* engagement-rail */",
        },
        anchors: &[Anchor::Before(STYLE_CLOSE)],
    },
    BlockSpec {
        id: BlockId::PolishCss,
        policy: Policy::InsertIfAbsent {
            marker: "--pro-space",
        },
        anchors: &[Anchor::Before(STYLE_CLOSE)],
    },
    BlockSpec {
        id: BlockId::NextRail,
        policy: Policy::InsertIfAbsent {
            marker: "id=\"next-rail\"",
        },
        anchors: &[Anchor::Before(HOLIDAY_CARD_OPEN)],
    },
    BlockSpec {
        id: BlockId::RelatedMid,
        policy: Policy::InsertIfAbsent {
            marker: "id=\"related-mid\"",
        },
        anchors: &[Anchor::Before(CELEBRATE_SECTION)],
    },
    BlockSpec {
        id: BlockId::ContinueLead,
        policy: Policy::InsertIfAbsent {
            marker: "class=\"continue-lead\"",
        },
        anchors: &[Anchor::After(CONTINUE_HEADING)],
    },
    BlockSpec {
        id: BlockId::EngagementScript,
        policy: Policy::InsertIfAbsent {
            marker: "attachEngagementTracking",
        },
        anchors: &[Anchor::Before(RECENTS_HOOK)],
    },
    BlockSpec {
        id: BlockId::AnalyticsScript,
        policy: Policy::InsertIfAbsent {
            marker: "initAdvancedEngagementTracking",
        },
        anchors: &[Anchor::Before(RECENTS_HOOK)],
    },
    BlockSpec {
        id: BlockId::DiscordNav,
        policy: Policy::InsertIfAbsent {
            marker: "/discord-bot/",
        },
        anchors: &[Anchor::After(NAV_HOLIDAYS_LINK)],
    },
    BlockSpec {
        id: BlockId::HolidayFooter,
        policy: Policy::StripAndReplace {
            start: FOOTER_START,
            end: FOOTER_END,
        },
        anchors: &[Anchor::DocumentEnd],
    },
];

impl BlockId {
    pub fn spec(self) -> &'static BlockSpec {
        &BLOCK_TABLE[self as usize]
    }

    pub fn all() -> impl Iterator<Item = BlockId> {
        BLOCK_TABLE.iter().map(|spec| spec.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Inserted,
    Replaced,
    Unchanged,
    AnchorMissing,
    /// A start comment with no matching end comment; the page is left alone
    Unterminated,
}

enum Insertion {
    Before(usize),
    After(usize),
}

fn locate(html: &str, anchor: &Anchor) -> Option<Insertion> {
    let lower = html.to_ascii_lowercase();
    match anchor {
        Anchor::HeadClose => lower.find("</head>").map(Insertion::Before),
        Anchor::AfterFirstH1 => lower.find("</h1>").map(|i| Insertion::After(i + "</h1>".len())),
        Anchor::AfterDateDiv => {
            let re = DATE_DIV.as_ref().ok()?;
            re.find(html).map(|m| Insertion::After(m.end()))
        }
        Anchor::DocumentEnd => lower
            .rfind("</body>")
            .or_else(|| lower.rfind("</html>"))
            .map(Insertion::Before),
        Anchor::Before(literal) => html.find(literal).map(Insertion::Before),
        Anchor::After(literal) => html.find(literal).map(|i| Insertion::After(i + literal.len())),
    }
}

fn insert_at_anchor(html: &str, anchors: &[Anchor], content: &str) -> (String, PatchOutcome) {
    let Some(insertion) = anchors.iter().find_map(|a| locate(html, a)) else {
        return (html.to_string(), PatchOutcome::AnchorMissing);
    };
    let out = match insertion {
        Insertion::Before(pos) => format!("{}{}\n{}", &html[..pos], content, &html[pos..]),
        Insertion::After(pos) => format!("{}\n{}{}", &html[..pos], content, &html[pos..]),
    };
    (out, PatchOutcome::Inserted)
}

/// Byte ranges of every `start ... end` region, or None if a start is unterminated
fn delimited_regions(html: &str, start: &str, end: &str) -> Option<Vec<(usize, usize)>> {
    let mut regions = Vec::new();
    let mut from = 0;
    while let Some(offset) = html[from..].find(start) {
        let region_start = from + offset;
        let body_start = region_start + start.len();
        let end_offset = html[body_start..].find(end)?;
        let region_end = body_start + end_offset + end.len();
        regions.push((region_start, region_end));
        from = region_end;
    }
    Some(regions)
}

pub fn wrap_delimited(start: &str, end: &str, content: &str) -> String {
    format!("{}\n{}\n{}", start, content, end)
}

/// Apply one block to a page according to its policy
pub fn apply_block(html: &str, block: BlockId, content: &str) -> (String, PatchOutcome) {
    let spec = block.spec();
    match spec.policy {
        Policy::InsertIfAbsent { marker } => {
            if html.contains(marker) {
                return (html.to_string(), PatchOutcome::Unchanged);
            }
            insert_at_anchor(html, spec.anchors, content)
        }
        Policy::StripAndReplace { start, end } => {
            let wrapped = wrap_delimited(start, end, content);
            let Some(regions) = delimited_regions(html, start, end) else {
                return (html.to_string(), PatchOutcome::Unterminated);
            };
            if regions.is_empty() {
                return insert_at_anchor(html, spec.anchors, &wrapped);
            }

            let mut out = String::with_capacity(html.len() + wrapped.len());
            let mut cursor = 0;
            for (i, (region_start, region_end)) in regions.iter().enumerate() {
                out.push_str(&html[cursor..*region_start]);
                if i == 0 {
                    out.push_str(&wrapped);
                }
                cursor = *region_end;
            }
            out.push_str(&html[cursor..]);

            if out == html {
                (out, PatchOutcome::Unchanged)
            } else {
                (out, PatchOutcome::Replaced)
            }
        }
    }
}

/// Supplies the content for each block; None skips the block for this page
pub trait BlockContent {
    fn content(&self, block: BlockId) -> Option<String>;
}

#[derive(Debug, Clone)]
pub struct PatchReport {
    pub html: String,
    /// The cleanup stage altered the page
    pub cleaned: bool,
    pub outcomes: Vec<(BlockId, PatchOutcome)>,
}

impl PatchReport {
    pub fn changed(&self) -> bool {
        self.cleaned
            || self
                .outcomes
                .iter()
                .any(|(_, o)| matches!(o, PatchOutcome::Inserted | PatchOutcome::Replaced))
    }

    pub fn problems(&self) -> impl Iterator<Item = &(BlockId, PatchOutcome)> {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, PatchOutcome::AnchorMissing | PatchOutcome::Unterminated))
    }
}

/// A fixed, ordered list of blocks applied to a page in one pass
#[derive(Debug, Clone)]
pub struct PatchPipeline {
    /// Run [`cleanup_page`] before any block
    cleanup: bool,
    blocks: Vec<BlockId>,
}

impl PatchPipeline {
    /// Blocks layered on top of a freshly rendered page. The renderer already
    /// emits its own ad loader, breadcrumb schema and footer.
    pub fn generated() -> Self {
        Self {
            cleanup: false,
            blocks: BlockId::all()
                .filter(|b| {
                    !matches!(
                        b,
                        BlockId::AdsenseLoader | BlockId::BreadcrumbSchema | BlockId::HolidayFooter
                    )
                })
                .collect(),
        }
    }

    /// Cleanup, then every block, for hand-built or older pages. Older pages
    /// may carry unterminated schema or footer regions after `</html>`.
    pub fn legacy() -> Self {
        Self {
            cleanup: true,
            blocks: BlockId::all().collect(),
        }
    }

    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    pub fn apply(&self, html: &str, content: &dyn BlockContent) -> PatchReport {
        let mut current = if self.cleanup {
            cleanup_page(html)
        } else {
            html.to_string()
        };
        let cleaned = current != html;
        let mut outcomes = Vec::with_capacity(self.blocks.len());
        for &block in &self.blocks {
            let Some(body) = content.content(block) else {
                continue;
            };
            let (next, outcome) = apply_block(&current, block, &body);
            current = next;
            outcomes.push((block, outcome));
        }
        PatchReport {
            html: current,
            cleaned,
            outcomes,
        }
    }
}

/// Move a holiday footer that sits outside `<body>` back inside it.
///
/// Older pages carry only the start comment with the footer running to the end
/// of the file; those are terminated with the end comment as they are moved.
pub fn relocate_footer(html: &str) -> String {
    let Some(start) = html.find(FOOTER_START) else {
        return html.to_string();
    };
    let lower = html.to_ascii_lowercase();
    let after_start = start + FOOTER_START.len();

    let (end, terminated) = match html[after_start..].find(FOOTER_END) {
        Some(offset) => (after_start + offset + FOOTER_END.len(), true),
        None => {
            let close = ["</body>", "</html>"]
                .iter()
                .filter_map(|tag| lower[after_start..].find(tag))
                .min()
                .map_or(html.len(), |offset| after_start + offset);
            (close, false)
        }
    };

    let inside_body = lower[end..].contains("</body>");
    if inside_body && terminated {
        return html.to_string();
    }

    let mut footer = html[start..end].trim_end().to_string();
    if !terminated {
        footer.push('\n');
        footer.push_str(FOOTER_END);
    }

    let without = format!("{}{}", html[..start].trim_end(), &html[end..]);
    let without = trim_after_html(&without);
    let lower = without.to_ascii_lowercase();
    match lower.rfind("</body>") {
        Some(pos) => format!(
            "{}\n{}\n{}",
            without[..pos].trim_end(),
            footer,
            &without[pos..]
        ),
        None => html.to_string(),
    }
}

pub fn remove_legacy_css(html: &str) -> String {
    let Ok(patterns) = LEGACY_CSS.as_ref() else {
        return html.to_string();
    };
    patterns.iter().fold(html.to_string(), |acc, re| {
        re.replace_all(&acc, "").into_owned()
    })
}

/// Drop everything after the final `</html>`, ending the file with one newline
pub fn trim_after_html(html: &str) -> String {
    match html.to_ascii_lowercase().rfind("</html>") {
        Some(pos) => format!("{}\n", &html[..pos + "</html>".len()]),
        None => html.to_string(),
    }
}

/// Remove breadcrumb regions that have a start comment but no end comment.
/// Such a region runs through the next `</script>`.
pub fn strip_unterminated_breadcrumb(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find(BREADCRUMB_START) {
        let body = &rest[start + BREADCRUMB_START.len()..];
        let next_start = body.find(BREADCRUMB_START).unwrap_or(body.len());
        if let Some(end) = body[..next_start].find(BREADCRUMB_END) {
            let region_end = start + BREADCRUMB_START.len() + end + BREADCRUMB_END.len();
            out.push_str(&rest[..region_end]);
            rest = &rest[region_end..];
            continue;
        }
        let removed = match body[..next_start].find("</script>") {
            Some(close) => BREADCRUMB_START.len() + close + "</script>".len(),
            None => BREADCRUMB_START.len(),
        };
        out.push_str(rest[..start].trim_end());
        rest = &rest[start + removed..];
    }
    out.push_str(rest);
    out
}

/// Stray breadcrumb removal, footer relocation, legacy CSS removal and
/// trailing-garbage trim
pub fn cleanup_page(html: &str) -> String {
    let html = strip_unterminated_breadcrumb(html);
    let html = relocate_footer(&html);
    let html = remove_legacy_css(&html);
    trim_after_html(&html)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "<!DOCTYPE html>\n<html>\n<head>\n  <title>Pi Day</title>\n  <style>\n    body {}\n  </style>\n</head>\n<body>\n  <nav class=\"nav-links\">\n      <a href=\"/holiday/\">Holidays</a>\n  </nav>\n  <h1>Pi Day</h1>\n  <div class=\"date\">March 14</div>\n  <script>\n      addRecent();\n  </script>\n</body>\n</html>\n";

    struct Fixed;

    impl BlockContent for Fixed {
        fn content(&self, block: BlockId) -> Option<String> {
            Some(match block {
                BlockId::AdsenseLoader => {
                    "<script async src=\"https://pagead2.googlesyndication.com/pagead/js/adsbygoogle.js\"></script>".to_string()
                }
                BlockId::EngagementCss => "    /* engagement-rail */".to_string(),
                BlockId::PolishCss => "    :root { --pro-space: 1px; }".to_string(),
                BlockId::NextRail => "<aside id=\"next-rail\"></aside>".to_string(),
                BlockId::RelatedMid => "<section id=\"related-mid\"></section>".to_string(),
                BlockId::ContinueLead => "<p class=\"continue-lead\">More</p>".to_string(),
                BlockId::EngagementScript => "      attachEngagementTracking();".to_string(),
                BlockId::AnalyticsScript => "      initAdvancedEngagementTracking();".to_string(),
                BlockId::DiscordNav => "      <a href=\"/discord-bot/\">Discord Bot</a>".to_string(),
                other => format!("<p>{:?} body</p>", other),
            })
        }
    }

    #[test]
    fn test_table_rows_match_discriminants() {
        for (i, spec) in BLOCK_TABLE.iter().enumerate() {
            assert_eq!(spec.id as usize, i, "{:?} is out of place", spec.id);
            assert!(!spec.anchors.is_empty());
        }
        assert_eq!(BlockId::all().count(), 12);
    }

    #[test]
    fn test_insert_if_absent_is_idempotent() {
        let (once, outcome) = apply_block(PAGE, BlockId::DiscordNav, "      <a href=\"/discord-bot/\">Discord Bot</a>");
        assert_eq!(outcome, PatchOutcome::Inserted);
        assert!(once.contains("Holidays</a>\n      <a href=\"/discord-bot/\">"));

        let (twice, outcome) = apply_block(&once, BlockId::DiscordNav, "anything");
        assert_eq!(outcome, PatchOutcome::Unchanged);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_head_close_is_case_insensitive() {
        let page = "<HTML><HEAD><TITLE>x</TITLE></HEAD><BODY></BODY></HTML>";
        let (out, outcome) = apply_block(page, BlockId::AdsenseLoader, "<script src=\"pagead/js/adsbygoogle.js\"></script>");
        assert_eq!(outcome, PatchOutcome::Inserted);
        assert!(out.contains("adsbygoogle.js\"></script>\n</HEAD>"));
    }

    #[test]
    fn test_seo_block_after_date_div() {
        let (out, outcome) = apply_block(PAGE, BlockId::SeoBlock, "<p>About Pi Day</p>");
        assert_eq!(outcome, PatchOutcome::Inserted);
        assert!(out.contains(
            "<div class=\"date\">March 14</div>\n<!-- START-SEO-BLOCK -->\n<p>About Pi Day</p>\n<!-- END-SEO-BLOCK -->"
        ));
    }

    #[test]
    fn test_seo_block_falls_back_to_h1() {
        let page = PAGE.replace("  <div class=\"date\">March 14</div>\n", "");
        let (out, outcome) = apply_block(&page, BlockId::SeoBlock, "<p>x</p>");
        assert_eq!(outcome, PatchOutcome::Inserted);
        assert!(out.contains("</h1>\n<!-- START-SEO-BLOCK -->"));
    }

    #[test]
    fn test_strip_and_replace_replaces_in_place_and_removes_copies() {
        let page = PAGE.replace(
            "</h1>",
            "</h1>\n<!-- START-SEO-BLOCK -->\nold one\n<!-- END-SEO-BLOCK -->\n<p>keep</p>\n<!-- START-SEO-BLOCK -->\nold two\n<!-- END-SEO-BLOCK -->",
        );
        let (out, outcome) = apply_block(&page, BlockId::SeoBlock, "fresh");
        assert_eq!(outcome, PatchOutcome::Replaced);
        assert_eq!(out.matches(SEO_START).count(), 1);
        assert!(out.contains("<!-- START-SEO-BLOCK -->\nfresh\n<!-- END-SEO-BLOCK -->\n<p>keep</p>"));
        assert!(!out.contains("old"));

        let (again, outcome) = apply_block(&out, BlockId::SeoBlock, "fresh");
        assert_eq!(outcome, PatchOutcome::Unchanged);
        assert_eq!(again, out);
    }

    #[test]
    fn test_unterminated_region_is_left_alone() {
        let page = PAGE.replace("</h1>", "</h1>\n<!-- START-SEO-BLOCK -->\nno end");
        let (out, outcome) = apply_block(&page, BlockId::SeoBlock, "fresh");
        assert_eq!(outcome, PatchOutcome::Unterminated);
        assert_eq!(out, page);
    }

    #[test]
    fn test_missing_anchor_is_soft() {
        let (out, outcome) = apply_block("<p>fragment</p>", BlockId::HolidayFooter, "footer");
        assert_eq!(outcome, PatchOutcome::AnchorMissing);
        assert_eq!(out, "<p>fragment</p>");
    }

    #[test]
    fn test_footer_goes_before_last_body() {
        let (out, _) = apply_block(PAGE, BlockId::HolidayFooter, "<hr>");
        assert!(out.ends_with("<!-- HOLIDAY-FOOTER -->\n<hr>\n<!-- /HOLIDAY-FOOTER -->\n</body>\n</html>\n"));
    }

    #[test]
    fn test_pipeline_applied_twice_is_noop() {
        let pipeline = PatchPipeline::legacy();
        let first = pipeline.apply(PAGE, &Fixed);
        assert!(first.changed());
        let problems: Vec<_> = first.problems().collect();
        // the bare fixture has no rail, celebrate or continue anchors
        assert_eq!(problems.len(), 3);

        let second = pipeline.apply(&first.html, &Fixed);
        assert!(!second.changed());
        assert_eq!(second.html, first.html);
    }

    #[test]
    fn test_generated_pipeline_skips_renderer_owned_blocks() {
        let blocks = PatchPipeline::generated();
        assert!(!blocks.blocks().contains(&BlockId::HolidayFooter));
        assert!(!blocks.blocks().contains(&BlockId::AdsenseLoader));
        assert!(blocks.blocks().contains(&BlockId::SeoBlock));
        assert!(blocks.blocks().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_trim_after_html() {
        assert_eq!(trim_after_html("<html></html>\n\ngarbage"), "<html></html>\n");
        assert_eq!(trim_after_html("<html></html>junk</HTML>tail"), "<html></html>junk</HTML>\n");
        assert_eq!(trim_after_html("no closing tag"), "no closing tag");
    }

    #[test]
    fn test_relocate_legacy_footer_after_html() {
        let page = "<html><body>\n<p>content</p>\n</body>\n</html>\n\n<!-- BREADCRUMB-SCHEMA -->\n<script></script>\n\n<!-- HOLIDAY-FOOTER -->\n<hr>\n<h3>More Fun Holidays</h3>\n";
        let out = cleanup_page(page);
        assert_eq!(
            out,
            "<html><body>\n<p>content</p>\n<!-- HOLIDAY-FOOTER -->\n<hr>\n<h3>More Fun Holidays</h3>\n<!-- /HOLIDAY-FOOTER -->\n</body>\n</html>\n"
        );
        assert_eq!(cleanup_page(&out), out);
    }

    #[test]
    fn test_strip_unterminated_breadcrumb() {
        let page = "<head>\n<!-- BREADCRUMB-SCHEMA -->\n<script>{}</script>\n</head>";
        assert_eq!(strip_unterminated_breadcrumb(page), "<head>\n</head>");

        let terminated = "<head>\n<!-- BREADCRUMB-SCHEMA -->\n<script>{}</script>\n<!-- /BREADCRUMB-SCHEMA -->\n</head>";
        assert_eq!(strip_unterminated_breadcrumb(terminated), terminated);
    }

    #[test]
    fn test_legacy_pipeline_repairs_original_format_page() {
        let page = format!(
            "{}\n<!-- BREADCRUMB-SCHEMA -->\n<script type=\"application/ld+json\">{{}}</script>\n<!-- HOLIDAY-FOOTER -->\n<hr>\n",
            PAGE.trim_end()
        );
        let pipeline = PatchPipeline::legacy();
        let report = pipeline.apply(&page, &Fixed);

        assert!(report
            .outcomes
            .iter()
            .all(|(_, o)| *o != PatchOutcome::Unterminated));
        let html = &report.html;
        assert_eq!(html.matches(BREADCRUMB_START).count(), 1);
        assert!(html.find(BREADCRUMB_START).unwrap() < html.find("</head>").unwrap());
        assert_eq!(html.matches(FOOTER_START).count(), 1);
        assert!(html.find(FOOTER_END).unwrap() < html.find("</body>").unwrap());
        assert!(html.ends_with("</html>\n"));

        let again = pipeline.apply(html, &Fixed);
        assert!(!again.changed());
    }

    #[test]
    fn test_footer_inside_body_stays() {
        let page = "<html><body>\n<!-- HOLIDAY-FOOTER -->\n<hr>\n<!-- /HOLIDAY-FOOTER -->\n</body>\n</html>\n";
        assert_eq!(relocate_footer(page), page);
    }

    #[test]
    fn test_remove_legacy_css() {
        let page = "<head><!-- STORE-BUTTONS-CSS-START --><style>a{}</style><!-- STORE-BUTTONS-CSS-END --><title>t</title><!-- brand-icon-css-start -->x<!-- BRAND-ICON-CSS-END --></head>";
        assert_eq!(remove_legacy_css(page), "<head><title>t</title></head>");
    }
}
