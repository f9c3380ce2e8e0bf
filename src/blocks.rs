//! Content of each patchable page block for one holiday

use crate::config::SiteConfig;
use crate::index::HolidayIndex;
use crate::links::Neighbors;
use crate::patch::{BlockContent, BlockId};
use crate::render::{breadcrumb_list, html_escape, json_ld_script};
use crate::types::HolidayRecord;

pub struct HolidayBlocks<'a> {
    config: &'a SiteConfig,
    index: &'a HolidayIndex,
    record: &'a HolidayRecord,
    neighbors: Option<Neighbors>,
}

impl<'a> HolidayBlocks<'a> {
    pub fn new(
        config: &'a SiteConfig,
        index: &'a HolidayIndex,
        record: &'a HolidayRecord,
        neighbors: Option<Neighbors>,
    ) -> Self {
        Self {
            config,
            index,
            record,
            neighbors,
        }
    }

    fn adsense_loader(&self) -> String {
        format!(
            r#"<script async src="https://pagead2.googlesyndication.com/pagead/js/adsbygoogle.js?client={}"
     crossorigin="anonymous"></script>"#,
            html_escape(&self.config.ads_client)
        )
    }

    fn breadcrumb_schema(&self) -> String {
        let canonical = self.config.holiday_url(&self.record.slug);
        json_ld_script(&breadcrumb_list(self.config, &self.record.name, &canonical))
    }

    fn seo_block(&self) -> String {
        let name = html_escape(&self.record.name);
        let pretty = html_escape(&self.record.pretty_date());
        let description = if self.record.description.trim().is_empty() {
            format!(
                "{} is one of the many fun, weird, and obscure holidays featured in the {} app.",
                name,
                html_escape(&self.config.site_name)
            )
        } else {
            html_escape(self.record.description.trim())
        };
        let fun_fact = match self.record.fun_facts.first() {
            Some(fact) => html_escape(fact),
            None => format!(
                "{} is part of the growing trend of fun social holidays people share online.",
                name
            ),
        };

        format!(
            r#"<!-- AdSense banner -->
<ins class="adsbygoogle"
     style="display:block"
     data-ad-client="{ads_client}"
     data-ad-slot="{ads_slot}"
     data-ad-format="auto"
     data-full-width-responsive="true"></ins>
<script>
     (adsbygoogle = window.adsbygoogle || []).push({{}});
</script>

<h2>What is {name}?</h2>
<p>{description}</p>

<h2>History of {name}</h2>
<p>{name} does not have a long formal history like major public holidays, but it has grown in popularity thanks to social media, blogs, and people who love celebrating the little things in life.</p>
<p>Like many modern national days, {name} is part of a larger movement of unofficial holidays that help people connect, share laughs, and create small traditions around specific dates on the calendar.</p>

<h2>How to Celebrate {name}</h2>
<ul>
    <li>Share a post about {name} on social media.</li>
    <li>Do a small themed activity related to the holiday.</li>
    <li>Talk about the holiday with friends, family, or coworkers.</li>
    <li>Use it as a fun icebreaker in class or at work.</li>
    <li>Look up other obscure holidays happening this week.</li>
</ul>

<h2>Fun Fact</h2>
<p>{fun_fact}</p>
<p><em>Want to see all the fun facts for this holiday and the other holidays today? Open the {site} app.</em></p>

<h2>{name} FAQ</h2>
<p><strong>When is {name}?</strong><br>{name} is observed each year on {pretty}.</p>

<p><strong>Is {name} an official national holiday?</strong><br>No. Like most obscure holidays, it is an informal observance that people celebrate for fun.</p>

<p><strong>How do people usually celebrate?</strong><br>Most people mark {name} by sharing themed posts, doing a small related activity, or simply using it as a lighthearted excuse to smile and connect.</p>

<p><strong>Where did {name} come from?</strong><br>The exact origin is a bit unclear, as is the case with many internet-era holidays, but it has spread through online calendars, blogs, and social media.</p>

{why_obscure}

{app_faq}"#,
            ads_client = html_escape(&self.config.ads_client),
            ads_slot = html_escape(&self.config.ads_slot),
            name = name,
            pretty = pretty,
            description = description,
            fun_fact = fun_fact,
            site = html_escape(&self.config.site_name),
            why_obscure = WHY_OBSCURE,
            app_faq = APP_FAQ,
        )
    }

    fn footer_link(&self, slug: &str) -> String {
        format!(
            r#"<a href="/holiday/{}/">{}</a>"#,
            html_escape(slug),
            html_escape(&self.index.title(slug))
        )
    }

    fn holiday_footer(&self, neighbors: &Neighbors) -> String {
        let popular: String = self
            .config
            .popular
            .iter()
            .map(|p| {
                format!(
                    "    <li><a href=\"/holiday/{}/\">{}</a></li>\n",
                    html_escape(&p.slug),
                    html_escape(&p.name)
                )
            })
            .collect();
        format!(
            "<hr>\n<h3>More Fun Holidays</h3>\n<ul>\n  <li>Yesterday: {}</li>\n  <li>Tomorrow: {}</li>\n  <li>Random Holiday: {}</li>\n  <li>Popular Holidays:</li>\n  <ul>\n{}  </ul>\n</ul>",
            self.footer_link(&neighbors.prev),
            self.footer_link(&neighbors.next),
            self.footer_link(&neighbors.random),
            popular
        )
    }
}

impl BlockContent for HolidayBlocks<'_> {
    fn content(&self, block: BlockId) -> Option<String> {
        let body = match block {
            BlockId::AdsenseLoader => self.adsense_loader(),
            BlockId::BreadcrumbSchema => self.breadcrumb_schema(),
            BlockId::SeoBlock => self.seo_block(),
            BlockId::EngagementCss => ENGAGEMENT_CSS.to_string(),
            BlockId::PolishCss => POLISH_CSS.to_string(),
            BlockId::NextRail => NEXT_RAIL.to_string(),
            BlockId::RelatedMid => format!("{}\n", RELATED_MID),
            BlockId::ContinueLead => CONTINUE_LEAD.to_string(),
            BlockId::EngagementScript => format!("{}\n", ENGAGEMENT_SCRIPT),
            BlockId::AnalyticsScript => format!("{}\n", ANALYTICS_SCRIPT),
            BlockId::DiscordNav => DISCORD_NAV.to_string(),
            BlockId::HolidayFooter => self.holiday_footer(self.neighbors.as_ref()?),
        };
        Some(body)
    }
}

const WHY_OBSCURE: &str = r#"<h2>Why Obscure Holiday Calendar?</h2>
<p>Obscure Holiday Calendar celebrates the fun, weird, and wonderfully obscure national days that make every single day worth sharing. Instead of only caring about the major holidays you already know, the app highlights the quirky celebrations you might otherwise miss, from food holidays like Bubble Tea Day to cultural favorites like Talk Like A Pirate Day and World Emoji Day.</p>

<h3>Perfect for:</h3>
<ul>
    <li>Creators looking for easy daily content ideas</li>
    <li>Teachers and classrooms celebrating themed days</li>
    <li>Parents doing fun daily themes with kids</li>
    <li>Food businesses wanting to post on food holidays</li>
    <li>Social media managers needing consistent content</li>
</ul>

<p>Whether you call them obscure holidays, weird holidays, national days, or just fun excuses to celebrate, Obscure Holiday Calendar makes it simple to see what holiday is today.</p>"#;

const APP_FAQ: &str = r#"<h2>Obscure Holiday Calendar App FAQ</h2>
<p><strong>Is Obscure Holiday Calendar free?</strong><br>Yes. The core daily holiday experience is completely free on both iOS and Android.</p>

<p><strong>Does it include real national days?</strong><br>Yes: food holidays, internet holidays, culture days, pet days, and obscure just-for-fun days.</p>

<p><strong>Can I share a holiday?</strong><br>Yes. Every holiday includes a deep link you can share with friends or followers.</p>

<p><strong>Does it support widgets?</strong><br>Yes. Widgets show today's holiday at a glance on iOS and Android.</p>"#;

const ENGAGEMENT_CSS: &str = r#"    /* engagement-rail */
    .next-rail {
      display: none;
    }
    .continue-lead {
      margin: 0 0 12px;
      color: #42526b;
      font-weight: 600;
      line-height: 1.5;
    }
    #related-mid .link-list li {
      background: linear-gradient(90deg, rgba(28,150,243,0.08), rgba(255,255,255,0.8));
      border-color: rgba(28,150,243,0.2);
    }
    @media (min-width: 1280px) {
      .next-rail {
        display: block;
        position: fixed;
        right: max(16px, calc((100vw - 1280px) / 2));
        top: 120px;
        width: 248px;
        border-radius: 16px;
        border: 1px solid #ded7ff;
        background: linear-gradient(180deg, #ffffff, #f6f3ff);
        box-shadow: 0 16px 34px rgba(44,0,95,0.18);
        padding: 14px;
        z-index: 160;
      }
      .next-rail-head {
        font-weight: 800;
        color: #2c005f;
        margin: 0 0 10px;
        font-size: 0.95rem;
      }
      .next-rail-list {
        list-style: none;
        margin: 0;
        padding: 0;
        display: grid;
        gap: 8px;
      }
      .next-rail-list a {
        display: block;
        border-radius: 10px;
        border: 1px solid #e8e2ff;
        background: #fff;
        color: #2c005f;
        text-decoration: none;
        font-weight: 700;
        padding: 9px 10px;
      }
      .next-rail-fallback {
        display: inline-block;
        margin-top: 10px;
        font-size: 0.86rem;
        font-weight: 700;
        color: #334155;
      }
    }"#;

const POLISH_CSS: &str = r#"    :root {
      --pro-space: clamp(18px, 2vw, 28px);
      --pro-border: #e6e8f3;
      --pro-ink: #172033;
      --pro-bg: #fbfbff;
    }
    .page-wrap {
      max-width: 1160px;
      padding-bottom: 64px;
    }
    .holiday-card {
      max-width: 980px;
      margin: 0 auto;
      padding: clamp(22px, 2.2vw, 36px);
      border: 1px solid var(--pro-border);
      box-shadow: 0 22px 56px rgba(20, 12, 70, 0.13);
    }
    .holiday-title {
      letter-spacing: -0.02em;
      text-wrap: balance;
    }
    .lead,
    .section p,
    .section li,
    .faq dd,
    .link-list .meta {
      color: var(--pro-ink);
      line-height: 1.72;
    }
    .section {
      padding: 14px 0;
      border-top: 1px solid rgba(44, 0, 95, 0.08);
    }
    .section h2 {
      letter-spacing: -0.01em;
      margin: 0 0 10px;
      font-size: clamp(1.25rem, 1.2vw + 1rem, 1.6rem);
    }
    .note-bar {
      border-left: 4px solid rgba(44, 0, 95, 0.42);
    }
    .ad-section {
      border-radius: 14px;
      border: 1px solid #e6e8f3;
      background: var(--pro-bg);
      padding: 12px;
      margin: 16px 0;
    }
    .link-list li:hover,
    .faq-item:hover {
      transform: translateY(-1px);
      border-color: #d6d9ea;
      box-shadow: 0 10px 24px rgba(17, 24, 39, 0.08);
    }
    @media (max-width: 900px) {
      .holiday-card {
        border-radius: 18px;
      }
      .section {
        padding: 12px 0;
      }
    }"#;

const NEXT_RAIL: &str = r#"    <aside class="next-rail" id="next-rail" aria-label="Keep browsing holidays">
      <div class="next-rail-head">Keep the streak going</div>
      <ul class="next-rail-list"></ul>
      <a class="next-rail-fallback" href="/holiday/">Browse all holidays</a>
    </aside>"#;

const RELATED_MID: &str = r#"      <section class="section" id="related-mid">
        <h2>People also viewed</h2>
        <ul class="link-list"></ul>
      </section>"#;

const CONTINUE_LEAD: &str = r#"        <p class="continue-lead">Open one more holiday before you go to build daily momentum.</p>"#;

const DISCORD_NAV: &str = r#"      <a href="/discord-bot/">Discord Bot</a>"#;

const ENGAGEMENT_SCRIPT: &str = r#"      const rail = document.getElementById('next-rail');

      function track(eventName, payload) {
        if (!window.gtag) return;
        try {
          gtag('event', eventName, payload || {});
        } catch (_) {}
      }

      function textLabel(el) {
        return ((el && el.textContent) || '').trim().slice(0, 80);
      }

      function buildRail() {
        if (!rail) return;
        const railList = rail.querySelector('.next-rail-list');
        if (!railList) return;
        const links = Array.from(document.querySelectorAll('#continue .link-list a')).slice(0, 4);
        if (!links.length) return;
        railList.textContent = '';
        links.forEach((a) => {
          const li = document.createElement('li');
          const link = document.createElement('a');
          link.href = a.getAttribute('href') || '/holiday/';
          link.textContent = textLabel(a);
          li.appendChild(link);
          railList.appendChild(li);
        });
      }

      function buildMidRelated() {
        const midList = document.querySelector('#related-mid .link-list');
        const related = Array.from(document.querySelectorAll('#related .link-list li')).slice(0, 4);
        if (!midList || !related.length) return;
        related.forEach((li) => midList.appendChild(li.cloneNode(true)));
      }

      function attachEngagementTracking() {
        document.addEventListener('click', (event) => {
          const anchor = event.target.closest('a');
          if (!anchor) return;
          const href = anchor.getAttribute('href') || '';
          const payload = { source_page: pageData.slug, link_text: textLabel(anchor), link_url: href };
          if (anchor.closest('#next-rail')) {
            track('rail_click', payload);
          } else if (anchor.closest('#continue')) {
            track('continue_click', payload);
          } else if (anchor.closest('#related') || anchor.closest('#related-mid')) {
            track('related_click', payload);
          } else if (anchor.closest('.quick-links')) {
            track('jump_link_click', payload);
          }
        }, { passive: true });
      }

      buildRail();
      buildMidRelated();
      attachEngagementTracking();"#;

const ANALYTICS_SCRIPT: &str = r#"      function initAdvancedEngagementTracking() {
        const once = new Set();

        function emit(name, payload) {
          if (!window.gtag) return;
          try {
            gtag('event', name, payload || {});
          } catch (_) {}
        }

        const milestones = [25, 50, 75, 100];
        function onScrollDepth() {
          const maxScroll = document.documentElement.scrollHeight - window.innerHeight;
          if (maxScroll <= 0) return;
          const pct = Math.round((window.scrollY / maxScroll) * 100);
          milestones.forEach((m) => {
            const key = 'scroll_' + m;
            if (pct >= m && !once.has(key)) {
              once.add(key);
              emit('scroll_depth', { source_page: pageData.slug, percent: m, page_type: 'holiday' });
            }
          });
        }

        let engagedSeconds = 0;
        let active = true;
        let lastTick = Date.now();
        let idleTimer = null;
        const engagedMilestones = [30, 90, 180];

        function resetIdle() {
          active = true;
          if (idleTimer) clearTimeout(idleTimer);
          idleTimer = setTimeout(() => { active = false; }, 15000);
        }

        ['scroll', 'click', 'keydown', 'touchstart', 'mousemove'].forEach((evt) => {
          window.addEventListener(evt, resetIdle, { passive: true });
        });
        document.addEventListener('visibilitychange', () => {
          if (document.hidden) active = false;
          else resetIdle();
        });

        setInterval(() => {
          const now = Date.now();
          const delta = (now - lastTick) / 1000;
          lastTick = now;
          if (document.hidden || !active) return;
          engagedSeconds += delta;
          engagedMilestones.forEach((m) => {
            const key = 'engaged_' + m;
            if (engagedSeconds >= m && !once.has(key)) {
              once.add(key);
              emit('engaged_time', { source_page: pageData.slug, seconds: m, page_type: 'holiday' });
            }
          });
        }, 1000);

        window.addEventListener('scroll', onScrollDepth, { passive: true });
        onScrollDepth();
        resetIdle();

        const adSections = document.querySelectorAll('.ad-section');
        if ('IntersectionObserver' in window && adSections.length) {
          const adIo = new IntersectionObserver((entries) => {
            entries.forEach((entry) => {
              if (!entry.isIntersecting) return;
              const adKey = entry.target.getAttribute('data-ad-key');
              if (!adKey || once.has(adKey)) return;
              once.add(adKey);
              emit('ad_viewable', { source_page: pageData.slug, ad_slot: adKey, page_type: 'holiday' });
            });
          }, { threshold: 0.45 });
          adSections.forEach((el, idx) => {
            el.setAttribute('data-ad-key', 'ad_slot_' + (idx + 1));
            adIo.observe(el);
          });
        }

        const shareBtnEl = document.getElementById('share-btn');
        const copyBtnEl = document.getElementById('copy-btn');
        if (shareBtnEl) {
          shareBtnEl.addEventListener('click', () => {
            emit('share_button_click', { source_page: pageData.slug, page_type: 'holiday' });
          });
        }
        if (copyBtnEl) {
          copyBtnEl.addEventListener('click', () => {
            emit('copy_link_click', { source_page: pageData.slug, page_type: 'holiday' });
          });
        }
      }

      initAdvancedEngagementTracking();"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{build_index, HolidayDatabase};
    use crate::links::CalendarLinks;
    use crate::patch::{PatchOutcome, PatchPipeline, FOOTER_END, FOOTER_START};
    use crate::render::PageRenderer;
    use chrono::NaiveDate;
    use serde_json::json;

    fn sample_index() -> HolidayIndex {
        let db = HolidayDatabase::from_value(json!({"holidays": {
            "03-14": [{"name": "Pi Day", "description": "Celebrate the constant.", "funFacts": ["3.14159"]}],
            "03-15": [{"name": "Ides <of> March"}],
            "04-01": [{"name": "Fools Day"}]
        }}))
        .unwrap();
        build_index(&db)
    }

    const LEGACY_PAGE: &str = "<!DOCTYPE html>\n<html>\n<head>\n  <title>Pi Day</title>\n  <style>\n    body {}\n  </style>\n</head>\n<body>\n  <nav class=\"nav-links\">\n      <a href=\"/holiday/\">Holidays</a>\n  </nav>\n  <h1>Pi Day</h1>\n  <div class=\"date\">March 14</div>\n</body>\n</html>\n";

    #[test]
    fn test_every_block_has_its_marker() {
        let index = sample_index();
        let config = SiteConfig::default();
        let links = CalendarLinks::new(&index, &config.popular);
        let record = index.get("pi-day").unwrap();
        let blocks = HolidayBlocks::new(&config, &index, record, links.neighbors("pi-day"));

        for block in BlockId::all() {
            let body = blocks.content(block).unwrap();
            if let crate::patch::Policy::InsertIfAbsent { marker } = block.spec().policy {
                assert!(body.contains(marker), "{:?} lacks its marker", block);
            }
        }
    }

    #[test]
    fn test_seo_block_escapes_and_falls_back() {
        let index = sample_index();
        let config = SiteConfig::default();
        let record = index.get("ides-of-march").unwrap();
        let blocks = HolidayBlocks::new(&config, &index, record, None);
        let seo = blocks.content(BlockId::SeoBlock).unwrap();
        assert!(seo.contains("<h2>What is Ides &lt;of&gt; March?</h2>"));
        assert!(seo.contains("featured in the Obscure Holiday Calendar app."));
        assert!(seo.contains("growing trend of fun social holidays"));
        assert!(seo.contains("observed each year on March 15."));
        assert!(seo.contains("data-ad-slot=\"7747026448\""));
    }

    #[test]
    fn test_footer_needs_neighbors() {
        let index = sample_index();
        let config = SiteConfig::default();
        let record = index.get("pi-day").unwrap();
        let blocks = HolidayBlocks::new(&config, &index, record, None);
        assert!(blocks.content(BlockId::HolidayFooter).is_none());

        let links = CalendarLinks::new(&index, &config.popular);
        let blocks = HolidayBlocks::new(&config, &index, record, links.neighbors("pi-day"));
        let footer = blocks.content(BlockId::HolidayFooter).unwrap();
        assert!(footer.contains("Yesterday: <a href=\"/holiday/fools-day/\">Fools Day</a>"));
        assert!(footer.contains("Tomorrow: <a href=\"/holiday/ides-of-march/\">Ides &lt;of&gt; March</a>"));
        assert!(footer.contains("<a href=\"/holiday/pi-day/\">Pi Day</a>"));
    }

    #[test]
    fn test_legacy_pipeline_upgrades_old_page() {
        let index = sample_index();
        let config = SiteConfig::default();
        let links = CalendarLinks::new(&index, &config.popular);
        let record = index.get("pi-day").unwrap();
        let blocks = HolidayBlocks::new(&config, &index, record, links.neighbors("pi-day"));

        let pipeline = PatchPipeline::legacy();
        let first = pipeline.apply(LEGACY_PAGE, &blocks);
        assert!(first.changed());
        let html = &first.html;
        assert!(html.contains("pagead/js/adsbygoogle.js"));
        assert!(html.contains("\"@type\": \"BreadcrumbList\""));
        assert!(html.contains("<a href=\"/holiday/\">Holidays</a>\n      <a href=\"/discord-bot/\">Discord Bot</a>"));
        let footer_at = html.find(FOOTER_START).unwrap();
        assert!(footer_at < html.find("</body>").unwrap());
        assert!(html.contains(FOOTER_END));

        let second = pipeline.apply(html, &blocks);
        assert!(!second.changed());
        assert_eq!(&second.html, html);
    }

    #[test]
    fn test_generated_pipeline_finds_every_anchor() {
        let index = sample_index();
        let config = SiteConfig::default();
        let links = CalendarLinks::new(&index, &config.popular);
        let record = index.get("pi-day").unwrap();
        let neighbors = links.neighbors("pi-day").unwrap();
        let renderer = PageRenderer::new(&config, &index, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let page = renderer.render(record, &neighbors, None);

        let blocks = HolidayBlocks::new(&config, &index, record, Some(neighbors));
        let pipeline = PatchPipeline::generated();
        let report = pipeline.apply(&page, &blocks);
        assert_eq!(report.problems().count(), 0);
        assert!(report
            .outcomes
            .iter()
            .all(|(_, o)| *o == PatchOutcome::Inserted));

        let again = pipeline.apply(&report.html, &blocks);
        assert!(!again.changed());
        assert_eq!(again.html, report.html);
        assert!(again.html.contains("<aside class=\"next-rail\""));
        assert!(again.html.find("id=\"related-mid\"").unwrap() < again.html.find("id=\"celebrate\"").unwrap());
    }
}
