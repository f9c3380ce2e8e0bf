//! SVG badge shown at the top of each holiday page

use sha2::{Digest, Sha256};

use crate::render::html_escape;

const LINE_WIDTH: usize = 18;
const MERGED_WIDTH: usize = 28;
const FONT_STACK: &str = "Inter, Manrope, system-ui, sans-serif";

/// Gradient start/end colors derived from the slug
pub fn badge_colors(slug: &str) -> (String, String) {
    let digest = format!("{:x}", Sha256::digest(slug.as_bytes()));
    (format!("#{}", &digest[..6]), format!("#{}", &digest[6..12]))
}

/// Wrap a name onto at most two lines.
///
/// Names needing three or more lines collapse to one truncated line
/// followed by a generic second line.
pub fn wrap_badge_text(name: &str) -> Vec<String> {
    let clean = name.trim();
    if clean.chars().count() <= LINE_WIDTH {
        return vec![clean.to_string()];
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in clean.split_whitespace() {
        let candidate_len = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if candidate_len <= LINE_WIDTH {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        } else {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    if lines.len() > 2 {
        let mut merged = lines[..2].join(" ");
        if merged.chars().count() > MERGED_WIDTH {
            merged = merged.chars().take(MERGED_WIDTH - 1).collect();
            merged.push('…');
        }
        return vec![merged, "Obscure Holiday".to_string()];
    }
    lines
}

pub fn build_badge_svg(name: &str, slug: &str) -> String {
    let (start, end) = badge_colors(slug);
    let lines = wrap_badge_text(name);
    let (font_size, y_start) = if lines.len() == 1 { (20, 56) } else { (16, 48) };

    let tspans: String = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            format!(
                r##"<tspan x="50%" y="{}" fill="#ffffff" font-family="{}" font-size="{}" font-weight="700" text-anchor="middle">{}</tspan>"##,
                y_start + i * 22,
                FONT_STACK,
                font_size,
                html_escape(line)
            )
        })
        .collect();

    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="240" height="120" viewBox="0 0 240 120" role="img" aria-label="{label}">
  <defs>
    <linearGradient id="grad-{slug}" x1="0%" y1="0%" x2="100%" y2="100%">
      <stop offset="0%" stop-color="{start}"/>
      <stop offset="100%" stop-color="{end}"/>
    </linearGradient>
  </defs>
  <rect rx="16" ry="16" width="240" height="120" fill="url(#grad-{slug})"/>
  <text>
    {tspans}
  </text>
  <text x="50%" y="90%" fill="#f1f5f9" font-family="{font}" font-size="11" font-weight="600" text-anchor="middle">Obscure Holiday Calendar</text>
</svg>
"##,
        label = html_escape(name),
        slug = html_escape(slug),
        start = start,
        end = end,
        tspans = tspans,
        font = FONT_STACK,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_colors_are_stable_hex() {
        let (a, b) = badge_colors("pi-day");
        assert_eq!(badge_colors("pi-day"), (a.clone(), b.clone()));
        assert_eq!(a.len(), 7);
        assert!(a.starts_with('#'));
        assert!(a[1..].chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(badge_colors("pi-day"), badge_colors("cat-day"));
    }

    #[test]
    fn test_wrap_short_name() {
        assert_eq!(wrap_badge_text("  Pi Day "), vec!["Pi Day"]);
    }

    #[test]
    fn test_wrap_two_lines() {
        assert_eq!(
            wrap_badge_text("National Chocolate Cake Day"),
            vec!["National Chocolate", "Cake Day"]
        );
    }

    #[test]
    fn test_wrap_long_name_collapses() {
        let lines = wrap_badge_text("International Talk Like A Pirate Appreciation Day");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "Obscure Holiday");
        assert_eq!(lines[0].chars().count(), 28);
        assert!(lines[0].ends_with('…'));
    }

    #[test]
    fn test_svg_escapes_name() {
        let svg = build_badge_svg("Salt & <Pepper> Day", "salt-and-pepper-day");
        assert!(svg.contains("Salt &amp; &lt;Pepper&gt; Day"));
        assert!(svg.contains(r#"id="grad-salt-and-pepper-day""#));
        assert!(!svg.contains("<Pepper>"));
    }
}
