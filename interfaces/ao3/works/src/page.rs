use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)<h2\s+class="title heading"[^>]*>(.*?)</h2>"#).unwrap());
static STATS_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)<dl\s+class="stats"[^>]*>(.*?)</dl>"#).unwrap());
static STAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)<dd\s+class="([a-z]+)"[^>]*>(.*?)</dd>"#).unwrap());
static ERROR_404: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)<h2\s+class="heading"[^>]*>\s*Error 404\s*</h2>"#).unwrap());
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap());
static SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Text of the fields shown in a work's header, tags stripped.
///
/// AO3 leaves out the kudos, bookmarks, comments and hits entries when the
/// count is zero, so those come back as `None` on quiet works.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkPage {
    pub title: Option<String>,
    pub chapters: Option<String>,
    pub words: Option<String>,
    pub kudos: Option<String>,
    pub bookmarks: Option<String>,
    pub hits: Option<String>,
    pub comments: Option<String>,
}

pub fn parse_work_page(html: &str) -> WorkPage {
    let mut page = WorkPage {
        title: TITLE
            .captures(html)
            .map(|caps| clean_text(&caps[1]))
            .filter(|title| !title.is_empty()),
        ..WorkPage::default()
    };

    let stats = STATS_BLOCK
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|block| block.as_str())
        .unwrap_or(html);

    for caps in STAT.captures_iter(stats) {
        let value = Some(clean_text(&caps[2])).filter(|value| !value.is_empty());
        let slot = match &caps[1] {
            "chapters" => &mut page.chapters,
            "words" => &mut page.words,
            "kudos" => &mut page.kudos,
            "bookmarks" => &mut page.bookmarks,
            "hits" => &mut page.hits,
            "comments" => &mut page.comments,
            _ => continue,
        };
        if slot.is_none() {
            *slot = value;
        }
    }

    page
}

/// The archive serves its "Error 404" page with a 200 status in some paths.
pub fn is_not_found_page(html: &str) -> bool {
    ERROR_404.is_match(html)
}

/// Parses a displayed count such as `12,345` or the `10/?` chapter notation.
pub fn parse_count(raw: &str) -> Option<u64> {
    let head = raw.split('/').next()?;
    let digits: String = head
        .chars()
        .filter(|c| !matches!(c, ',' | ' ' | '\u{a0}'))
        .collect();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn clean_text(fragment: &str) -> String {
    let stripped = TAG.replace_all(fragment, "");
    let decoded = decode_entities(&stripped);
    SPACE.replace_all(decoded.trim(), " ").into_owned()
}

fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| {
            let name = &caps[1];
            let decoded = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ if name.starts_with("#x") || name.starts_with("#X") => {
                    u32::from_str_radix(&name[2..], 16).ok().and_then(char::from_u32)
                }
                _ if name.starts_with('#') => name[1..].parse().ok().and_then(char::from_u32),
                _ => None,
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORK_HTML: &str = r#"
        <dl class="work meta group">
          <dt class="rating tags">Rating:</dt>
          <dd class="rating tags"><ul><li>General Audiences</li></ul></dd>
          <dt class="stats">Stats:</dt>
          <dd class="stats">
            <dl class="stats">
              <dt class="published">Published:</dt><dd class="published">2024-01-01</dd>
              <dt class="words">Words:</dt><dd class="words">50,000</dd>
              <dt class="chapters">Chapters:</dt><dd class="chapters"><a href="/works/1/chapters/2">10</a>/?</dd>
              <dt class="comments">Comments:</dt><dd class="comments">20</dd>
              <dt class="kudos">Kudos:</dt><dd class="kudos">500</dd>
              <dt class="bookmarks">Bookmarks:</dt><dd class="bookmarks"><a href="/works/1/bookmarks">50</a></dd>
              <dt class="hits">Hits:</dt><dd class="hits">5,000</dd>
            </dl>
          </dd>
        </dl>
        <div id="workskin">
          <div class="preface group">
            <h2 class="title heading">
              Tea &amp; Sympathy &#8212; Part&#x20;One
            </h2>
          </div>
        </div>
    "#;

    #[test]
    fn extracts_title_and_stats() {
        let page = parse_work_page(WORK_HTML);
        assert_eq!(page.title.as_deref(), Some("Tea & Sympathy \u{2014} Part One"));
        assert_eq!(page.words.as_deref(), Some("50,000"));
        assert_eq!(page.chapters.as_deref(), Some("10/?"));
        assert_eq!(page.comments.as_deref(), Some("20"));
        assert_eq!(page.kudos.as_deref(), Some("500"));
        assert_eq!(page.bookmarks.as_deref(), Some("50"));
        assert_eq!(page.hits.as_deref(), Some("5,000"));
    }

    #[test]
    fn missing_engagement_blocks_stay_empty() {
        let html = r#"
            <h2 class="title heading">Quiet</h2>
            <dl class="stats"><dd class="words">1,200</dd><dd class="chapters">1/1</dd></dl>
        "#;
        let page = parse_work_page(html);
        assert_eq!(page.title.as_deref(), Some("Quiet"));
        assert_eq!(page.kudos, None);
        assert_eq!(page.bookmarks, None);
        assert_eq!(page.comments, None);
        assert_eq!(page.hits, None);
    }

    #[test]
    fn parses_display_counts() {
        assert_eq!(parse_count("50,000"), Some(50_000));
        assert_eq!(parse_count("10/?"), Some(10));
        assert_eq!(parse_count("3/12"), Some(3));
        assert_eq!(parse_count("0"), Some(0));
        assert_eq!(parse_count(""), None);
        assert_eq!(parse_count("-4"), None);
        assert_eq!(parse_count("lots"), None);
    }

    #[test]
    fn recognises_error_page() {
        assert!(is_not_found_page(r#"<h2 class="heading">Error 404</h2>"#));
        assert!(!is_not_found_page(WORK_HTML));
    }
}
