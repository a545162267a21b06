use regex::Regex;
use shelf_models::{Entry, MemberRating};
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::debug;

use crate::error::FeedError;
use crate::parser::RawItem;

/// Literal the feed uses for true in `rewatch` / `memberLike`
const AFFIRMATIVE: &str = "Yes";

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern}: {e}")))
}

fn loggable_title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^\w+.*,\s*\d{4}")
}

fn title_year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^(.+?),\s*(\d{4})\b")
}

fn title_stars_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"\s-\s([★½]+)\s*$")
}

fn img_src_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r#"(?i)<img[^>]+src=["']([^"']+)["']"#)
}

fn img_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)<img[^>]*>")
}

fn paragraph_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?is)<p(?:\s[^>]*)?>(.*?)</p>")
}

fn any_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"<[^>]+>")
}

/// Diary/review items carry a film title field, or at least a
/// "Name, 1999" shaped title. Lists and other pages do not.
pub fn is_loggable(item: &RawItem) -> bool {
    let has_film_title = item.film_title.as_deref().is_some_and(|t| !t.is_empty());
    has_film_title || item.title.as_deref().is_some_and(|t| loggable_title_re().is_match(t))
}

/// Split "Film, 2023 - ★★★" into ("Film", 2023). Without a year suffix the
/// input comes back unchanged with year 0.
pub fn split_title_year(title: &str) -> (String, u32) {
    match title_year_re().captures(title) {
        Some(caps) => {
            let name = caps.get(1).map_or(title, |m| m.as_str()).trim().to_string();
            let year = caps.get(2).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
            (name, year)
        }
        None => (title.to_string(), 0),
    }
}

/// Star glyph suffix of a generic title (" - ★★★½"), unrated if absent.
pub fn rating_from_title(title: &str) -> MemberRating {
    let Some(caps) = title_stars_re().captures(title) else {
        return MemberRating::UNRATED;
    };
    let glyphs = caps.get(1).map_or("", |m| m.as_str());
    let stars: f32 = glyphs
        .chars()
        .map(|c| if c == '½' { 0.5 } else { 1.0 })
        .sum();
    MemberRating::from_stars(stars)
}

/// `src` of the first `<img>` in the description, empty if there is none.
pub fn extract_poster_url(html: &str) -> String {
    img_src_re()
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Paragraph texts joined by blank lines; the whole stripped body when
/// the description has no paragraphs.
pub fn extract_review_text(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let without_img = img_tag_re().replace_all(html, "");

    let mut saw_paragraph = false;
    let paragraphs: Vec<String> = paragraph_re()
        .captures_iter(&without_img)
        .inspect(|_| saw_paragraph = true)
        .filter_map(|caps| caps.get(1))
        .map(|m| strip_tags(m.as_str()))
        .filter(|text| !text.is_empty())
        .collect();

    if saw_paragraph {
        return paragraphs.join("\n\n");
    }

    strip_tags(&without_img)
}

fn strip_tags(html: &str) -> String {
    decode_entities(any_tag_re().replace_all(html, "").trim())
        .trim()
        .to_string()
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

pub fn parse_flag(value: Option<&str>) -> bool {
    value == Some(AFFIRMATIVE)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Build an entry from a loggable item. Structured fields win over
/// anything pattern-matched out of the generic title.
pub fn normalize_item(item: &RawItem) -> Entry {
    let generic_title = item.title.as_deref().unwrap_or("");
    let (title_from_generic, year_from_generic) = split_title_year(generic_title);

    let title = non_empty(item.film_title.as_deref())
        .map(str::to_string)
        .unwrap_or(title_from_generic);

    let year = non_empty(item.film_year.as_deref())
        .and_then(|y| y.parse::<u32>().ok())
        .filter(|y| *y > 0)
        .unwrap_or(year_from_generic);

    let rating = non_empty(item.member_rating.as_deref())
        .and_then(|r| r.parse::<f32>().ok())
        .map(MemberRating::from_stars)
        .filter(|r| r.is_rated())
        .unwrap_or_else(|| rating_from_title(generic_title));

    let html = item.html();
    let link = non_empty(item.link.as_deref()).unwrap_or("").to_string();

    let id = non_empty(item.guid.as_deref())
        .map(str::to_string)
        .or_else(|| (!link.is_empty()).then(|| link.clone()))
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    Entry {
        id,
        title,
        year,
        rating,
        poster_url: extract_poster_url(html),
        review: extract_review_text(html),
        watched_date: non_empty(item.watched_date.as_deref()).unwrap_or("").to_string(),
        link,
        is_rewatch: parse_flag(item.rewatch.as_deref()),
        is_liked: parse_flag(item.member_like.as_deref()),
    }
}

/// Filter and normalize a parsed feed. Feed order is kept; a duplicate id
/// gets the lowest `#n` suffix (n >= 2) not already in use. No loggable
/// items at all is `NoEntries`.
pub fn normalize_items(items: &[RawItem]) -> Result<Vec<Entry>, FeedError> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut entries = Vec::with_capacity(items.len());

    for item in items {
        if !is_loggable(item) {
            debug!(title = ?item.title, "Skipping non-diary item");
            continue;
        }

        let mut entry = normalize_item(item);
        if taken.contains(&entry.id) {
            debug!(id = %entry.id, "Duplicate entry id in feed");
            let mut n = 2;
            while taken.contains(&format!("{}#{}", entry.id, n)) {
                n += 1;
            }
            entry.id = format!("{}#{}", entry.id, n);
        }
        taken.insert(entry.id.clone());
        entries.push(entry);
    }

    if entries.is_empty() {
        return Err(FeedError::NoEntries);
    }

    debug!(kept = entries.len(), skipped = items.len() - entries.len(), "Normalized feed");
    Ok(entries)
}
