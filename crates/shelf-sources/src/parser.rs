use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use crate::error::FeedError;

/// Fields of one `<item>` as they appear in the feed, before normalization.
///
/// Vendor fields (`letterboxd:filmTitle` etc.) are matched on their local
/// name, so feeds that drop the namespace prefix parse the same.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub guid: Option<String>,
    pub description: Option<String>,
    pub encoded_content: Option<String>,
    pub film_title: Option<String>,
    pub film_year: Option<String>,
    pub member_rating: Option<String>,
    pub watched_date: Option<String>,
    pub rewatch: Option<String>,
    pub member_like: Option<String>,
}

impl RawItem {
    fn slot(&mut self, local_name: &[u8]) -> Option<&mut Option<String>> {
        let slot = match local_name {
            b"title" => &mut self.title,
            b"link" => &mut self.link,
            b"guid" => &mut self.guid,
            b"description" => &mut self.description,
            b"encoded" => &mut self.encoded_content,
            b"filmTitle" => &mut self.film_title,
            b"filmYear" => &mut self.film_year,
            b"memberRating" => &mut self.member_rating,
            b"watchedDate" => &mut self.watched_date,
            b"rewatch" => &mut self.rewatch,
            b"memberLike" => &mut self.member_like,
            _ => return None,
        };
        Some(slot)
    }

    /// HTML body of the entry: `description`, else `content:encoded`.
    pub fn html(&self) -> &str {
        self.description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .or(self.encoded_content.as_deref())
            .unwrap_or("")
    }
}

/// Parse an RSS document into its items, in document order.
///
/// Malformed XML, or a document that is not rooted at `<rss>`, is an
/// invalid feed.
pub fn parse_feed(xml: &str) -> Result<Vec<RawItem>, FeedError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut items = Vec::new();
    let mut depth: usize = 0;
    let mut saw_root = false;
    // (item depth, item being built)
    let mut current: Option<(usize, RawItem)> = None;
    // Local name of the item child whose text is being collected
    let mut field: Option<Vec<u8>> = None;
    let mut text = String::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| FeedError::InvalidFeed(format!("at byte {}: {}", reader.buffer_position(), e)))?;

        match event {
            Event::Start(e) => {
                depth += 1;
                let local = e.local_name();
                let local = local.as_ref();

                if !saw_root {
                    if local != b"rss" {
                        return Err(FeedError::InvalidFeed(format!(
                            "unexpected root element <{}>",
                            String::from_utf8_lossy(local)
                        )));
                    }
                    saw_root = true;
                    continue;
                }

                match current.as_ref().map(|(d, _)| *d) {
                    None if local == b"item" => current = Some((depth, RawItem::default())),
                    Some(item_depth) if depth == item_depth + 1 => {
                        field = Some(local.to_vec());
                        text.clear();
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => {
                if !saw_root {
                    let local = e.local_name();
                    if local.as_ref() == b"rss" {
                        // <rss/>: valid, just empty
                        saw_root = true;
                        continue;
                    }
                    return Err(FeedError::InvalidFeed(format!(
                        "unexpected root element <{}/>",
                        String::from_utf8_lossy(local.as_ref())
                    )));
                }
            }
            Event::Text(t) => {
                if field.is_some() {
                    match t.unescape_with(html_entity) {
                        Ok(unescaped) => text.push_str(&unescaped),
                        Err(_) => text.push_str(&unescape_lenient(&String::from_utf8_lossy(&t))),
                    }
                }
            }
            Event::CData(c) => {
                if field.is_some() {
                    text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(e) => {
                let local = e.local_name();
                let local = local.as_ref();

                let item_depth = current.as_ref().map(|(d, _)| *d);
                match item_depth {
                    Some(d) if depth == d + 1 => {
                        if let (Some(name), Some((_, item))) = (field.take(), current.as_mut()) {
                            if let Some(slot) = item.slot(&name) {
                                *slot = Some(std::mem::take(&mut text).trim().to_string());
                            }
                        }
                    }
                    Some(d) if depth == d && local == b"item" => {
                        if let Some((_, item)) = current.take() {
                            items.push(item);
                        }
                    }
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(FeedError::InvalidFeed("document has no root element".to_string()));
    }
    if depth != 0 {
        return Err(FeedError::InvalidFeed("document ended inside an element".to_string()));
    }

    debug!(items = items.len(), "Parsed feed items");
    Ok(items)
}

/// HTML entities that show up unescaped in feed bodies.
fn html_entity(name: &str) -> Option<&'static str> {
    match name {
        "nbsp" => Some("\u{a0}"),
        "hellip" => Some("\u{2026}"),
        "mdash" => Some("\u{2014}"),
        "ndash" => Some("\u{2013}"),
        "lsquo" => Some("\u{2018}"),
        "rsquo" => Some("\u{2019}"),
        "ldquo" => Some("\u{201c}"),
        "rdquo" => Some("\u{201d}"),
        _ => None,
    }
}

/// Decode the XML entities and character references in `raw`, leaving any
/// other `&name;` as written.
fn unescape_lenient(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let decoded = tail.find(';').and_then(|end| {
            let name = &tail[1..end];
            let ch = match name {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => html_entity(name).and_then(|s| s.chars().next()).or_else(|| {
                    let code = match name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => name.strip_prefix('#').and_then(|dec| dec.parse().ok()),
                    };
                    code.and_then(char::from_u32)
                }),
            };
            ch.map(|c| (c, end))
        });

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
pub(crate) mod tests;
