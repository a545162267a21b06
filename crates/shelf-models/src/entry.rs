use serde::{Deserialize, Serialize};
use crate::rating::MemberRating;

/// One diary/review item from a member's feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    pub id: String, // guid, else link, else generated
    pub title: String,
    pub year: u32, // 0 when unknown
    pub rating: MemberRating,
    #[serde(default)]
    pub poster_url: String,
    #[serde(default)]
    pub review: String,
    pub watched_date: String, // Raw upstream value, e.g. "2024-01-31"
    pub link: String,
    pub is_rewatch: bool,
    pub is_liked: bool,
}

impl Entry {
    pub fn has_poster(&self) -> bool {
        !self.poster_url.is_empty()
    }

    pub fn has_review(&self) -> bool {
        !self.review.is_empty()
    }

    /// "Title (Year)", or just the title when the year is unknown.
    pub fn display_title(&self) -> String {
        if self.year > 0 {
            format!("{} ({})", self.title, self.year)
        } else {
            self.title.clone()
        }
    }
}

/// Entries in upstream feed order (newest first).
pub type Collection = Vec<Entry>;

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(year: u32) -> Entry {
        Entry {
            id: "https://letterboxd.com/someone/film/heat/".to_string(),
            title: "Heat".to_string(),
            year,
            rating: MemberRating::from_stars(4.5),
            poster_url: String::new(),
            review: String::new(),
            watched_date: "2024-03-02".to_string(),
            link: "https://letterboxd.com/someone/film/heat/".to_string(),
            is_rewatch: false,
            is_liked: true,
        }
    }

    #[test]
    fn test_display_title() {
        assert_eq!(entry(1995).display_title(), "Heat (1995)");
        assert_eq!(entry(0).display_title(), "Heat");
    }

    #[test]
    fn test_missing_poster_and_review_is_valid() {
        let e = entry(1995);
        assert!(!e.has_poster());
        assert!(!e.has_review());
    }

    #[test]
    fn test_entry_json_shape() {
        let json = serde_json::to_value(entry(1995)).unwrap();
        assert_eq!(json["rating"], serde_json::json!(4.5));
        assert_eq!(json["year"], serde_json::json!(1995));

        let back: Entry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry(1995));
    }
}
