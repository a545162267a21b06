use serde::{Deserialize, Serialize};

/// Member rating in half-star steps, 0 to 5 stars (0 = unrated).
///
/// Stored as a half-star count so equality is exact; serialized as a
/// float number of stars, which is the shape the feed itself uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "f32", from = "f32")]
pub struct MemberRating(u8);

impl MemberRating {
    pub const MAX_HALF_STARS: u8 = 10;

    pub const UNRATED: MemberRating = MemberRating(0);

    /// Clamp to [0, 5] and round to the nearest half star. NaN is unrated.
    pub fn from_stars(stars: f32) -> Self {
        if stars.is_nan() {
            return Self::UNRATED;
        }
        let halves = (stars.clamp(0.0, 5.0) * 2.0).round() as u8;
        Self(halves.min(Self::MAX_HALF_STARS))
    }

    pub fn half_stars(self) -> u8 {
        self.0
    }

    pub fn stars(self) -> f32 {
        f32::from(self.0) / 2.0
    }

    pub fn is_rated(self) -> bool {
        self.0 > 0
    }

    /// "★★★½" style glyphs, empty when unrated.
    pub fn glyphs(self) -> String {
        let mut out = "★".repeat(usize::from(self.0 / 2));
        if self.0 % 2 == 1 {
            out.push('½');
        }
        out
    }
}

impl From<f32> for MemberRating {
    fn from(stars: f32) -> Self {
        Self::from_stars(stars)
    }
}

impl From<MemberRating> for f32 {
    fn from(rating: MemberRating) -> Self {
        rating.stars()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamps_and_rounds() {
        assert_eq!(MemberRating::from_stars(3.5).half_stars(), 7);
        assert_eq!(MemberRating::from_stars(3.74).half_stars(), 7);
        assert_eq!(MemberRating::from_stars(3.76).half_stars(), 8);
        assert_eq!(MemberRating::from_stars(7.0).stars(), 5.0);
        assert_eq!(MemberRating::from_stars(-1.0), MemberRating::UNRATED);
        assert_eq!(MemberRating::from_stars(f32::NAN), MemberRating::UNRATED);
    }

    #[test]
    fn test_glyphs() {
        assert_eq!(MemberRating::from_stars(3.5).glyphs(), "★★★½");
        assert_eq!(MemberRating::from_stars(0.5).glyphs(), "½");
        assert_eq!(MemberRating::UNRATED.glyphs(), "");
        assert!(!MemberRating::UNRATED.is_rated());
    }

    #[test]
    fn test_serializes_as_stars() {
        let json = serde_json::to_string(&MemberRating::from_stars(2.5)).unwrap();
        assert_eq!(json, "2.5");
        let parsed: MemberRating = serde_json::from_str("9").unwrap();
        assert_eq!(parsed.stars(), 5.0);
    }
}
