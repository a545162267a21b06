use thiserror::Error;

/// Failures of the feed pipeline, one variant per thing the UI reports
/// differently. Display strings are shown to the user as-is.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeedError {
    #[error("Please enter a username")]
    Validation,

    #[error("Could not reach the feed service")]
    Transport,

    #[error("Invalid feed, check the username")]
    InvalidFeed(String),

    #[error("No logged entries found for this user")]
    NoEntries,
}

impl FeedError {
    /// Parse detail for logs; never part of the user-facing message.
    pub fn detail(&self) -> Option<&str> {
        match self {
            FeedError::InvalidFeed(detail) => Some(detail),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Request(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_messages() {
        assert_eq!(FeedError::Transport.to_string(), "Could not reach the feed service");
        assert_eq!(
            FeedError::InvalidFeed("unexpected end of input".into()).to_string(),
            "Invalid feed, check the username"
        );
        assert_eq!(FeedError::NoEntries.to_string(), "No logged entries found for this user");
        assert_eq!(FeedError::Validation.to_string(), "Please enter a username");
    }

    #[test]
    fn test_detail_only_for_invalid_feed() {
        assert_eq!(FeedError::InvalidFeed("bad root".into()).detail(), Some("bad root"));
        assert_eq!(FeedError::Transport.detail(), None);
    }
}
