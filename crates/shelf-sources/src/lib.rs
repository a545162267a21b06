pub mod error;
pub mod fetcher;
pub mod letterboxd;
pub mod normalize;
pub mod parser;
pub mod traits;
pub mod transport;

pub use error::{FeedError, TransportError};
pub use fetcher::{FetchStrategy, ProxyFetcher};
pub use letterboxd::{feed_url_for, LetterboxdSource};
pub use normalize::normalize_items;
pub use parser::{parse_feed, RawItem};
pub use traits::FeedSource;
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
