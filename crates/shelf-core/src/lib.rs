pub mod cache;
pub mod color;
pub mod selection;
pub mod session;

pub use cache::{CachedSession, SessionCache};
pub use color::{palette_for, palette_for_entry, PaletteResolver, PaletteStrategy, PosterSampler};
pub use selection::Selection;
pub use session::{normalize_username, LoadOutcome, Session, SessionSnapshot};
