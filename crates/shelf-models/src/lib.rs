pub mod entry;
pub mod palette;
pub mod rating;

pub use entry::{Collection, Entry};
pub use palette::{Palette, Rgb};
pub use rating::MemberRating;
