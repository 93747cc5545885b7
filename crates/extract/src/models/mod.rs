mod age;
mod chapter;
mod detail;
mod listing;

pub use self::age::Age;
pub use self::chapter::{ChapterOption, ChapterPage};
pub use self::detail::{ChapterRef, MangaDetail};
pub use self::listing::{Listing, ListingEntry};
