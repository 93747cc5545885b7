//! Packaging ordered image URLs into comic archives.
//!
//! [`ArchiveBuilder`] fetches a chapter's images with bounded concurrency and
//! hands them to [`pack`], which writes a deflate-compressed ZIP whose entry
//! names (`001.jpg`, `002.png`, ...) sort in reading order. Images that fail
//! to download are skipped and reported, never fatal.

mod builder;
mod entry;
pub mod error;
mod naming;
mod pack;

pub use crate::builder::{Archive, ArchiveBuilder, DEFAULT_ASSET_CONCURRENCY, SkippedAsset};
pub use crate::entry::{ArchiveEntry, extension_of};
pub use crate::naming::{Container, UniqueNames, safe_file_name};
pub use crate::pack::{pack, pack_named};
