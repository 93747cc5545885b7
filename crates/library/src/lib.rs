//! The komik scraper service.
//!
//! [`Komik`] ties the lower crates together: pages are fetched through a
//! [`komik_fetch::Fetcher`], turned into records by [`komik_extract`],
//! memoized in per-record [`komik_cache::Cache`]s, and packaged into
//! downloads by [`komik_archive`]. Multi-chapter downloads run as a
//! [`BatchJob`], which streams [`BatchEvent`]s while it works.

pub mod batch;
pub mod error;
mod service;
mod site;
mod template;
#[cfg(test)]
mod testing;

pub use crate::batch::{BatchEvent, BatchJob, JobState};
pub use crate::service::{Download, Komik};
pub use crate::site::Site;
pub use crate::template::FileNamer;
pub use komik_extract::models;
