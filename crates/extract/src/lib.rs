//! HTML parsing and record extraction for the komik scraper.
//!
//! Three page kinds are understood, each with its own entry point on
//! [`Extractor`]:
//!
//! - **Listing pages** ([`Extractor::listing`]) never fail; item blocks that
//!   lack a title or link are skipped and missing optional fields become
//!   [`NOT_AVAILABLE`].
//! - **Detail pages** ([`Extractor::detail`]) and **reader pages**
//!   ([`Extractor::chapter`]) return [`Outcome::NotFound`] when the page has
//!   no title node.
//!
//! Every link that ends up in a record passes through [`normalize`] first.

mod consts;
pub mod error;
mod extract;
mod link;
pub mod models;
mod outcome;

pub use crate::consts::NOT_AVAILABLE;
pub use crate::extract::Extractor;
pub use crate::link::{CONTENT_NAMESPACE, normalize};
pub use crate::outcome::Outcome;
