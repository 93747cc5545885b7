use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::Serialize;

/// Progress events emitted by [`BatchJob::run`](super::BatchJob::run).
///
/// Events follow a strict ordering:
/// 1. [`Progress`](Self::Progress) once per selected chapter, as each one
///    finishes (successfully or not), with `percent` strictly increasing.
/// 2. Exactly one terminal [`Complete`](Self::Complete) or
///    [`Error`](Self::Error).
///
/// Serialized with a `kind` tag: `{"kind":"progress","percent":50.0,...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BatchEvent {
    Progress {
        percent: f64,
        /// Title of the chapter that just finished
        chapter: String,
        completed: usize,
        total: usize,
    },
    Complete {
        file_name: String,
        mime: &'static str,
        /// Chapters packed into the archive
        chapters: usize,
        /// Titles of chapters left out
        skipped: Vec<String>,
        #[serde(skip)]
        archive: Vec<u8>,
    },
    Error {
        message: String,
    },
}
impl BatchEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).or_raise(|| ErrorKind::Encode)
    }

    /// Server-sent event framing: `data: <json>\n\n`.
    pub fn to_sse(&self) -> Result<String> {
        Ok(format!("data: {}\n\n", self.to_json()?))
    }
}
