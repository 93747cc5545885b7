//! Multi-chapter downloads with streamed progress.

mod event;
mod job;

pub use self::event::BatchEvent;
pub use self::job::{BatchJob, JobState};
