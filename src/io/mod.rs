//! Local persistence helpers.

pub mod cache;

pub use cache::{timeline_checksum, TimelineCache};
