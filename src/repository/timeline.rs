//! Timeline repository trait.
//!
//! The engine is a pure in-process aggregation layer; fetching, creating
//! and deleting timelines is the backend's concern, abstracted behind this
//! trait so the in-memory implementation can stand in during tests.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Profile, Timeline};

/// Repository for timeline lifecycle operations.
///
/// All operations are async and single-attempt: there is no built-in
/// retry. Callers needing "poll until ready" behavior call
/// `fetch_timeline` repeatedly at their own cadence.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait TimelineRepository: Send + Sync {
    /// Check if the backend is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Fetch the current timeline snapshot for a trip.
    ///
    /// # Returns
    /// * `Ok(Timeline)` - possibly still generating (`plans == None` or
    ///   plans with `generated_status == 0`)
    /// * `Err(RepositoryError::NotFound)` - if the trip does not exist
    async fn fetch_timeline(&self, trip_hash: &str) -> RepositoryResult<Timeline>;

    /// Create a new timeline from a generation profile.
    ///
    /// The returned timeline has `plans == None` until generation starts.
    async fn create_timeline(&self, profile: &Profile) -> RepositoryResult<Timeline>;

    /// Create or update the generation-scope (itinerary) segment for a trip.
    ///
    /// # Returns
    /// * `Ok(true)` - if the backend accepted the change
    async fn create_or_edit_segment(
        &self,
        trip_hash: &str,
        profile: &Profile,
    ) -> RepositoryResult<bool>;

    /// Delete a trip's timeline entirely.
    async fn delete_timeline(&self, trip_hash: &str) -> RepositoryResult<bool>;

    /// Remove one segment, addressed by its index in the timeline's
    /// segment collection.
    async fn delete_segment(&self, trip_hash: &str, segment_index: usize)
        -> RepositoryResult<bool>;

    /// Read a cached timeline, if one was saved.
    ///
    /// # Returns
    /// * `Ok(None)` - on cache miss (absence is not an error)
    async fn fetch_local_timeline(&self, trip_hash: &str) -> RepositoryResult<Option<Timeline>>;

    /// Write a timeline snapshot to the cache.
    async fn save_timeline(&self, trip_hash: &str, timeline: &Timeline) -> RepositoryResult<()>;
}
