//! Timeline engine: the single owner of one trip's in-memory state.
//!
//! All reads flow out through observers, all writes funnel through the
//! mutation methods so that every write is followed by exactly one agenda
//! rebuild and one notification. The engine performs no threading of its
//! own; async completions re-enter through the explicit entry points on
//! the owner's execution context.

mod mutations;

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::models::{PlanId, Poi, Profile, StepId, Timeline};
use crate::observer::ValueObserver;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::poi::PoiQuery;
use crate::repository::route::RouteLeg;
use crate::repository::{
    LocalRepository, PlanRepository, PoiRepository, RouteProvider, StepRepository,
    TimelineRepository,
};
use crate::services::agenda::{DayAgenda, SnapshotId};
use crate::services::distance::{self, DistanceRequest, DistanceUpdate};
use crate::services::generation::GenerationTracker;

/// Collaborator handles the engine works against.
#[derive(Clone)]
pub struct EngineRepositories {
    pub timelines: Arc<dyn TimelineRepository>,
    pub plans: Arc<dyn PlanRepository>,
    pub steps: Arc<dyn StepRepository>,
    pub pois: Arc<dyn PoiRepository>,
    pub routes: Arc<dyn RouteProvider>,
}

impl EngineRepositories {
    /// Wire every repository role to one local repository instance, with a
    /// deterministic route provider. The usual test and development setup.
    pub fn local(repo: LocalRepository) -> Self {
        let repo = Arc::new(repo);
        Self {
            timelines: repo.clone(),
            plans: repo.clone(),
            steps: repo.clone(),
            pois: repo,
            routes: Arc::new(crate::repository::HaversineRouteProvider::new()),
        }
    }
}

/// Aggregation engine for one trip.
pub struct TimelineEngine {
    repos: EngineRepositories,
    config: EngineConfig,
    trip_hash: String,

    timeline: Option<Timeline>,
    selected_day: usize,
    agenda: Option<DayAgenda>,
    next_snapshot: u64,
    next_provisional_id: i64,

    tracker: GenerationTracker,
    timeline_observer: ValueObserver<Timeline>,
    agenda_observer: ValueObserver<DayAgenda>,
    distance_observer: ValueObserver<DistanceUpdate>,
    error_observer: ValueObserver<Option<String>>,
}

impl TimelineEngine {
    pub fn new(repos: EngineRepositories, config: EngineConfig, trip_hash: impl Into<String>) -> Self {
        Self {
            repos,
            config,
            trip_hash: trip_hash.into(),
            timeline: None,
            selected_day: 0,
            agenda: None,
            next_snapshot: 0,
            next_provisional_id: 0,
            tracker: GenerationTracker::new(),
            timeline_observer: ValueObserver::new(),
            agenda_observer: ValueObserver::new(),
            distance_observer: ValueObserver::new(),
            error_observer: ValueObserver::new(),
        }
    }

    /// Create a fresh trip from a generation profile and return an engine
    /// already holding its (not yet generated) timeline.
    pub async fn create(
        repos: EngineRepositories,
        config: EngineConfig,
        profile: &Profile,
    ) -> RepositoryResult<Self> {
        let timeline = repos.timelines.create_timeline(profile).await?;
        let mut engine = Self::new(repos, config, timeline.trip_hash.clone());
        engine.ingest(timeline);
        Ok(engine)
    }

    pub fn trip_hash(&self) -> &str {
        &self.trip_hash
    }

    pub fn timeline(&self) -> Option<&Timeline> {
        self.timeline.as_ref()
    }

    pub fn selected_day(&self) -> usize {
        self.selected_day
    }

    /// Current agenda snapshot, including any distance legs patched in
    /// since the last rebuild.
    pub fn agenda(&self) -> Option<&DayAgenda> {
        self.agenda.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ==================== Observers ====================

    /// Full timeline snapshots; fires on ingest and after every mutation.
    pub fn timeline_observer(&mut self) -> &mut ValueObserver<Timeline> {
        &mut self.timeline_observer
    }

    /// Rebuilt agendas for the selected day.
    pub fn agenda_observer(&mut self) -> &mut ValueObserver<DayAgenda> {
        &mut self.agenda_observer
    }

    /// Per-pair distance deltas; the agenda itself is not re-published
    /// when a leg arrives.
    pub fn distance_observer(&mut self) -> &mut ValueObserver<DistanceUpdate> {
        &mut self.distance_observer
    }

    /// Repository failures, forwarded verbatim.
    pub fn error_observer(&mut self) -> &mut ValueObserver<Option<String>> {
        &mut self.error_observer
    }

    /// True once every plan and segment has finished generating.
    pub fn all_generated_observer(&mut self) -> &mut ValueObserver<bool> {
        self.tracker.all_ready()
    }

    /// Generation-unavailable message, distinct from the error channel.
    pub fn generation_error_observer(&mut self) -> &mut ValueObserver<Option<String>> {
        self.tracker.error()
    }

    pub fn tracker(&self) -> &GenerationTracker {
        &self.tracker
    }

    // ==================== Lifecycle ====================

    /// Adopt a fetched timeline snapshot: update generation state, publish
    /// the timeline and rebuild the selected day's agenda.
    pub fn ingest(&mut self, timeline: Timeline) {
        self.tracker.ingest(&timeline);
        self.timeline = Some(timeline.clone());
        self.timeline_observer.set(timeline);
        self.rebuild_agenda();
    }

    /// Show whatever the cache has, then refresh from the backend.
    pub async fn start(&mut self) -> RepositoryResult<()> {
        let timelines = self.repos.timelines.clone();
        let cached = timelines.fetch_local_timeline(&self.trip_hash).await;
        match cached {
            Ok(Some(cached)) => {
                log::debug!("Cache hit for trip {}", self.trip_hash);
                self.ingest(cached);
            }
            Ok(None) => {}
            Err(e) => log::warn!("Cache read failed for trip {}: {e}", self.trip_hash),
        }
        self.refresh().await
    }

    /// Fetch the latest snapshot and adopt it. This is also the polling
    /// entry point while generation is running; repeated identical
    /// snapshots settle into no-op notifications downstream.
    pub async fn refresh(&mut self) -> RepositoryResult<()> {
        let timelines = self.repos.timelines.clone();
        let fetched = timelines.fetch_timeline(&self.trip_hash).await;
        let timeline = match fetched {
            Ok(timeline) => timeline,
            Err(e) => {
                self.publish_error(&e);
                return Err(e);
            }
        };
        if let Err(e) = timelines.save_timeline(&self.trip_hash, &timeline).await {
            log::warn!("Cache write failed for trip {}: {e}", self.trip_hash);
        }
        self.ingest(timeline);
        if self.config.auto_distances {
            self.refresh_distances().await;
        }
        Ok(())
    }

    /// Delete the trip upstream and drop local state.
    pub async fn delete(&mut self) -> RepositoryResult<bool> {
        let timelines = self.repos.timelines.clone();
        let result = timelines.delete_timeline(&self.trip_hash).await;
        let deleted = match result {
            Ok(deleted) => deleted,
            Err(e) => {
                self.publish_error(&e);
                return Err(e);
            }
        };
        self.timeline = None;
        self.agenda = None;
        Ok(deleted)
    }

    // ==================== Day selection ====================

    /// Select a day by 0-based index. An out-of-range index is refused and
    /// leaves the current selection untouched.
    pub fn select_day(&mut self, day_index: usize) -> bool {
        let valid = self
            .timeline
            .as_ref()
            .map(|t| day_index < t.day_count())
            .unwrap_or(false);
        if !valid {
            return false;
        }
        self.selected_day = day_index;
        self.rebuild_agenda();
        true
    }

    /// Rebuild the selected day's agenda under a fresh snapshot id and
    /// publish it. Outstanding distance results for the previous snapshot
    /// become stale from here on.
    pub(crate) fn rebuild_agenda(&mut self) {
        let Some(timeline) = self.timeline.as_ref() else {
            self.agenda = None;
            return;
        };
        self.next_snapshot += 1;
        self.agenda = DayAgenda::build(timeline, self.selected_day, SnapshotId(self.next_snapshot));
        if let Some(agenda) = self.agenda.clone() {
            self.agenda_observer.set(agenda);
        }
    }

    // ==================== Distance enrichment ====================

    /// Requests for every unfilled pair slot of the current agenda.
    pub fn distance_requests(&self) -> Vec<DistanceRequest> {
        self.agenda
            .as_ref()
            .map(distance::pending_requests)
            .unwrap_or_default()
    }

    /// Patch one completed leg in and publish the delta. Stale results
    /// (any mismatch with the current snapshot) are discarded.
    pub fn apply_distance(&mut self, request: &DistanceRequest, leg: RouteLeg) -> bool {
        let Some(agenda) = self.agenda.as_mut() else {
            return false;
        };
        if !distance::apply_to(agenda, request, leg) {
            return false;
        }
        self.distance_observer.set(DistanceUpdate {
            snapshot: request.snapshot,
            day_index: request.day_index,
            pair_index: request.pair_index,
            leg,
        });
        true
    }

    /// Resolve all pending pair slots against the route provider.
    /// Returns the number of legs applied.
    pub async fn refresh_distances(&mut self) -> usize {
        let requests = self.distance_requests();
        if requests.is_empty() {
            return 0;
        }
        let results = distance::fetch_legs(self.repos.routes.as_ref(), &requests).await;
        let mut applied = 0;
        for (request, leg) in results {
            if self.apply_distance(&request, leg) {
                applied += 1;
            }
        }
        applied
    }

    // ==================== Step alternatives ====================

    /// Fetch alternative POIs for a step (same category, the step's own
    /// POI excluded) and patch them into the step. An unknown step or an
    /// uncategorized POI yields an empty list.
    pub async fn request_alternatives(&mut self, step_id: StepId) -> RepositoryResult<Vec<Poi>> {
        let Some((own_poi, category)) = self
            .timeline
            .as_ref()
            .and_then(|t| t.plan_with_step(step_id))
            .and_then(|p| p.step(step_id))
            .and_then(|s| s.poi.category.clone().map(|c| (s.poi.id, c)))
        else {
            return Ok(Vec::new());
        };

        let pois = self.repos.pois.clone();
        let searched = pois.search_pois(&PoiQuery::by_category(category)).await;
        let page = match searched {
            Ok(page) => page,
            Err(e) => {
                self.publish_error(&e);
                return Err(e);
            }
        };

        let alternatives: Vec<Poi> = page
            .items
            .into_iter()
            .filter(|poi| poi.id != own_poi)
            .collect();

        if let Some(step) = self
            .timeline
            .as_mut()
            .and_then(|t| t.plan_with_step_mut(step_id))
            .and_then(|p| p.step_mut(step_id))
        {
            step.alternatives = Some(alternatives.clone());
        }
        self.publish_timeline();
        self.rebuild_agenda();
        Ok(alternatives)
    }

    /// Export one day's itinerary as a shareable document.
    pub async fn export_day(&self, plan_id: &PlanId) -> RepositoryResult<String> {
        self.repos
            .plans
            .export_itinerary(plan_id, &self.trip_hash)
            .await
    }

    // ==================== Internal ====================

    pub(crate) fn timeline_as_mut(&mut self) -> Option<&mut Timeline> {
        self.timeline.as_mut()
    }

    pub(crate) fn next_provisional_step_id(&mut self) -> StepId {
        self.next_provisional_id -= 1;
        StepId(self.next_provisional_id)
    }

    pub(crate) fn publish_timeline(&mut self) {
        if let Some(timeline) = self.timeline.clone() {
            self.timeline_observer.set(timeline);
        }
    }

    pub(crate) fn publish_error(&mut self, error: &RepositoryError) {
        log::warn!("Repository error for trip {}: {error}", self.trip_hash);
        self.error_observer.set(Some(error.to_string()));
    }

    pub(crate) fn repos(&self) -> &EngineRepositories {
        &self.repos
    }
}
