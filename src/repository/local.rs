//! In-memory local repository implementation.
//!
//! Implements every collaborator trait over plain `HashMap`/`Vec` storage,
//! giving tests and local development fast, deterministic, isolated
//! execution. Timelines are keyed by trip hash; ids are assigned from
//! monotonic counters.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::error::{RepositoryError, RepositoryResult};
use super::plan::{PlanRepository, StepOrder};
use super::poi::{PoiPage, PoiQuery, PoiRepository};
use super::step::{AddStepSpec, EditStepSpec, StepRepository};
use super::timeline::TimelineRepository;
use crate::io::TimelineCache;
use crate::models::segment::SegmentType;
use crate::models::status::STATUS_READY;
use crate::models::{
    Plan, PlanId, Poi, Profile, Segment, Step, StepId, Timeline, TimelineId,
};

/// In-memory repository for all collaborator traits.
///
/// Optionally backed by a [`TimelineCache`] directory so that
/// `save_timeline`/`fetch_local_timeline` survive process restarts.
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
    cache: Option<TimelineCache>,
}

struct LocalData {
    timelines: HashMap<String, Timeline>,
    cached: HashMap<String, Timeline>,
    catalog: Vec<Poi>,

    next_timeline_id: i64,
    next_step_id: i64,

    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            timelines: HashMap::new(),
            cached: HashMap::new(),
            catalog: Vec::new(),
            next_timeline_id: 1,
            next_step_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
            cache: None,
        }
    }

    /// Attach a file-backed cache directory for `save_timeline` /
    /// `fetch_local_timeline`.
    pub fn with_cache_dir(dir: impl Into<std::path::PathBuf>) -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
            cache: Some(TimelineCache::new(dir)),
        }
    }

    /// Insert a fully-formed timeline, keyed by its trip hash. Test seeding
    /// helper; ids are taken as-is.
    pub fn insert_timeline(&self, timeline: Timeline) {
        let mut data = self.data.write().unwrap();
        data.timelines
            .insert(timeline.trip_hash.clone(), timeline);
    }

    /// Seed the POI search catalog.
    pub fn seed_pois(&self, pois: Vec<Poi>) {
        let mut data = self.data.write().unwrap();
        data.catalog.extend(pois);
    }

    /// Replace a timeline's plans, simulating generation producing output.
    pub fn set_plans(&self, trip_hash: &str, plans: Vec<Plan>) -> bool {
        let mut data = self.data.write().unwrap();
        match data.timelines.get_mut(trip_hash) {
            Some(t) => {
                t.plans = Some(plans);
                true
            }
            None => false,
        }
    }

    /// Mark every plan and segment of a timeline as generated.
    pub fn finish_generation(&self, trip_hash: &str) -> bool {
        let mut data = self.data.write().unwrap();
        let Some(timeline) = data.timelines.get_mut(trip_hash) else {
            return false;
        };
        if let Some(plans) = timeline.plans.as_mut() {
            for plan in plans.iter_mut() {
                plan.generated_status = STATUS_READY;
            }
        }
        if let Some(segments) = timeline.segments.as_mut() {
            for segment in segments.iter_mut() {
                segment.generated_status = STATUS_READY;
            }
        }
        true
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        let mut data = self.data.write().unwrap();
        data.is_healthy = healthy;
    }

    pub fn timeline_count(&self) -> usize {
        self.data.read().unwrap().timelines.len()
    }

    fn check_health(&self) -> RepositoryResult<()> {
        let data = self.data.read().unwrap();
        if !data.is_healthy {
            return Err(RepositoryError::ConnectionError(
                "Backend is not reachable".to_string(),
            ));
        }
        Ok(())
    }

    fn get_timeline_impl(&self, trip_hash: &str) -> RepositoryResult<Timeline> {
        let data = self.data.read().unwrap();
        data.timelines.get(trip_hash).cloned().ok_or_else(|| {
            RepositoryError::NotFound(format!("Timeline {trip_hash} not found"))
        })
    }

    fn plan_mut<'a>(data: &'a mut LocalData, plan_id: &PlanId) -> Option<&'a mut Plan> {
        data.timelines
            .values_mut()
            .filter_map(|t| t.plans.as_mut())
            .flatten()
            .find(|p| &p.id == plan_id)
    }

    fn plan_with_step_mut<'a>(data: &'a mut LocalData, step_id: StepId) -> Option<&'a mut Plan> {
        data.timelines
            .values_mut()
            .filter_map(|t| t.plans.as_mut())
            .flatten()
            .find(|p| p.step(step_id).is_some())
    }

    fn trip_hash_for(profile: &Profile) -> RepositoryResult<String> {
        let bytes = serde_json::to_vec(profile)
            .map_err(|e| RepositoryError::InternalError(format!("Profile encoding: {e}")))?;
        let digest = Sha256::digest(&bytes);
        Ok(hex::encode(digest)[..16].to_string())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TimelineRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        let data = self.data.read().unwrap();
        Ok(data.is_healthy)
    }

    async fn fetch_timeline(&self, trip_hash: &str) -> RepositoryResult<Timeline> {
        self.check_health()?;
        self.get_timeline_impl(trip_hash)
    }

    async fn create_timeline(&self, profile: &Profile) -> RepositoryResult<Timeline> {
        self.check_health()?;
        let trip_hash = Self::trip_hash_for(profile)?;

        let mut data = self.data.write().unwrap();
        let id = TimelineId(data.next_timeline_id);
        data.next_timeline_id += 1;

        let timeline = Timeline {
            id,
            trip_hash: trip_hash.clone(),
            profile: Some(profile.clone()),
            city: profile.city.clone(),
            plans: None,
            segments: None,
        };
        data.timelines.insert(trip_hash, timeline.clone());
        Ok(timeline)
    }

    async fn create_or_edit_segment(
        &self,
        trip_hash: &str,
        profile: &Profile,
    ) -> RepositoryResult<bool> {
        self.check_health()?;
        let mut data = self.data.write().unwrap();
        let Some(timeline) = data.timelines.get_mut(trip_hash) else {
            return Err(RepositoryError::NotFound(format!(
                "Timeline {trip_hash} not found"
            )));
        };

        let segment = Segment::itinerary_for(profile);
        let segments = timeline.segments.get_or_insert_with(Vec::new);
        match segments
            .iter_mut()
            .find(|s| s.segment_type == SegmentType::Itinerary)
        {
            Some(existing) => *existing = segment,
            None => segments.push(segment),
        }
        Ok(true)
    }

    async fn delete_timeline(&self, trip_hash: &str) -> RepositoryResult<bool> {
        self.check_health()?;
        let mut data = self.data.write().unwrap();
        Ok(data.timelines.remove(trip_hash).is_some())
    }

    async fn delete_segment(
        &self,
        trip_hash: &str,
        segment_index: usize,
    ) -> RepositoryResult<bool> {
        self.check_health()?;
        let mut data = self.data.write().unwrap();
        let Some(timeline) = data.timelines.get_mut(trip_hash) else {
            return Err(RepositoryError::NotFound(format!(
                "Timeline {trip_hash} not found"
            )));
        };
        match timeline.segments.as_mut() {
            Some(segments) if segment_index < segments.len() => {
                segments.remove(segment_index);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn fetch_local_timeline(&self, trip_hash: &str) -> RepositoryResult<Option<Timeline>> {
        {
            let data = self.data.read().unwrap();
            if let Some(cached) = data.cached.get(trip_hash) {
                return Ok(Some(cached.clone()));
            }
        }
        match &self.cache {
            Some(cache) => cache
                .load(trip_hash)
                .map_err(|e| RepositoryError::InternalError(format!("Cache read: {e:#}"))),
            None => Ok(None),
        }
    }

    async fn save_timeline(&self, trip_hash: &str, timeline: &Timeline) -> RepositoryResult<()> {
        {
            let mut data = self.data.write().unwrap();
            data.cached.insert(trip_hash.to_string(), timeline.clone());
        }
        if let Some(cache) = &self.cache {
            cache
                .save(trip_hash, timeline)
                .map_err(|e| RepositoryError::InternalError(format!("Cache write: {e:#}")))?;
        }
        Ok(())
    }
}

#[async_trait]
impl PlanRepository for LocalRepository {
    async fn fetch_plan(&self, plan_id: &PlanId) -> RepositoryResult<Plan> {
        self.check_health()?;
        let data = self.data.read().unwrap();
        data.timelines
            .values()
            .flat_map(|t| t.plans())
            .find(|p| &p.id == plan_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("Plan {plan_id} not found")))
    }

    async fn edit_plan_hours(
        &self,
        plan_id: &PlanId,
        start: chrono::NaiveDateTime,
        end: chrono::NaiveDateTime,
    ) -> RepositoryResult<bool> {
        self.check_health()?;
        let mut data = self.data.write().unwrap();
        let Some(plan) = Self::plan_mut(&mut data, plan_id) else {
            return Err(RepositoryError::NotFound(format!("Plan {plan_id} not found")));
        };
        plan.start = start;
        plan.end = end;
        Ok(true)
    }

    async fn edit_plan_step_order(
        &self,
        plan_id: &PlanId,
        orders: &[StepOrder],
    ) -> RepositoryResult<bool> {
        self.check_health()?;
        let mut data = self.data.write().unwrap();
        let Some(plan) = Self::plan_mut(&mut data, plan_id) else {
            return Err(RepositoryError::NotFound(format!("Plan {plan_id} not found")));
        };
        for entry in orders {
            if let Some(step) = plan.step_mut(entry.step_id) {
                step.order = entry.order;
            }
        }
        plan.steps.sort_by_key(|s| s.order);
        Ok(true)
    }

    async fn export_itinerary(
        &self,
        plan_id: &PlanId,
        trip_hash: &str,
    ) -> RepositoryResult<String> {
        self.check_health()?;
        let timeline = self.get_timeline_impl(trip_hash)?;
        let Some(plan) = timeline.plan(plan_id) else {
            return Err(RepositoryError::NotFound(format!("Plan {plan_id} not found")));
        };

        let title = plan.name.clone().unwrap_or_else(|| "Day plan".to_string());
        let mut out = format!("{title} - {}\n", plan.date());
        for step in plan.ordered_steps() {
            out.push_str(&format!(
                "{} {}\n",
                step.start.format("%H:%M"),
                step.poi.name
            ));
        }
        Ok(out)
    }
}

#[async_trait]
impl StepRepository for LocalRepository {
    async fn add_step(&self, spec: &AddStepSpec) -> RepositoryResult<Step> {
        self.check_health()?;
        let mut data = self.data.write().unwrap();
        let id = StepId(data.next_step_id);
        data.next_step_id += 1;

        let Some(plan) = Self::plan_mut(&mut data, &spec.plan_id) else {
            return Err(RepositoryError::NotFound(format!(
                "Plan {} not found",
                spec.plan_id
            )));
        };

        let step = Step {
            id,
            poi: spec.poi.clone(),
            score: 0.0,
            order: plan.steps.len() as u32,
            start: spec.start,
            end: spec.end,
            step_type: spec.step_type,
            alternatives: None,
            warning: None,
        };
        plan.steps.push(step.clone());
        Ok(step)
    }

    async fn delete_step(&self, step_id: StepId) -> RepositoryResult<bool> {
        self.check_health()?;
        let mut data = self.data.write().unwrap();
        let Some(plan) = Self::plan_with_step_mut(&mut data, step_id) else {
            return Ok(false);
        };
        plan.steps.retain(|s| s.id != step_id);
        Ok(true)
    }

    async fn edit_step(&self, spec: &EditStepSpec) -> RepositoryResult<bool> {
        self.check_health()?;
        let mut data = self.data.write().unwrap();
        let Some(plan) = Self::plan_with_step_mut(&mut data, spec.step_id) else {
            return Ok(false);
        };
        if let Some(step) = plan.step_mut(spec.step_id) {
            step.start = spec.start;
            step.end = spec.end;
        }
        Ok(true)
    }
}

#[async_trait]
impl PoiRepository for LocalRepository {
    async fn search_pois(&self, query: &PoiQuery) -> RepositoryResult<PoiPage> {
        self.check_health()?;
        let data = self.data.read().unwrap();

        let keyword = query.keyword.as_ref().map(|k| k.to_lowercase());
        let matches: Vec<Poi> = data
            .catalog
            .iter()
            .filter(|poi| match &query.category {
                Some(category) => poi.category.as_deref() == Some(category.as_str()),
                None => true,
            })
            .filter(|poi| match &keyword {
                Some(keyword) => poi.name.to_lowercase().contains(keyword),
                None => true,
            })
            .cloned()
            .collect();

        let total = matches.len();
        let items = matches
            .into_iter()
            .skip(query.page * query.page_size)
            .take(query.page_size)
            .collect();

        Ok(PoiPage {
            items,
            page: query.page,
            total,
        })
    }
}
