use chrono::NaiveDate;

use super::plan::{Plan, PlanId};
use super::poi::{City, Poi};
use super::profile::Profile;
use super::segment::Segment;
use super::step::StepId;

crate::define_id_type!(i64, TimelineId);

/// The aggregate root for one trip: per-day plans plus trip-level segment
/// overlays.
///
/// `plans` stays `None` on a freshly created timeline until generation has
/// started; plans are ordered ascending by start date with at most one plan
/// per calendar date.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Timeline {
    pub id: TimelineId,
    /// Stable external identifier, opaque to the engine.
    pub trip_hash: String,
    #[serde(default)]
    pub profile: Option<Profile>,
    pub city: City,
    #[serde(default)]
    pub plans: Option<Vec<Plan>>,
    #[serde(default)]
    pub segments: Option<Vec<Segment>>,
}

impl Timeline {
    pub fn plans(&self) -> &[Plan] {
        self.plans.as_deref().unwrap_or(&[])
    }

    pub fn segments(&self) -> &[Segment] {
        self.segments.as_deref().unwrap_or(&[])
    }

    /// Distinct calendar dates spanned by the plans, ascending.
    pub fn distinct_dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.plans().iter().map(Plan::date).collect();
        dates.sort();
        dates.dedup();
        dates
    }

    pub fn day_count(&self) -> usize {
        self.distinct_dates().len()
    }

    /// Calendar date for a 0-based day index, `None` when out of range.
    pub fn date_for_day(&self, day_index: usize) -> Option<NaiveDate> {
        self.distinct_dates().get(day_index).copied()
    }

    pub fn plan_for_date(&self, date: NaiveDate) -> Option<&Plan> {
        self.plans().iter().find(|p| p.date() == date)
    }

    pub fn plan(&self, id: &PlanId) -> Option<&Plan> {
        self.plans().iter().find(|p| &p.id == id)
    }

    pub fn plan_mut(&mut self, id: &PlanId) -> Option<&mut Plan> {
        self.plans.as_mut()?.iter_mut().find(|p| &p.id == id)
    }

    /// Plan containing the given step, if any.
    pub fn plan_with_step(&self, step_id: StepId) -> Option<&Plan> {
        self.plans().iter().find(|p| p.step(step_id).is_some())
    }

    pub fn plan_with_step_mut(&mut self, step_id: StepId) -> Option<&mut Plan> {
        self.plans
            .as_mut()?
            .iter_mut()
            .find(|p| p.step(step_id).is_some())
    }

    pub fn first_plan(&self) -> Option<&Plan> {
        self.plans().iter().min_by_key(|p| p.date())
    }

    pub fn last_plan(&self) -> Option<&Plan> {
        self.plans().iter().max_by_key(|p| p.date())
    }

    /// Unique POIs referenced by any step, in first-appearance order.
    pub fn pois(&self) -> Vec<&Poi> {
        let mut seen = std::collections::HashSet::new();
        let mut pois = Vec::new();
        for plan in self.plans() {
            for step in &plan.steps {
                if seen.insert(step.poi.id) {
                    pois.push(&step.poi);
                }
            }
        }
        pois
    }

    pub fn pois_by_category(&self, category: &str) -> Vec<&Poi> {
        self.pois()
            .into_iter()
            .filter(|p| p.category.as_deref() == Some(category))
            .collect()
    }

    /// Booked/reserved activity segments starting on the given date,
    /// ordered by start time.
    pub fn segments_on(&self, date: NaiveDate) -> Vec<&Segment> {
        let mut segments: Vec<&Segment> = self
            .segments()
            .iter()
            .filter(|s| s.is_activity() && s.start_date() == date)
            .collect();
        segments.sort_by_key(|s| s.start);
        segments
    }

    /// True once every plan and segment the timeline knows about has
    /// finished generating. A timeline whose plans have not materialized
    /// yet is never considered generated.
    pub fn all_segments_generated(&self) -> bool {
        let Some(plans) = self.plans.as_ref() else {
            return false;
        };
        plans.iter().all(|p| p.status().is_ready())
            && self.segments().iter().all(|s| s.status().is_ready())
    }
}
