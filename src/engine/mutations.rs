//! Mutation coordinator.
//!
//! Every operation applies the edit to the in-memory model first, rebuilds
//! the affected day's agenda and publishes through the observers, then
//! confirms with the remote repository. A rejected confirmation is
//! forwarded to the error observer and never rolls the local edit back;
//! reconciliation happens on the next refresh.
//!
//! Unknown ids are refused with `false` instead of a fault so presentation
//! code can stay defensive.

use chrono::NaiveDateTime;

use super::TimelineEngine;
use crate::models::{PlanId, Profile, Segment, Step, StepId};
use crate::repository::plan::StepOrder;
use crate::repository::step::{AddStepSpec, EditStepSpec};

impl TimelineEngine {
    /// Move a step to a new position in its plan and renumber `order`
    /// densely from 0.
    ///
    /// `new_order` is a display index: when the UI shows synthetic leading
    /// rows before the first step (`EngineConfig::leading_rows`), it is
    /// offset down by that amount and clamped at 0.
    pub async fn reorder_step(&mut self, step_id: StepId, new_order: usize) -> bool {
        let Some((plan_id, orders)) = self.apply_reorder(step_id, new_order) else {
            return false;
        };
        self.publish_timeline();
        self.rebuild_agenda();

        let plans = self.repos().plans.clone();
        if let Err(e) = plans.edit_plan_step_order(&plan_id, &orders).await {
            self.publish_error(&e);
        }
        true
    }

    fn apply_reorder(
        &mut self,
        step_id: StepId,
        new_order: usize,
    ) -> Option<(PlanId, Vec<StepOrder>)> {
        let target = new_order.saturating_sub(self.config().leading_rows);
        let plan = self.timeline_mut()?.plan_with_step_mut(step_id)?;
        let position = plan.steps.iter().position(|s| s.id == step_id)?;

        let step = plan.steps.remove(position);
        let target = target.min(plan.steps.len());
        plan.steps.insert(target, step);
        for (index, step) in plan.steps.iter_mut().enumerate() {
            step.order = index as u32;
        }

        let orders = plan
            .steps
            .iter()
            .map(|s| StepOrder {
                step_id: s.id,
                order: s.order,
            })
            .collect();
        Some((plan.id.clone(), orders))
    }

    /// Delete a step from its plan. Remaining `order` values keep their
    /// gaps; the agenda builder only relies on relative order.
    pub async fn remove_step(&mut self, step_id: StepId) -> bool {
        let removed = self
            .timeline_mut()
            .and_then(|t| t.plan_with_step_mut(step_id))
            .map(|plan| plan.steps.retain(|s| s.id != step_id))
            .is_some();
        if !removed {
            return false;
        }
        self.publish_timeline();
        self.rebuild_agenda();

        let steps = self.repos().steps.clone();
        if let Err(e) = steps.delete_step(step_id).await {
            self.publish_error(&e);
        }
        true
    }

    /// Update a step's start/end times. Does not reorder: when the new
    /// time no longer matches the step's position, the caller triggers a
    /// separate reorder.
    pub async fn change_step_time(
        &mut self,
        step_id: StepId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> bool {
        let changed = self
            .timeline_mut()
            .and_then(|t| t.plan_with_step_mut(step_id))
            .and_then(|p| p.step_mut(step_id))
            .map(|step| {
                step.start = start;
                step.end = end;
            })
            .is_some();
        if !changed {
            return false;
        }
        self.publish_timeline();
        self.rebuild_agenda();

        let steps = self.repos().steps.clone();
        let spec = EditStepSpec {
            step_id,
            start,
            end,
        };
        if let Err(e) = steps.edit_step(&spec).await {
            self.publish_error(&e);
        }
        true
    }

    /// Append a stop to a plan. The step appears immediately under a
    /// provisional negative id and is swapped for the repository-assigned
    /// one on confirmation.
    pub async fn add_step(&mut self, spec: AddStepSpec) -> bool {
        let provisional = self.next_provisional_step_id();
        {
            let Some(plan) = self
                .timeline_mut()
                .and_then(|t| t.plan_mut(&spec.plan_id))
            else {
                return false;
            };
            let step = Step {
                id: provisional,
                poi: spec.poi.clone(),
                score: 0.0,
                order: plan.steps.len() as u32,
                start: spec.start,
                end: spec.end,
                step_type: spec.step_type,
                alternatives: None,
                warning: None,
            };
            plan.steps.push(step);
        }
        self.publish_timeline();
        self.rebuild_agenda();

        let steps = self.repos().steps.clone();
        match steps.add_step(&spec).await {
            Ok(confirmed) => {
                if let Some(plan) = self
                    .timeline_mut()
                    .and_then(|t| t.plan_mut(&spec.plan_id))
                {
                    if let Some(step) = plan.step_mut(provisional) {
                        *step = confirmed;
                    }
                    plan.steps.sort_by_key(|s| s.order);
                }
                self.publish_timeline();
                self.rebuild_agenda();
            }
            Err(e) => self.publish_error(&e),
        }
        true
    }

    /// Change a plan's day window.
    pub async fn edit_plan_hours(
        &mut self,
        plan_id: &PlanId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> bool {
        let changed = self
            .timeline_mut()
            .and_then(|t| t.plan_mut(plan_id))
            .map(|plan| {
                plan.start = start;
                plan.end = end;
            })
            .is_some();
        if !changed {
            return false;
        }
        self.publish_timeline();
        self.rebuild_agenda();

        let plans = self.repos().plans.clone();
        if let Err(e) = plans.edit_plan_hours(plan_id, start, end).await {
            self.publish_error(&e);
        }
        true
    }

    /// Add a generation-scope (itinerary) segment built from a profile,
    /// the manual "add plan" flow.
    pub async fn add_generation_window(&mut self, profile: &Profile) -> bool {
        let appended = self
            .timeline_mut()
            .map(|t| {
                t.segments
                    .get_or_insert_with(Vec::new)
                    .push(Segment::itinerary_for(profile));
            })
            .is_some();
        if !appended {
            return false;
        }
        self.publish_timeline();
        self.rebuild_agenda();

        let timelines = self.repos().timelines.clone();
        let trip_hash = self.trip_hash().to_string();
        if let Err(e) = timelines.create_or_edit_segment(&trip_hash, profile).await {
            self.publish_error(&e);
        }
        true
    }

    /// Remove a segment by index. Booked/reserved segments are only ever
    /// removed (this is the client side of a cancellation), and segments
    /// flagged unavailable refuse removal.
    pub async fn remove_segment(&mut self, segment_index: usize) -> bool {
        let removed = {
            let Some(segments) = self.timeline_mut().and_then(|t| t.segments.as_mut()) else {
                return false;
            };
            match segments.get(segment_index) {
                Some(segment) if segment.available => {
                    segments.remove(segment_index);
                    true
                }
                _ => false,
            }
        };
        if !removed {
            return false;
        }
        self.publish_timeline();
        self.rebuild_agenda();

        let timelines = self.repos().timelines.clone();
        let trip_hash = self.trip_hash().to_string();
        if let Err(e) = timelines.delete_segment(&trip_hash, segment_index).await {
            self.publish_error(&e);
        }
        true
    }

    fn timeline_mut(&mut self) -> Option<&mut crate::models::Timeline> {
        self.timeline_as_mut()
    }
}

