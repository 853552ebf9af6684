//! Generation-State Tracker.
//!
//! Tracks whether each plan and segment of a timeline has finished
//! generating. The tracker performs no I/O: it consumes whatever timeline
//! snapshot it is given (polling cadence is the caller's concern) and
//! recomputes readiness from it.
//!
//! `ready` and `unavailable` are terminal across snapshots: a later poll
//! reporting `generating` for an already-settled plan does not regress it.
//! Only an explicit [`GenerationTracker::reset`] re-arms a plan.

use std::collections::HashMap;

use crate::models::{GenerationStatus, PlanId, Timeline};
use crate::observer::ValueObserver;

#[derive(Default)]
pub struct GenerationTracker {
    plans: HashMap<PlanId, GenerationStatus>,
    /// Segment states, keyed by index in the timeline's segment collection
    /// (the wire protocol addresses segments by index).
    segments: Vec<GenerationStatus>,
    /// True until the first snapshot arrives; readiness is unknown, not
    /// vacuously true.
    plans_seen: bool,

    all_ready: ValueObserver<bool>,
    error: ValueObserver<Option<String>>,
}

impl GenerationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute all states from a fresh timeline snapshot and publish
    /// `all_ready`/`error` when they changed. Repeated identical snapshots
    /// are no-ops.
    pub fn ingest(&mut self, timeline: &Timeline) {
        match timeline.plans.as_ref() {
            Some(plans) => {
                self.plans_seen = true;
                let mut next = HashMap::with_capacity(plans.len());
                for plan in plans {
                    let incoming = plan.status();
                    let merged = match self.plans.remove(&plan.id) {
                        Some(previous) if previous.is_terminal() && incoming.is_generating() => {
                            previous
                        }
                        _ => incoming,
                    };
                    next.insert(plan.id.clone(), merged);
                }
                // Plans absent from the snapshot are forgotten.
                self.plans = next;
            }
            None => {
                self.plans_seen = false;
                self.plans.clear();
            }
        }

        let segments = timeline.segments();
        let mut next_segments = Vec::with_capacity(segments.len());
        for (index, segment) in segments.iter().enumerate() {
            let incoming = segment.status();
            let merged = match self.segments.get(index) {
                Some(previous) if previous.is_terminal() && incoming.is_generating() => {
                    previous.clone()
                }
                _ => incoming,
            };
            next_segments.push(merged);
        }
        self.segments = next_segments;

        self.publish();
    }

    /// Re-arm a plan after an explicit regeneration request.
    pub fn reset(&mut self, plan_id: &PlanId) {
        if self.plans.remove(plan_id).is_some() {
            self.publish();
        }
    }

    pub fn status(&self, plan_id: &PlanId) -> Option<GenerationStatus> {
        self.plans.get(plan_id).cloned()
    }

    pub fn segment_status(&self, index: usize) -> Option<GenerationStatus> {
        self.segments.get(index).cloned()
    }

    /// True only when every plan and segment currently known is ready.
    pub fn is_all_ready(&self) -> bool {
        self.plans_seen
            && self.plans.values().all(GenerationStatus::is_ready)
            && self.segments.iter().all(GenerationStatus::is_ready)
    }

    /// Observes the aggregate readiness flag. No replay on subscribe.
    pub fn all_ready(&mut self) -> &mut ValueObserver<bool> {
        &mut self.all_ready
    }

    /// Observes the first unavailable status message, `None` once cleared.
    pub fn error(&mut self) -> &mut ValueObserver<Option<String>> {
        &mut self.error
    }

    fn current_error(&self) -> Option<String> {
        self.plans.values().chain(self.segments.iter()).find_map(|status| {
            match status {
                GenerationStatus::Unavailable { message } => Some(
                    message
                        .clone()
                        .unwrap_or_else(|| "recommendations unavailable".to_string()),
                ),
                _ => None,
            }
        })
    }

    fn publish(&mut self) {
        let ready = self.is_all_ready();
        if self.all_ready.value() != Some(&ready) {
            self.all_ready.set(ready);
        }

        let error = self.current_error();
        if self.error.value() != Some(&error) {
            self.error.set(error);
        }
    }
}
