//! Plan repository trait.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use super::error::RepositoryResult;
use crate::models::{Plan, PlanId, StepId};

/// One entry of a step-order confirmation, mirroring the dense renumbering
/// applied locally by the mutation coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StepOrder {
    pub step_id: StepId,
    pub order: u32,
}

/// Repository for per-day plan operations.
#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// Fetch a single plan by its server-assigned id.
    async fn fetch_plan(&self, plan_id: &PlanId) -> RepositoryResult<Plan>;

    /// Change a plan's day window.
    async fn edit_plan_hours(
        &self,
        plan_id: &PlanId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> RepositoryResult<bool>;

    /// Confirm a reordering of the plan's steps.
    async fn edit_plan_step_order(
        &self,
        plan_id: &PlanId,
        orders: &[StepOrder],
    ) -> RepositoryResult<bool>;

    /// Export one day's itinerary as a shareable document.
    async fn export_itinerary(&self, plan_id: &PlanId, trip_hash: &str)
        -> RepositoryResult<String>;
}
