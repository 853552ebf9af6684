//! Step repository trait.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use super::error::RepositoryResult;
use crate::models::{PlanId, Poi, Step, StepId, StepType};

/// Request to append a stop to a plan. The caller supplies the POI, either
/// one resolved through search or a custom one it constructed, and the
/// repository assigns the final step id and order.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AddStepSpec {
    pub plan_id: PlanId,
    pub poi: Poi,
    pub date: NaiveDate,
    #[serde(with = "crate::models::time::serde_local")]
    pub start: NaiveDateTime,
    #[serde(with = "crate::models::time::serde_local")]
    pub end: NaiveDateTime,
    pub step_type: StepType,
}

/// Request to re-time an existing stop.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EditStepSpec {
    pub step_id: StepId,
    #[serde(with = "crate::models::time::serde_local")]
    pub start: NaiveDateTime,
    #[serde(with = "crate::models::time::serde_local")]
    pub end: NaiveDateTime,
}

/// Repository for step-level mutations.
#[async_trait]
pub trait StepRepository: Send + Sync {
    /// Append a step to a plan.
    ///
    /// # Returns
    /// * `Ok(Step)` - the created step with its final id and order
    async fn add_step(&self, spec: &AddStepSpec) -> RepositoryResult<Step>;

    /// Delete a step.
    async fn delete_step(&self, step_id: StepId) -> RepositoryResult<bool>;

    /// Update a step's start/end times.
    async fn edit_step(&self, spec: &EditStepSpec) -> RepositoryResult<bool>;
}
