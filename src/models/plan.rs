use chrono::{NaiveDate, NaiveDateTime};

use super::poi::City;
use super::profile::TravelerCounts;
use super::status::GenerationStatus;
use super::step::{Step, StepId};

/// Server-assigned, day-scoped plan identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PlanId(pub String);

impl PlanId {
    pub fn new(value: impl Into<String>) -> Self {
        PlanId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlanId {
    fn from(v: &str) -> Self {
        PlanId(v.to_string())
    }
}

/// Reference to booked accommodation shown alongside a plan.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AccommodationRef {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
}

/// One calendar day of the (possibly still-generating) recommendation.
///
/// `steps` is ordered by `order` ascending. An empty `steps` with
/// `generated_status == 0` means "still generating", not "empty day".
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Plan {
    pub id: PlanId,
    #[serde(with = "super::time::serde_local")]
    pub start: NaiveDateTime,
    #[serde(with = "super::time::serde_local")]
    pub end: NaiveDateTime,
    pub steps: Vec<Step>,
    pub generated_status: i32,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub travelers: TravelerCounts,
    #[serde(default)]
    pub city: Option<City>,
    #[serde(default)]
    pub accommodation: Option<AccommodationRef>,
}

impl Plan {
    pub fn status(&self) -> GenerationStatus {
        GenerationStatus::from_code(self.generated_status, self.status_message.as_deref())
    }

    /// Calendar date this plan covers.
    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn step(&self, id: StepId) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    pub fn step_mut(&mut self, id: StepId) -> Option<&mut Step> {
        self.steps.iter_mut().find(|s| s.id == id)
    }

    /// Steps sorted by their `order` field. The stored collection is kept
    /// ordered, so this is usually an identity copy.
    pub fn ordered_steps(&self) -> Vec<&Step> {
        let mut steps: Vec<&Step> = self.steps.iter().collect();
        steps.sort_by_key(|s| s.order);
        steps
    }

    /// Mean relevance score across steps, if any.
    pub fn average_score(&self) -> Option<f64> {
        if self.steps.is_empty() {
            return None;
        }
        let total: f64 = self.steps.iter().map(|s| s.score).sum();
        Some(total / self.steps.len() as f64)
    }
}
