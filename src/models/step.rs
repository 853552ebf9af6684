use chrono::{Duration, NaiveDateTime};

use super::poi::Poi;

crate::define_id_type!(i64, StepId);

/// Discriminates plain recommended stops from bookable activities (the
/// latter carry a reservation affordance in presentation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    Poi,
    Activity,
}

/// One recommended stop inside a plan.
///
/// `order` is zero-based and defines the chronological position within the
/// plan. It is kept dense by reordering, but consumers only rely on the
/// relative ordering, so a gap left by a removal is harmless.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Step {
    pub id: StepId,
    pub poi: Poi,
    /// Relevance score assigned by generation, 0-100.
    pub score: f64,
    pub order: u32,
    #[serde(with = "super::time::serde_local")]
    pub start: NaiveDateTime,
    #[serde(with = "super::time::serde_local")]
    pub end: NaiveDateTime,
    pub step_type: StepType,
    #[serde(default)]
    pub alternatives: Option<Vec<Poi>>,
    #[serde(default)]
    pub warning: Option<String>,
}

impl Step {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_activity(&self) -> bool {
        self.step_type == StepType::Activity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::poi::{Coordinate, PoiId};
    use crate::models::time::parse_local;

    fn step_at(start: &str, end: &str) -> Step {
        Step {
            id: StepId(1),
            poi: Poi::new(PoiId(10), "Alfama", Coordinate::new(38.71, -9.13)),
            score: 88.0,
            order: 0,
            start: parse_local(start).unwrap(),
            end: parse_local(end).unwrap(),
            step_type: StepType::Poi,
            alternatives: None,
            warning: None,
        }
    }

    #[test]
    fn duration_is_end_minus_start() {
        let step = step_at("2026-05-01T09:00:00", "2026-05-01T10:30:00");
        assert_eq!(step.duration(), Duration::minutes(90));
    }

    #[test]
    fn step_type_serializes_lowercase() {
        let step = step_at("2026-05-01T09:00:00", "2026-05-01T10:00:00");
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["step_type"], "poi");
        assert!(!step.is_activity());
    }
}
