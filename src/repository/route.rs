//! Route/distance provider boundary.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::Coordinate;

/// Distance and travel time between two agenda stops.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RouteLeg {
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

/// Provider of route distance/time between two coordinates.
///
/// Single attempt, fallible; callers decide whether a failed leg is worth
/// retrying.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn route(&self, from: &Coordinate, to: &Coordinate) -> RepositoryResult<RouteLeg>;
}

/// Deterministic provider using great-circle distance and a fixed walking
/// speed. Used by tests and local development; production wires a real
/// routing service.
#[derive(Debug, Clone)]
pub struct HaversineRouteProvider {
    speed_mps: f64,
}

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;
const DEFAULT_WALKING_SPEED_MPS: f64 = 1.4;

impl HaversineRouteProvider {
    pub fn new() -> Self {
        Self {
            speed_mps: DEFAULT_WALKING_SPEED_MPS,
        }
    }

    pub fn with_speed(speed_mps: f64) -> Self {
        Self { speed_mps }
    }

    pub fn distance_meters(from: &Coordinate, to: &Coordinate) -> f64 {
        let lat1 = from.lat.to_radians();
        let lat2 = to.lat.to_radians();
        let dlat = (to.lat - from.lat).to_radians();
        let dlon = (to.lon - from.lon).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_METERS * c
    }
}

impl Default for HaversineRouteProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RouteProvider for HaversineRouteProvider {
    async fn route(&self, from: &Coordinate, to: &Coordinate) -> RepositoryResult<RouteLeg> {
        let distance_meters = Self::distance_meters(from, to);
        Ok(RouteLeg {
            distance_meters,
            duration_seconds: distance_meters / self.speed_mps,
        })
    }
}
