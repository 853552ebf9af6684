crate::define_id_type!(i64, PoiId);

/// Geographic coordinate (decimal degrees).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Destination city a timeline or plan is scoped to.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct City {
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub coordinate: Option<Coordinate>,
}

impl City {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            country: None,
            coordinate: None,
        }
    }
}

/// Point of interest referenced by steps.
///
/// Steps reference POIs by value here, but identity is the `id`: derivations
/// such as [`crate::models::Timeline::pois`] deduplicate on it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Poi {
    pub id: PoiId,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    pub coordinate: Coordinate,
}

impl Poi {
    pub fn new(id: PoiId, name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            id,
            name: name.into(),
            category: None,
            coordinate,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}
