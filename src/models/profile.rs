use chrono::NaiveDate;

use super::poi::City;

/// Party size for a trip or segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TravelerCounts {
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
}

impl TravelerCounts {
    pub fn adults(count: u32) -> Self {
        Self {
            adults: count,
            children: 0,
        }
    }

    pub fn total(&self) -> u32 {
        self.adults + self.children
    }
}

/// Generation scope a timeline (or itinerary segment) is created from:
/// destination, date window, party size, and stated interests.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Profile {
    pub city: City,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub travelers: TravelerCounts,
    #[serde(default)]
    pub interests: Vec<String>,
}

impl Profile {
    /// Number of calendar days the profile spans, inclusive of both ends.
    pub fn day_count(&self) -> usize {
        let days = (self.end_date - self.start_date).num_days();
        if days < 0 {
            0
        } else {
            days as usize + 1
        }
    }
}
