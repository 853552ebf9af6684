use chrono::{NaiveDate, NaiveDateTime};

use super::poi::Coordinate;
use super::profile::TravelerCounts;
use super::status::GenerationStatus;

/// Trip-level overlay variants.
///
/// `Itinerary` mirrors a generation-scope window; the two activity variants
/// are third-party bookings surfaced inside the day agenda.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SegmentType {
    Itinerary,
    BookedActivity,
    ReservedActivity,
}

/// Rich booking payload carried only by the activity variants.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ActivityDetails {
    pub activity_id: String,
    #[serde(default)]
    pub booking_id: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub cancellation_policy: Option<String>,
    #[serde(default)]
    pub participants: Option<u32>,
}

/// A trip-level overlay not expressed as plan/step pairs.
///
/// Booked and reserved segments are immutable from the client's
/// perspective: no reorder, no time edits, and removal only through an
/// upstream cancellation. `available == false` additionally blocks removal.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Segment {
    pub segment_type: SegmentType,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "super::time::serde_local")]
    pub start: NaiveDateTime,
    #[serde(with = "super::time::serde_local")]
    pub end: NaiveDateTime,
    #[serde(default)]
    pub coordinate: Option<Coordinate>,
    #[serde(default)]
    pub travelers: TravelerCounts,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub additional_data: Option<ActivityDetails>,
    /// Day-trip destination when the segment ends in another city.
    #[serde(default)]
    pub destination_coordinate: Option<Coordinate>,
    #[serde(default)]
    pub different_end_location: bool,
    #[serde(default = "default_generated")]
    pub generated_status: i32,
    #[serde(default)]
    pub status_message: Option<String>,
}

fn default_available() -> bool {
    true
}

fn default_generated() -> i32 {
    super::status::STATUS_READY
}

impl Segment {
    /// Generation-scope segment mirroring a profile's date window, as the
    /// manual "add plan" flow creates it.
    pub fn itinerary_for(profile: &super::profile::Profile) -> Self {
        use chrono::{Duration, NaiveTime};
        Segment {
            segment_type: SegmentType::Itinerary,
            title: format!("Itinerary - {}", profile.city.name),
            description: None,
            start: profile.start_date.and_time(NaiveTime::MIN),
            end: profile.end_date.and_time(NaiveTime::MIN) + Duration::seconds(86_399),
            coordinate: profile.city.coordinate,
            travelers: profile.travelers,
            available: true,
            additional_data: None,
            destination_coordinate: None,
            different_end_location: false,
            generated_status: super::status::STATUS_GENERATING,
            status_message: None,
        }
    }

    pub fn is_activity(&self) -> bool {
        matches!(
            self.segment_type,
            SegmentType::BookedActivity | SegmentType::ReservedActivity
        )
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn status(&self) -> GenerationStatus {
        GenerationStatus::from_code(self.generated_status, self.status_message.as_deref())
    }

    /// Coordinate a traveler departs from when leaving this segment.
    /// Day-trips to another city end at the destination coordinate.
    pub fn departure_coordinate(&self) -> Option<Coordinate> {
        if self.different_end_location {
            self.destination_coordinate.or(self.coordinate)
        } else {
            self.coordinate
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::time::parse_local;

    fn activity(segment_type: SegmentType) -> Segment {
        Segment {
            segment_type,
            title: "Sunset sail".to_string(),
            description: None,
            start: parse_local("2026-05-01T18:00:00").unwrap(),
            end: parse_local("2026-05-01T20:00:00").unwrap(),
            coordinate: Some(Coordinate::new(38.70, -9.15)),
            travelers: TravelerCounts::adults(2),
            available: true,
            additional_data: None,
            destination_coordinate: None,
            different_end_location: false,
            generated_status: crate::models::status::STATUS_READY,
            status_message: None,
        }
    }

    #[test]
    fn activity_variants_are_activities() {
        assert!(activity(SegmentType::BookedActivity).is_activity());
        assert!(activity(SegmentType::ReservedActivity).is_activity());
        assert!(!activity(SegmentType::Itinerary).is_activity());
    }

    #[test]
    fn day_trip_departs_from_destination() {
        let mut segment = activity(SegmentType::BookedActivity);
        segment.different_end_location = true;
        segment.destination_coordinate = Some(Coordinate::new(38.57, -9.41));
        assert_eq!(
            segment.departure_coordinate(),
            Some(Coordinate::new(38.57, -9.41))
        );
    }

    #[test]
    fn segment_type_serializes_camel_case() {
        let json = serde_json::to_value(activity(SegmentType::BookedActivity)).unwrap();
        assert_eq!(json["segment_type"], "bookedActivity");
    }
}
