//! Day-Agenda Builder.
//!
//! Merges one day's plan steps and activity segments onto a single time
//! axis and produces the ordered display rows. Pure: deterministic for a
//! given timeline snapshot and day index, no clock reads, no mutation.

use chrono::NaiveDate;

use crate::models::{
    Coordinate, GenerationStatus, Plan, Segment, SegmentType, Step, Timeline,
};
use crate::services::distance::{pair_slots, PairSlot};

crate::define_id_type!(u64, SnapshotId);

/// Whether the affected plan is the trip's first, last, or an interior day.
/// Selects the empty-day message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DayPosition {
    Arrival,
    Departure,
    MidTrip,
}

/// Placeholder row for a day with nothing to show.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EmptyState {
    pub position: DayPosition,
    /// Server-provided status message, shown verbatim when present.
    pub status_message: Option<String>,
}

impl EmptyState {
    pub fn message(&self) -> &str {
        if let Some(message) = &self.status_message {
            return message;
        }
        match self.position {
            DayPosition::Arrival => "no recommendations at arrival",
            DayPosition::Departure => "no recommendations at departure",
            DayPosition::MidTrip => "no recommendations for this day",
        }
    }
}

/// One display unit of a day's agenda.
///
/// Consecutive recommended stops are grouped into one collapsible block;
/// activity segments interleave between groups by wall-clock time.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum AgendaRow {
    RecommendationGroup(Vec<Step>),
    BookedActivity(Segment),
    ReservedActivity(Segment),
    EmptyState(EmptyState),
    Loading,
}

impl AgendaRow {
    /// Coordinate a traveler arrives at when reaching this row.
    pub fn entry_coordinate(&self) -> Option<Coordinate> {
        match self {
            AgendaRow::RecommendationGroup(steps) => steps.first().map(|s| s.poi.coordinate),
            AgendaRow::BookedActivity(segment) | AgendaRow::ReservedActivity(segment) => {
                segment.coordinate
            }
            AgendaRow::EmptyState(_) | AgendaRow::Loading => None,
        }
    }

    /// Coordinate a traveler departs from when leaving this row.
    pub fn exit_coordinate(&self) -> Option<Coordinate> {
        match self {
            AgendaRow::RecommendationGroup(steps) => steps.last().map(|s| s.poi.coordinate),
            AgendaRow::BookedActivity(segment) | AgendaRow::ReservedActivity(segment) => {
                segment.departure_coordinate()
            }
            AgendaRow::EmptyState(_) | AgendaRow::Loading => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, AgendaRow::EmptyState(_) | AgendaRow::Loading)
    }
}

/// Build the ordered row sequence for one day of the timeline.
///
/// Ordering key: a segment is inserted after the last step whose start
/// time precedes it and before the first step whose start time follows it.
/// On an identical start timestamp the segment wins: activities are fixed
/// commitments.
///
/// An out-of-range `day_index` yields an empty sequence.
pub fn build_day_agenda(timeline: &Timeline, day_index: usize) -> Vec<AgendaRow> {
    let Some(date) = timeline.date_for_day(day_index) else {
        return Vec::new();
    };

    let plan = timeline.plan_for_date(date);
    let steps = plan.map(Plan::ordered_steps).unwrap_or_default();
    let mut segments = timeline.segments_on(date).into_iter().peekable();

    let mut rows = Vec::new();
    let mut run: Vec<Step> = Vec::new();

    for step in steps {
        while let Some(segment) = segments.peek() {
            if segment.start <= step.start {
                flush_run(&mut rows, &mut run);
                if let Some(row) = activity_row(segment) {
                    rows.push(row);
                }
                segments.next();
            } else {
                break;
            }
        }
        run.push(step.clone());
    }
    flush_run(&mut rows, &mut run);
    for segment in segments {
        if let Some(row) = activity_row(segment) {
            rows.push(row);
        }
    }

    if rows.is_empty() {
        return vec![placeholder_row(timeline, plan, day_index)];
    }
    rows
}

fn flush_run(rows: &mut Vec<AgendaRow>, run: &mut Vec<Step>) {
    if !run.is_empty() {
        rows.push(AgendaRow::RecommendationGroup(std::mem::take(run)));
    }
}

fn activity_row(segment: &Segment) -> Option<AgendaRow> {
    match segment.segment_type {
        SegmentType::BookedActivity => Some(AgendaRow::BookedActivity(segment.clone())),
        SegmentType::ReservedActivity => Some(AgendaRow::ReservedActivity(segment.clone())),
        SegmentType::Itinerary => None,
    }
}

/// An empty day renders as a loading indicator while its plan is still
/// generating, and as an empty state otherwise.
fn placeholder_row(timeline: &Timeline, plan: Option<&Plan>, day_index: usize) -> AgendaRow {
    match plan.map(Plan::status) {
        Some(GenerationStatus::Generating) => AgendaRow::Loading,
        Some(GenerationStatus::Unavailable { message }) => AgendaRow::EmptyState(EmptyState {
            position: day_position(timeline, day_index),
            status_message: message,
        }),
        Some(GenerationStatus::Ready) | None => AgendaRow::EmptyState(EmptyState {
            position: day_position(timeline, day_index),
            status_message: None,
        }),
    }
}

fn day_position(timeline: &Timeline, day_index: usize) -> DayPosition {
    if day_index == 0 {
        DayPosition::Arrival
    } else if day_index + 1 >= timeline.day_count() {
        DayPosition::Departure
    } else {
        DayPosition::MidTrip
    }
}

/// One day's agenda snapshot: the rows plus the coordinate pair slots the
/// distance pipeline fills in. `snapshot` identifies this exact build;
/// pair indices are only valid for the snapshot that produced them.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DayAgenda {
    pub snapshot: SnapshotId,
    pub day_index: usize,
    pub date: NaiveDate,
    pub rows: Vec<AgendaRow>,
    pub pair_slots: Vec<PairSlot>,
}

impl DayAgenda {
    /// Build the agenda snapshot for a day, or `None` when the index does
    /// not resolve to a calendar date.
    pub fn build(timeline: &Timeline, day_index: usize, snapshot: SnapshotId) -> Option<Self> {
        let date = timeline.date_for_day(day_index)?;
        let rows = build_day_agenda(timeline, day_index);
        let pair_slots = pair_slots(&rows);
        Some(Self {
            snapshot,
            day_index,
            date,
            rows,
            pair_slots,
        })
    }
}
