//! End-to-end tests for the timeline engine over the in-memory repository.

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use tripline::models::time::parse_local;
use tripline::models::{
    City, Coordinate, Plan, PlanId, Poi, PoiId, Profile, Segment, SegmentType, Step, StepId,
    StepType, Timeline, TimelineId, TravelerCounts,
};
use tripline::repository::step::AddStepSpec;
use tripline::repository::TimelineRepository;
use tripline::services::AgendaRow;
use tripline::{EngineConfig, EngineRepositories, LocalRepository, TimelineEngine};

fn step(id: i64, order: u32, start: &str, end: &str) -> Step {
    Step {
        id: StepId(id),
        poi: Poi::new(
            PoiId(id + 100),
            format!("poi-{id}"),
            Coordinate::new(38.70 + id as f64 * 0.01, -9.10),
        )
        .with_category("museum"),
        score: 80.0,
        order,
        start: parse_local(start).unwrap(),
        end: parse_local(end).unwrap(),
        step_type: StepType::Poi,
        alternatives: None,
        warning: None,
    }
}

fn plan(id: &str, date: &str, status: i32, steps: Vec<Step>) -> Plan {
    Plan {
        id: PlanId::new(id),
        start: parse_local(&format!("{date}T00:00:00")).unwrap(),
        end: parse_local(&format!("{date}T23:59:59")).unwrap(),
        steps,
        generated_status: status,
        status_message: None,
        name: Some(format!("Day {date}")),
        description: None,
        travelers: TravelerCounts::adults(2),
        city: None,
        accommodation: None,
    }
}

fn booked_activity(start: &str, end: &str) -> Segment {
    Segment {
        segment_type: SegmentType::BookedActivity,
        title: "River cruise".to_string(),
        description: None,
        start: parse_local(start).unwrap(),
        end: parse_local(end).unwrap(),
        coordinate: Some(Coordinate::new(38.72, -9.14)),
        travelers: TravelerCounts::adults(2),
        available: true,
        additional_data: None,
        destination_coordinate: None,
        different_end_location: false,
        generated_status: 1,
        status_message: None,
    }
}

fn three_step_timeline() -> Timeline {
    Timeline {
        id: TimelineId(1),
        trip_hash: "trip-1".to_string(),
        profile: None,
        city: City::named("Lisbon"),
        plans: Some(vec![plan(
            "p1",
            "2026-05-01",
            1,
            vec![
                step(3, 0, "2026-05-01T09:00:00", "2026-05-01T10:00:00"),
                step(4, 1, "2026-05-01T12:00:00", "2026-05-01T13:00:00"),
                step(5, 2, "2026-05-01T17:00:00", "2026-05-01T18:00:00"),
            ],
        )]),
        segments: Some(vec![]),
    }
}

async fn engine_with(timeline: Timeline, config: EngineConfig) -> (TimelineEngine, LocalRepository) {
    let repo = LocalRepository::new();
    repo.insert_timeline(timeline.clone());
    let mut engine = TimelineEngine::new(
        EngineRepositories::local(repo.clone()),
        config,
        timeline.trip_hash.clone(),
    );
    engine.start().await.unwrap();
    (engine, repo)
}

fn step_ids(engine: &TimelineEngine) -> Vec<i64> {
    engine
        .timeline()
        .unwrap()
        .plans()
        .first()
        .unwrap()
        .steps
        .iter()
        .map(|s| s.id.value())
        .collect()
}

fn orders(engine: &TimelineEngine) -> Vec<u32> {
    engine
        .timeline()
        .unwrap()
        .plans()
        .first()
        .unwrap()
        .steps
        .iter()
        .map(|s| s.order)
        .collect()
}

#[tokio::test]
async fn reorder_moves_step_and_renumbers_densely() {
    let (mut engine, repo) = engine_with(three_step_timeline(), EngineConfig::default()).await;

    assert!(engine.reorder_step(StepId(5), 0).await);
    assert_eq!(step_ids(&engine), vec![5, 3, 4]);
    assert_eq!(orders(&engine), vec![0, 1, 2]);

    // Confirmation reached the repository.
    let stored = repo.fetch_timeline("trip-1").await.unwrap();
    let stored_ids: Vec<i64> = stored.plans()[0].steps.iter().map(|s| s.id.value()).collect();
    assert_eq!(stored_ids, vec![5, 3, 4]);
}

#[tokio::test]
async fn reorder_applies_leading_row_offset() {
    let config = EngineConfig {
        leading_rows: 1,
        ..EngineConfig::default()
    };
    let (mut engine, _repo) = engine_with(three_step_timeline(), config).await;

    // Display index 1 is the first real slot when one synthetic row leads.
    assert!(engine.reorder_step(StepId(5), 1).await);
    assert_eq!(step_ids(&engine), vec![5, 3, 4]);

    // Display index 0 clamps to the same position instead of underflowing.
    assert!(engine.reorder_step(StepId(4), 0).await);
    assert_eq!(step_ids(&engine), vec![4, 5, 3]);
}

#[tokio::test]
async fn reorder_of_unknown_step_is_refused() {
    let (mut engine, _repo) = engine_with(three_step_timeline(), EngineConfig::default()).await;
    assert!(!engine.reorder_step(StepId(99), 0).await);
    assert_eq!(step_ids(&engine), vec![3, 4, 5]);
}

#[tokio::test]
async fn remove_step_preserves_relative_order() {
    let (mut engine, _repo) = engine_with(three_step_timeline(), EngineConfig::default()).await;

    assert!(engine.remove_step(StepId(4)).await);
    assert_eq!(step_ids(&engine), vec![3, 5]);
    // Orders keep their gap; relative order is what matters.
    assert_eq!(orders(&engine), vec![0, 2]);
}

#[tokio::test]
async fn change_step_time_does_not_reorder() {
    let (mut engine, _repo) = engine_with(three_step_timeline(), EngineConfig::default()).await;

    // Move the first step's time past everything else; position stays.
    assert!(
        engine
            .change_step_time(
                StepId(3),
                parse_local("2026-05-01T21:00:00").unwrap(),
                parse_local("2026-05-01T22:00:00").unwrap(),
            )
            .await
    );
    assert_eq!(step_ids(&engine), vec![3, 4, 5]);
}

#[tokio::test]
async fn add_step_swaps_provisional_for_confirmed_id() {
    let (mut engine, _repo) = engine_with(three_step_timeline(), EngineConfig::default()).await;

    let spec = AddStepSpec {
        plan_id: PlanId::new("p1"),
        poi: Poi::new(PoiId(500), "Custom stop", Coordinate::new(38.73, -9.16)),
        date: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
        start: parse_local("2026-05-01T19:00:00").unwrap(),
        end: parse_local("2026-05-01T20:00:00").unwrap(),
        step_type: StepType::Poi,
    };
    assert!(engine.add_step(spec).await);

    let ids = step_ids(&engine);
    assert_eq!(ids.len(), 4);
    // The confirmed id is repository-assigned and positive.
    assert!(*ids.last().unwrap() > 0);
    assert_eq!(orders(&engine), vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn failed_confirmation_keeps_optimistic_edit_and_reports_error() {
    let (mut engine, repo) = engine_with(three_step_timeline(), EngineConfig::default()).await;

    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&errors);
    engine
        .error_observer()
        .add_observer("test", move |e: &Option<String>| {
            sink.lock().unwrap().push(e.clone());
        });

    repo.set_healthy(false);
    assert!(engine.reorder_step(StepId(5), 0).await);

    // Local edit survives; the failure is surfaced, not rolled back.
    assert_eq!(step_ids(&engine), vec![5, 3, 4]);
    let seen = errors.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].as_deref().unwrap().contains("Connection error"));
}

#[tokio::test]
async fn mutation_republishes_agenda() {
    let (mut engine, _repo) = engine_with(three_step_timeline(), EngineConfig::default()).await;

    let published = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&published);
    engine
        .agenda_observer()
        .add_observer("test", move |agenda: &tripline::DayAgenda| {
            sink.lock().unwrap().push(agenda.snapshot);
        });

    engine.remove_step(StepId(4)).await;
    let snapshots = published.lock().unwrap();
    assert_eq!(snapshots.len(), 1);
}

#[tokio::test]
async fn agenda_interleaves_booked_activity() {
    let mut timeline = three_step_timeline();
    timeline.segments = Some(vec![booked_activity(
        "2026-05-01T14:00:00",
        "2026-05-01T16:00:00",
    )]);
    let (engine, _repo) = engine_with(timeline, EngineConfig::default()).await;

    let rows = &engine.agenda().unwrap().rows;
    assert_eq!(rows.len(), 3);
    assert!(matches!(&rows[0], AgendaRow::RecommendationGroup(steps) if steps.len() == 2));
    assert!(matches!(rows[1], AgendaRow::BookedActivity(_)));
    assert!(matches!(&rows[2], AgendaRow::RecommendationGroup(steps) if steps.len() == 1));
}

#[tokio::test]
async fn distances_fill_pair_slots_and_publish_deltas() {
    let mut timeline = three_step_timeline();
    timeline.segments = Some(vec![booked_activity(
        "2026-05-01T14:00:00",
        "2026-05-01T16:00:00",
    )]);
    let config = EngineConfig {
        auto_distances: false,
        ..EngineConfig::default()
    };
    let (mut engine, _repo) = engine_with(timeline, config).await;

    let updates = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&updates);
    engine
        .distance_observer()
        .add_observer("test", move |u: &tripline::services::DistanceUpdate| {
            sink.lock().unwrap().push(u.pair_index);
        });

    let applied = engine.refresh_distances().await;
    assert_eq!(applied, 2);
    assert_eq!(*updates.lock().unwrap(), vec![0, 1]);
    assert!(engine
        .agenda()
        .unwrap()
        .pair_slots
        .iter()
        .all(|slot| slot.leg.is_some()));
}

#[tokio::test]
async fn stale_distance_result_does_not_touch_rebuilt_agenda() {
    let mut timeline = three_step_timeline();
    timeline.segments = Some(vec![booked_activity(
        "2026-05-01T14:00:00",
        "2026-05-01T16:00:00",
    )]);
    let config = EngineConfig {
        auto_distances: false,
        ..EngineConfig::default()
    };
    let (mut engine, _repo) = engine_with(timeline, config).await;

    let stale_requests = engine.distance_requests();
    assert!(!stale_requests.is_empty());

    // A mutation rebuilds the agenda under a new snapshot id.
    engine.remove_step(StepId(4)).await;

    let leg = tripline::repository::RouteLeg {
        distance_meters: 1000.0,
        duration_seconds: 700.0,
    };
    assert!(!engine.apply_distance(&stale_requests[0], leg));
    assert!(engine
        .agenda()
        .unwrap()
        .pair_slots
        .iter()
        .all(|slot| slot.leg.is_none()));
}

#[tokio::test]
async fn generation_flow_from_create_to_ready() {
    let repo = LocalRepository::new();
    let profile = Profile {
        city: City::named("Lisbon"),
        start_date: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 5, 2).unwrap(),
        travelers: TravelerCounts::adults(2),
        interests: vec![],
    };

    let mut engine = TimelineEngine::create(
        EngineRepositories::local(repo.clone()),
        EngineConfig::default(),
        &profile,
    )
    .await
    .unwrap();

    let ready_flags = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&ready_flags);
    engine
        .all_generated_observer()
        .add_observer("test", move |v: &bool| sink.lock().unwrap().push(*v));

    // Fresh trips have no plans yet, so no agenda either.
    assert!(engine.timeline().unwrap().plans.is_none());
    assert!(engine.agenda().is_none());

    // Generation starts: one generating day appears.
    repo.set_plans(engine.trip_hash(), vec![plan("p1", "2026-05-01", 0, vec![])]);
    engine.refresh().await.unwrap();
    assert_eq!(engine.agenda().unwrap().rows, vec![AgendaRow::Loading]);

    // Generation finishes with content.
    repo.set_plans(
        engine.trip_hash(),
        vec![plan(
            "p1",
            "2026-05-01",
            0,
            vec![step(1, 0, "2026-05-01T09:00:00", "2026-05-01T10:00:00")],
        )],
    );
    repo.finish_generation(engine.trip_hash());
    engine.refresh().await.unwrap();

    // The initial `false` predates the subscription (no replay), so only
    // the flip to `true` is observed.
    assert_eq!(*ready_flags.lock().unwrap(), vec![true]);
    assert!(matches!(
        engine.agenda().unwrap().rows[0],
        AgendaRow::RecommendationGroup(_)
    ));
}

#[tokio::test]
async fn select_day_rejects_out_of_range_index() {
    let (mut engine, _repo) = engine_with(three_step_timeline(), EngineConfig::default()).await;
    assert!(!engine.select_day(3));
    assert_eq!(engine.selected_day(), 0);
    assert!(engine.select_day(0));
}

#[tokio::test]
async fn alternatives_come_from_poi_search_minus_own_poi() {
    let (mut engine, repo) = engine_with(three_step_timeline(), EngineConfig::default()).await;
    repo.seed_pois(vec![
        Poi::new(PoiId(103), "poi-3", Coordinate::new(38.7, -9.1)).with_category("museum"),
        Poi::new(PoiId(900), "Maritime Museum", Coordinate::new(38.69, -9.2))
            .with_category("museum"),
        Poi::new(PoiId(901), "Tile Museum", Coordinate::new(38.72, -9.11)).with_category("museum"),
    ]);

    let alternatives = engine.request_alternatives(StepId(3)).await.unwrap();
    let ids: Vec<i64> = alternatives.iter().map(|p| p.id.value()).collect();
    assert_eq!(ids, vec![900, 901]);

    let stored = engine
        .timeline()
        .unwrap()
        .plans()[0]
        .step(StepId(3))
        .unwrap()
        .alternatives
        .clone();
    assert_eq!(stored.unwrap().len(), 2);
}

#[tokio::test]
async fn remove_segment_respects_availability() {
    let mut timeline = three_step_timeline();
    let mut locked = booked_activity("2026-05-01T14:00:00", "2026-05-01T16:00:00");
    locked.available = false;
    timeline.segments = Some(vec![
        locked,
        booked_activity("2026-05-01T18:30:00", "2026-05-01T20:00:00"),
    ]);
    let (mut engine, _repo) = engine_with(timeline, EngineConfig::default()).await;

    assert!(!engine.remove_segment(0).await);
    assert_eq!(engine.timeline().unwrap().segments().len(), 2);

    assert!(engine.remove_segment(1).await);
    assert_eq!(engine.timeline().unwrap().segments().len(), 1);
}

#[tokio::test]
async fn export_day_renders_itinerary() {
    let (engine, _repo) = engine_with(three_step_timeline(), EngineConfig::default()).await;
    let exported = engine.export_day(&PlanId::new("p1")).await.unwrap();
    assert!(exported.contains("09:00 poi-3"));
    assert!(exported.contains("17:00 poi-5"));
}
