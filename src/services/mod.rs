//! Service layer: pure computation over timeline snapshots.
//!
//! The agenda builder, the generation tracker and the distance pipeline
//! never perform I/O; orchestration against the repositories lives in the
//! engine.

pub mod agenda;
pub mod distance;
pub mod generation;

pub use agenda::{build_day_agenda, AgendaRow, DayAgenda, DayPosition, EmptyState, SnapshotId};
pub use distance::{DistanceRequest, DistanceUpdate, PairSlot};
pub use generation::GenerationTracker;
