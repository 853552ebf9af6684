//! tripline: trip timeline aggregation and generation-state engine.
//!
//! Reconciles several independently-arriving sources of truth about a
//! traveler's trip (generated daily plans, booked and reserved
//! activities, manually inserted stops) into one canonical, time-ordered
//! per-day agenda, while generation is still completing in the background
//! and route distances arrive even later, out of band.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Presentation (out of scope)                            │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │ observers / commands
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  TimelineEngine (engine/), single owner per trip        │
//! │  - mutation coordinator, day selection, observers       │
//! └──────┬──────────────────────┬───────────────────────────┘
//!        │                      │
//! ┌──────▼───────────┐  ┌───────▼─────────────────────────┐
//! │ Services         │  │ Repositories (repository/)      │
//! │ - agenda builder │  │ - timeline / plan / step / poi  │
//! │ - gen. tracker   │  │ - route provider                │
//! │ - distances      │  │ - in-memory local impl          │
//! └──────────────────┘  └─────────────────────────────────┘
//! ```
//!
//! The engine performs no I/O of its own: repositories are async external
//! collaborators, and all state lives in the [`models`] records.

pub mod config;
pub mod engine;
pub mod io;
pub mod models;
pub mod observer;
pub mod repository;
pub mod services;

pub use config::EngineConfig;
pub use engine::{EngineRepositories, TimelineEngine};
pub use models::{
    City, Coordinate, GenerationStatus, Plan, PlanId, Poi, PoiId, Profile, Segment, SegmentType,
    Step, StepId, StepType, Timeline, TimelineId, TravelerCounts,
};
pub use observer::ValueObserver;
pub use repository::{LocalRepository, RepositoryError, RepositoryResult};
pub use services::{build_day_agenda, AgendaRow, DayAgenda};
