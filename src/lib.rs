//! Temporal placement engine for a personal week/day/month planner.
//!
//! The core of the crate is [`PlannerEngine`]: it owns the placed blocks,
//! the bounded undo history, and the view configuration, and exposes the
//! snap/validate/commit pipeline plus the pure week/day/month projections
//! an external renderer consumes. Rendering, input widgets, and the
//! persisted-state backing store are external collaborators; the latter
//! plugs in through [`StateStore`].

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::engine::{
    BlockPatch, CreateBlock, PlannerEngine, Proposal, ViewParamsPatch,
};
pub use application::history::HISTORY_CAPACITY;
pub use application::projection::{
    DayBlockGeometry, MonthCell, ViewKind, WeekBlockGeometry, WeekSummary, project_day,
    project_month, project_week, start_of_week, week_summary,
};
pub use application::snap::{snap_candidate, snap_to_grid};
pub use application::validate::{PlacementError, validate};
pub use domain::models::{Candidate, Template, TimeBlock, ViewParams, decimal_to_hhmm};
pub use infrastructure::error::PlannerError;
pub use infrastructure::export::{export_csv, export_ics, export_json, import_json};
pub use infrastructure::state_store::{
    JsonFileStateStore, PersistedState, StateStore, decode_state, encode_state, load_or_default,
};
