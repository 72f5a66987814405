//! visit-planner core
//!
//! Orders a day's field visits to keep travel short, then turns the order
//! into a timetable that respects lunch and per-stop do-not-enter windows.

pub mod config;
pub mod distance_api;
pub mod error;
pub mod export;
pub mod haversine;
pub mod matrix;
pub mod model;
pub mod optimizer;
pub mod planner;
pub mod schedule;
pub mod traits;

pub use config::PlannerConfig;
pub use error::{ConfigError, ExportError, MatrixError, PlanError};
pub use model::{Coordinate, Route, ScheduleEntry, Stop, TimeWindow};
pub use planner::{DayPlan, PlanRequest, PlanSummary, plan_day, plan_day_with};
