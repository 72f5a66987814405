//! Test fixtures for visit-planner.
//!
//! Provides:
//! - Approximate coordinates around Ichihara / Chiba for realistic days
//! - Builders for stops and requests

#![allow(dead_code)]

pub mod chiba_locations;

pub use chiba_locations::*;
