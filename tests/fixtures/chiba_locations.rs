//! Station-area coordinates around Ichihara and Chiba for realistic fixtures.
//!
//! Coordinates are approximate (station squares, rounded to four decimals);
//! only their relative layout matters to the tests.

use chrono::NaiveDate;

use visit_planner::{Coordinate, PlanRequest, Stop};

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

/// Office the day starts from.
pub const DEPOT: Location = Location::new("Ichihara office", 35.534222, 140.111557);

// ============================================================================
// Coastal line (Uchibo)
// ============================================================================

pub const COASTAL: &[Location] = &[
    Location::new("Yawatajuku", 35.5608, 140.0925),
    Location::new("Goi", 35.5125, 140.0886),
    Location::new("Anegasaki", 35.4744, 140.0447),
    Location::new("Nagaura", 35.4400, 139.9931),
];

// ============================================================================
// Inland / Chiba city
// ============================================================================

pub const INLAND: &[Location] = &[
    Location::new("Soga", 35.5817, 140.1308),
    Location::new("Chiba", 35.6130, 140.1134),
    Location::new("Kamatori", 35.6190, 140.1890),
    Location::new("Kazusa-Ushiku", 35.3920, 140.1460),
    Location::new("Ichihara city hall", 35.4981, 140.1157),
];

/// Returns all locations as a single list.
pub fn all_locations() -> Vec<Location> {
    let mut all = Vec::with_capacity(COASTAL.len() + INLAND.len());
    all.extend_from_slice(COASTAL);
    all.extend_from_slice(INLAND);
    all
}

/// One stop per location, ids `S01`, `S02`, ...
pub fn stops(locations: &[Location]) -> Vec<Stop> {
    locations
        .iter()
        .enumerate()
        .map(|(i, loc)| {
            let mut stop = Stop::new(format!("S{:02}", i + 1), loc.name, loc.coords());
            stop.projected_value = 1_000 * (i as u64 + 1);
            stop
        })
        .collect()
}

pub fn visit_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
}

pub fn request(stops: Vec<Stop>) -> PlanRequest {
    PlanRequest {
        visit_date: visit_date(),
        origin: DEPOT.coords(),
        stops,
        must_first: Vec::new(),
    }
}

#[test]
fn test_coordinates_in_chiba_area() {
    for loc in all_locations() {
        assert!(loc.lat > 35.3 && loc.lat < 35.7, "{} lat out of range: {}", loc.name, loc.lat);
        assert!(loc.lng > 139.9 && loc.lng < 140.3, "{} lng out of range: {}", loc.name, loc.lng);
    }
}
