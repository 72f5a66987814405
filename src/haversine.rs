//! Great-circle distances and the analytic fallback matrix.
//!
//! Ignores the road network, so it underestimates real driving distance,
//! but it is always available and needs no credential.

use crate::error::MatrixError;
use crate::model::Coordinate;
use crate::traits::{DistanceMatrixProvider, MatrixSource, TravelMatrices};

/// Assumed average driving speed whenever travel time is estimated from
/// straight-line distance.
pub const FALLBACK_SPEED_KMH: f64 = 30.0;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points in kilometers.
pub fn distance_km(from: Coordinate, to: Coordinate) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Travel time in seconds for `km` at the fallback speed.
pub fn travel_seconds(km: f64) -> f64 {
    km * 3600.0 / FALLBACK_SPEED_KMH
}

/// Whole minutes of travel for `km` at the fallback speed (truncated).
pub fn travel_minutes(km: f64) -> u32 {
    (travel_seconds(km) / 60.0) as u32
}

/// Haversine-based matrix provider used when the distance API is unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct HaversineMatrix;

impl HaversineMatrix {
    pub fn build(locations: &[Coordinate]) -> TravelMatrices {
        let n = locations.len();
        let mut matrices = TravelMatrices::zeroed(n, MatrixSource::Fallback);

        for (i, from) in locations.iter().enumerate() {
            for (j, to) in locations.iter().enumerate() {
                if i != j {
                    let km = distance_km(*from, *to);
                    matrices.distances_m[i][j] = km * 1000.0;
                    matrices.durations_s[i][j] = travel_seconds(km);
                }
            }
        }

        matrices
    }
}

impl DistanceMatrixProvider for HaversineMatrix {
    fn matrices_for(&self, locations: &[Coordinate]) -> Result<TravelMatrices, MatrixError> {
        Ok(Self::build(locations))
    }
}
