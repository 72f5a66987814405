//! Networked-or-fallback selection of travel matrices.
//!
//! A request is priced either entirely by the distance API or entirely by
//! great-circle estimates, never a mix of the two.

use tracing::{info, warn};

use crate::distance_api::{DistanceApiClient, DistanceApiConfig};
use crate::haversine::HaversineMatrix;
use crate::model::Coordinate;
use crate::traits::{DistanceMatrixProvider, TravelMatrices};

/// Which branch prices a request.
#[derive(Debug)]
pub enum MatrixStrategy {
    Networked(DistanceApiClient),
    Fallback,
}

impl MatrixStrategy {
    /// Networked when a non-blank credential is present and the HTTP client
    /// can be built; fallback otherwise.
    pub fn select(credential: Option<&str>, api: &DistanceApiConfig) -> Self {
        let Some(key) = credential.map(str::trim).filter(|key| !key.is_empty()) else {
            return MatrixStrategy::Fallback;
        };

        match DistanceApiClient::new(api.clone(), key) {
            Ok(client) => MatrixStrategy::Networked(client),
            Err(err) => {
                warn!(%err, "could not build distance API client; using straight-line distances");
                MatrixStrategy::Fallback
            }
        }
    }

    pub fn compute(&self, locations: &[Coordinate]) -> TravelMatrices {
        match self {
            MatrixStrategy::Networked(client) => with_fallback(client, locations),
            MatrixStrategy::Fallback => {
                info!(locations = locations.len(), "pricing with straight-line distances at 30 km/h");
                HaversineMatrix::build(locations)
            }
        }
    }
}

/// Price `locations` with the configured strategy.
pub fn compute(
    locations: &[Coordinate],
    credential: Option<&str>,
    api: &DistanceApiConfig,
) -> TravelMatrices {
    MatrixStrategy::select(credential, api).compute(locations)
}

/// Ask `provider`; on any error, or a result of the wrong size, discard it and
/// return the fallback matrices.
pub fn with_fallback<P: DistanceMatrixProvider + ?Sized>(
    provider: &P,
    locations: &[Coordinate],
) -> TravelMatrices {
    match provider.matrices_for(locations) {
        Ok(matrices) if is_square(&matrices, locations.len()) => matrices,
        Ok(matrices) => {
            warn!(
                expected = locations.len(),
                actual = matrices.size(),
                "distance lookup returned a matrix of the wrong size; using straight-line distances"
            );
            HaversineMatrix::build(locations)
        }
        Err(err) => {
            warn!(%err, "distance lookup failed; using straight-line distances at 30 km/h");
            HaversineMatrix::build(locations)
        }
    }
}

fn is_square(matrices: &TravelMatrices, n: usize) -> bool {
    matrices.distances_m.len() == n
        && matrices.durations_s.len() == n
        && matrices.distances_m.iter().all(|row| row.len() == n)
        && matrices.durations_s.iter().all(|row| row.len() == n)
}
