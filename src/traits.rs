//! Seams between the planner and its travel-cost sources.

use crate::error::MatrixError;
use crate::model::Coordinate;

/// Where a set of travel matrices came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixSource {
    /// Road distances and traffic-aware durations from the distance API.
    Networked,
    /// Great-circle distances at the fallback speed.
    Fallback,
}

/// Square distance (meters) and duration (seconds) matrices.
///
/// Indexed by the provided location order; index 0 is the depot. Pairs the
/// source could not price stay 0 in both matrices and are listed in
/// `unpriced`, so a 0 off the diagonal is only a free trip when its pair is
/// not listed there.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelMatrices {
    pub distances_m: Vec<Vec<f64>>,
    pub durations_s: Vec<Vec<f64>>,
    pub source: MatrixSource,
    /// Off-diagonal `(from, to)` pairs left unpriced, in row-major order.
    pub unpriced: Vec<(usize, usize)>,
}

impl TravelMatrices {
    pub fn zeroed(size: usize, source: MatrixSource) -> Self {
        Self {
            distances_m: vec![vec![0.0; size]; size],
            durations_s: vec![vec![0.0; size]; size],
            source,
            unpriced: Vec::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.distances_m.len()
    }

    pub fn is_priced(&self, from: usize, to: usize) -> bool {
        !self.unpriced.contains(&(from, to))
    }

    /// Distances for ordering stops: unpriced pairs cost `f64::INFINITY`, so
    /// they rank after every pair with a real price.
    pub fn routing_costs(&self) -> Vec<Vec<f64>> {
        let mut costs = self.distances_m.clone();
        for &(from, to) in &self.unpriced {
            if let Some(cell) = costs.get_mut(from).and_then(|row| row.get_mut(to)) {
                *cell = f64::INFINITY;
            }
        }
        costs
    }
}

/// Provides travel matrices for a set of locations.
pub trait DistanceMatrixProvider {
    fn matrices_for(&self, locations: &[Coordinate]) -> Result<TravelMatrices, MatrixError>;
}
