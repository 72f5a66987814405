//! Google Distance Matrix HTTP adapter.
//!
//! The API caps the number of elements per request, so the location list is
//! cut into square batches and one request is made per (origin batch,
//! destination batch) pair. Batch pairs write disjoint sub-blocks and are
//! fetched in parallel; the matrix is only assembled once every batch has
//! come back.

use std::ops::Range;

use rayon::prelude::*;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::MatrixError;
use crate::model::Coordinate;
use crate::traits::{DistanceMatrixProvider, MatrixSource, TravelMatrices};

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/distancematrix/json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DistanceApiConfig {
    pub base_url: String,
    /// Locations per axis in one request; 6 keeps a request at 36 elements.
    pub batch_size: usize,
    pub timeout_secs: u64,
}

impl Default for DistanceApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            batch_size: 6,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DistanceApiClient {
    config: DistanceApiConfig,
    api_key: String,
    client: reqwest::blocking::Client,
}

/// One priced sub-block: `cells[r][c]` is `(meters, seconds)` for
/// `origins.start + r` to `destinations.start + c`, or `None` when the API
/// could not route that pair.
#[derive(Debug, Clone, PartialEq)]
struct Block {
    origins: Range<usize>,
    destinations: Range<usize>,
    cells: Vec<Vec<Option<(f64, f64)>>>,
}

impl DistanceApiClient {
    pub fn new(config: DistanceApiConfig, api_key: impl Into<String>) -> Result<Self, MatrixError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            config,
            api_key: api_key.into(),
            client,
        })
    }

    fn fetch_block(
        &self,
        locations: &[Coordinate],
        origins: Range<usize>,
        destinations: Range<usize>,
    ) -> Result<Block, MatrixError> {
        debug!(?origins, ?destinations, "requesting distance matrix batch");

        let body = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("origins", join_coordinates(&locations[origins.clone()])),
                ("destinations", join_coordinates(&locations[destinations.clone()])),
                ("mode", "driving".to_string()),
                ("departure_time", "now".to_string()),
                ("key", self.api_key.clone()),
            ])
            .send()?
            .error_for_status()?
            .text()?;
        let response: DistanceMatrixResponse = serde_json::from_str(&body)
            .map_err(|err| MatrixError::Malformed(format!("undecodable body: {}", err)))?;

        let cells = parse_cells(response, origins.len(), destinations.len())?;

        Ok(Block {
            origins,
            destinations,
            cells,
        })
    }
}

impl DistanceMatrixProvider for DistanceApiClient {
    fn matrices_for(&self, locations: &[Coordinate]) -> Result<TravelMatrices, MatrixError> {
        let n = locations.len();
        let mut matrices = TravelMatrices::zeroed(n, MatrixSource::Networked);
        if n == 0 {
            return Ok(matrices);
        }

        let ranges = batch_ranges(n, self.config.batch_size);
        let pairs: Vec<(Range<usize>, Range<usize>)> = ranges
            .iter()
            .flat_map(|origins| {
                ranges
                    .iter()
                    .map(move |destinations| (origins.clone(), destinations.clone()))
            })
            .collect();

        let blocks = pairs
            .into_par_iter()
            .map(|(origins, destinations)| self.fetch_block(locations, origins, destinations))
            .collect::<Result<Vec<_>, _>>()?;

        for block in blocks {
            for (r, row) in block.cells.iter().enumerate() {
                for (c, cell) in row.iter().enumerate() {
                    let i = block.origins.start + r;
                    let j = block.destinations.start + c;
                    match *cell {
                        Some((meters, seconds)) => {
                            matrices.distances_m[i][j] = meters;
                            matrices.durations_s[i][j] = seconds;
                        }
                        None if i != j => matrices.unpriced.push((i, j)),
                        None => {}
                    }
                }
            }
        }
        matrices.unpriced.sort_unstable();

        if !matrices.unpriced.is_empty() {
            warn!(pairs = matrices.unpriced.len(), "distance API could not route some pairs");
        }

        Ok(matrices)
    }
}

/// Split `0..n` into consecutive ranges of at most `size` (at least 1).
fn batch_ranges(n: usize, size: usize) -> Vec<Range<usize>> {
    let size = size.max(1);
    (0..n).step_by(size).map(|start| start..(start + size).min(n)).collect()
}

fn join_coordinates(locations: &[Coordinate]) -> String {
    locations
        .iter()
        .map(|c| format!("{:.6},{:.6}", c.lat, c.lng))
        .collect::<Vec<_>>()
        .join("|")
}

/// Validate a response against the requested block shape and extract
/// `(meters, seconds)` per element. Elements not marked `OK` come back as
/// `None`.
fn parse_cells(
    response: DistanceMatrixResponse,
    rows: usize,
    cols: usize,
) -> Result<Vec<Vec<Option<(f64, f64)>>>, MatrixError> {
    if response.status != "OK" {
        return Err(MatrixError::Api {
            status: response.status,
            message: response.error_message.unwrap_or_default(),
        });
    }
    if response.rows.len() != rows {
        return Err(MatrixError::Malformed(format!(
            "expected {} rows, got {}",
            rows,
            response.rows.len()
        )));
    }

    response
        .rows
        .into_iter()
        .map(|row| {
            if row.elements.len() != cols {
                return Err(MatrixError::Malformed(format!(
                    "expected {} elements per row, got {}",
                    cols,
                    row.elements.len()
                )));
            }
            Ok(row.elements.into_iter().map(ResponseElement::priced).collect())
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct DistanceMatrixResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    rows: Vec<ResponseRow>,
}

#[derive(Debug, Deserialize)]
struct ResponseRow {
    #[serde(default)]
    elements: Vec<ResponseElement>,
}

#[derive(Debug, Deserialize)]
struct ResponseElement {
    status: String,
    distance: Option<ValueField>,
    duration: Option<ValueField>,
    duration_in_traffic: Option<ValueField>,
}

#[derive(Debug, Deserialize)]
struct ValueField {
    value: f64,
}

impl ResponseElement {
    fn priced(self) -> Option<(f64, f64)> {
        if self.status != "OK" {
            return None;
        }
        let meters = self.distance?.value;
        let seconds = match self.duration_in_traffic {
            Some(traffic) if traffic.value > 0.0 => traffic.value,
            _ => self.duration.map(|d| d.value).unwrap_or(0.0),
        };
        Some((meters, seconds))
    }
}
