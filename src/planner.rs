//! One planning request end to end: validate, price, order, time-stamp.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::PlannerConfig;
use crate::error::PlanError;
use crate::haversine::HaversineMatrix;
use crate::matrix::{self, MatrixStrategy};
use crate::model::{Coordinate, Route, ScheduleEntry, Stop};
use crate::optimizer::{OptimizeOptions, optimize};
use crate::schedule::{ScheduleParams, simulate};
use crate::traits::{DistanceMatrixProvider, MatrixSource, TravelMatrices};

/// Stops to visit on one day, starting from `origin`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlanRequest {
    pub visit_date: NaiveDate,
    pub origin: Coordinate,
    #[serde(default)]
    pub stops: Vec<Stop>,
    /// Stop ids to visit before all others, in addition to stops flagged
    /// `must_visit_first`.
    #[serde(default)]
    pub must_first: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanSummary {
    pub stop_count: usize,
    pub total_travel_km: f64,
    pub total_travel_minutes: u32,
    pub total_work_minutes: u32,
    pub total_projected_value: u64,
    pub day_start: NaiveDateTime,
    /// Finish of the last visit, or the departure time for an empty day.
    pub day_end: NaiveDateTime,
}

impl PlanSummary {
    fn from_entries(day_start: NaiveDateTime, entries: &[ScheduleEntry<'_>]) -> Self {
        Self {
            stop_count: entries.len(),
            total_travel_km: entries.iter().map(|e| e.travel_km).sum(),
            total_travel_minutes: entries.iter().map(|e| e.travel_minutes).sum(),
            total_work_minutes: entries.iter().map(|e| e.work_minutes).sum(),
            total_projected_value: entries.iter().map(|e| e.stop.projected_value).sum(),
            day_start,
            day_end: entries.last().map_or(day_start, |e| e.finish),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayPlan<'a> {
    pub visit_date: NaiveDate,
    pub route: Route,
    pub entries: Vec<ScheduleEntry<'a>>,
    pub matrix_source: MatrixSource,
    pub summary: PlanSummary,
}

/// Plan a day, pricing travel with the distance API when `config` carries a
/// credential and with straight-line estimates otherwise.
pub fn plan_day<'a>(request: &'a PlanRequest, config: &PlannerConfig) -> Result<DayPlan<'a>, PlanError> {
    let must_first = validate(request, config)?;
    run(request, config, &must_first, |locations| {
        MatrixStrategy::select(config.api_key.as_deref(), &config.distance_api).compute(locations)
    })
}

/// Plan a day with an explicit matrix provider. A provider error still falls
/// back to straight-line estimates.
pub fn plan_day_with<'a, P>(
    request: &'a PlanRequest,
    config: &PlannerConfig,
    provider: &P,
) -> Result<DayPlan<'a>, PlanError>
where
    P: DistanceMatrixProvider + ?Sized,
{
    let must_first = validate(request, config)?;
    run(request, config, &must_first, |locations| {
        matrix::with_fallback(provider, locations)
    })
}

fn run<'a>(
    request: &'a PlanRequest,
    config: &PlannerConfig,
    must_first: &[usize],
    price: impl FnOnce(&[Coordinate]) -> TravelMatrices,
) -> Result<DayPlan<'a>, PlanError> {
    info!(
        date = %request.visit_date,
        stops = request.stops.len(),
        mandatory = must_first.len(),
        "planning day"
    );

    let locations: Vec<Coordinate> = std::iter::once(request.origin)
        .chain(request.stops.iter().map(|stop| stop.location))
        .collect();

    // Nothing to price for an empty day.
    let matrices = if request.stops.is_empty() {
        HaversineMatrix::build(&locations)
    } else {
        price(&locations)
    };
    if matrices.size() != locations.len() {
        return Err(PlanError::MatrixDimension {
            expected: locations.len(),
            actual: matrices.size(),
        });
    }

    let route = optimize(&matrices.routing_costs(), must_first, &OptimizeOptions::default())?;
    debug!(?route, source = ?matrices.source, "visit order");

    let start = request.visit_date.and_time(config.departure_time);
    let params = ScheduleParams {
        start,
        default_work_minutes: config.default_work_minutes,
        lunch: config.lunch,
    };
    let entries = simulate(&route, &request.stops, request.origin, &params)?;
    let summary = PlanSummary::from_entries(start, &entries);

    info!(
        stops = summary.stop_count,
        travel_km = summary.total_travel_km,
        day_end = %summary.day_end.format("%H:%M"),
        "day planned"
    );

    Ok(DayPlan {
        visit_date: request.visit_date,
        route,
        entries,
        matrix_source: matrices.source,
        summary,
    })
}

/// Check the config and request, and resolve the mandatory-first set to
/// matrix indices: explicit ids in caller order, then flagged stops in stop
/// order.
fn validate(request: &PlanRequest, config: &PlannerConfig) -> Result<Vec<usize>, PlanError> {
    config
        .validate()
        .map_err(|err| PlanError::InvalidConfig(err.to_string()))?;

    if request.stops.len() > config.max_stops {
        return Err(PlanError::TooManyStops {
            count: request.stops.len(),
            max: config.max_stops,
        });
    }

    let mut index_by_id: HashMap<&str, usize> = HashMap::with_capacity(request.stops.len());
    for (i, stop) in request.stops.iter().enumerate() {
        if index_by_id.insert(stop.id.as_str(), i + 1).is_some() {
            return Err(PlanError::DuplicateStopId(stop.id.clone()));
        }
        if let Some(minutes @ 0) = stop.work_minutes {
            return Err(PlanError::InvalidWorkMinutes {
                id: stop.id.clone(),
                minutes,
            });
        }
    }

    let mut must_first = Vec::new();
    for id in &request.must_first {
        let index = *index_by_id
            .get(id.as_str())
            .ok_or_else(|| PlanError::UnknownMandatoryStop(id.clone()))?;
        if !must_first.contains(&index) {
            must_first.push(index);
        }
    }
    for (i, stop) in request.stops.iter().enumerate() {
        if stop.must_visit_first && !must_first.contains(&(i + 1)) {
            must_first.push(i + 1);
        }
    }

    Ok(must_first)
}
