//! Tabular rendering of a planned day.

use std::io::Write;

use serde::Serialize;

use crate::error::ExportError;
use crate::model::Coordinate;
use crate::planner::DayPlan;

/// Column headers, in the order [`ScheduleRow`] serializes its fields.
pub const HEADERS: [&str; 13] = [
    "Visit date",
    "Seq",
    "Stop id",
    "Name",
    "Address",
    "Work (min)",
    "Arrival",
    "Finish",
    "Travel (min)",
    "Travel (km)",
    "Projected value",
    "Note",
    "Map URL",
];

/// One spreadsheet row. Field order is column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleRow {
    pub visit_date: String,
    pub sequence: u32,
    pub stop_id: String,
    pub name: String,
    pub address: String,
    pub work_minutes: u32,
    pub arrival: String,
    pub finish: String,
    pub travel_minutes: u32,
    pub travel_km: f64,
    pub projected_value: u64,
    pub note: String,
    pub map_url: String,
}

/// Search link that drops a pin on `location`.
pub fn map_url(location: Coordinate) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={},{}",
        location.lat, location.lng
    )
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn rows(plan: &DayPlan<'_>) -> Vec<ScheduleRow> {
    let visit_date = plan.visit_date.format("%Y-%m-%d").to_string();

    plan.entries
        .iter()
        .map(|entry| ScheduleRow {
            visit_date: visit_date.clone(),
            sequence: entry.sequence,
            stop_id: entry.stop.id.clone(),
            name: entry.stop.name.clone(),
            address: entry.stop.address.clone().unwrap_or_default(),
            work_minutes: entry.work_minutes,
            arrival: entry.arrival.format("%H:%M").to_string(),
            finish: entry.finish.format("%H:%M").to_string(),
            travel_minutes: entry.travel_minutes,
            travel_km: round_one_decimal(entry.travel_km),
            projected_value: entry.stop.projected_value,
            note: String::new(),
            map_url: map_url(entry.stop.location),
        })
        .collect()
}

/// Write a header row followed by one row per visit.
pub fn write_csv<W: Write>(plan: &DayPlan<'_>, writer: W) -> Result<(), ExportError> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(HEADERS)?;
    for row in rows(plan) {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}
