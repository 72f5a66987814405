//! Planner data model: coordinates, stops, time windows and schedule entries.

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

/// A place to visit during the day.
///
/// Optional fields resolve to their defaults when the stop is loaded, not when
/// it is scheduled. `work_minutes` stays optional so the request-level default
/// work duration applies to stops that don't carry their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    pub location: Coordinate,
    /// Expected revenue for the visit.
    #[serde(default)]
    pub projected_value: u64,
    #[serde(default)]
    pub work_minutes: Option<u32>,
    /// Raw "do-not-enter" window text, e.g. `"12:00-13:00"`.
    #[serde(default)]
    pub no_entry: Option<String>,
    #[serde(default)]
    pub must_visit_first: bool,
}

impl Stop {
    pub fn new(id: impl Into<String>, name: impl Into<String>, location: Coordinate) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: None,
            location,
            projected_value: 0,
            work_minutes: None,
            no_entry: None,
            must_visit_first: false,
        }
    }

    /// The parsed do-not-enter window, if the stop has a well-formed one.
    pub fn blocked_window(&self) -> Option<TimeWindow> {
        let text = self.no_entry.as_deref()?;
        if text.trim().is_empty() {
            return None;
        }
        match TimeWindow::parse(text) {
            Ok(window) => Some(window),
            Err(err) => {
                tracing::debug!(stop = %self.id, %err, "ignoring do-not-enter window");
                None
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowParseError {
    #[error("window `{0}` is not of the form HH:MM-HH:MM")]
    Format(String),
    #[error("`{0}` is not a valid HH:MM time")]
    Time(String),
    #[error("window {start}-{end} does not end after it starts")]
    Inverted { start: NaiveTime, end: NaiveTime },
}

/// A half-open time-of-day interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, WindowParseError> {
        if start >= end {
            return Err(WindowParseError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse `"HH:MM-HH:MM"`; whitespace around either time is allowed.
    pub fn parse(text: &str) -> Result<Self, WindowParseError> {
        let (start, end) = text
            .split_once('-')
            .ok_or_else(|| WindowParseError::Format(text.to_string()))?;
        Self::new(parse_hhmm(start)?, parse_hhmm(end)?)
    }

    pub fn length(&self) -> Duration {
        self.end - self.start
    }

    /// The window anchored on `date`.
    pub fn on(&self, date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        (date.and_time(self.start), date.and_time(self.end))
    }

    /// Whether `at` falls inside the window on the same calendar day.
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        let (start, end) = self.on(at.date());
        start <= at && at < end
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

pub(crate) fn parse_hhmm(text: &str) -> Result<NaiveTime, WindowParseError> {
    let trimmed = text.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .map_err(|_| WindowParseError::Time(trimmed.to_string()))
}

/// Serde adapter for `"HH:MM"` times.
pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_hhmm(&text).map_err(serde::de::Error::custom)
    }
}

/// Visit order as 1-based distance-matrix indices (depot excluded).
pub type Route = Vec<usize>;

/// One timed visit in the day's schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEntry<'a> {
    pub sequence: u32,
    pub stop: &'a Stop,
    pub arrival: NaiveDateTime,
    pub finish: NaiveDateTime,
    pub work_minutes: u32,
    pub travel_minutes: u32,
    pub travel_km: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn parses_window_with_spaces() {
        let window = TimeWindow::parse(" 12:00 - 13:30 ").unwrap();
        assert_eq!(window.start, hm(12, 0));
        assert_eq!(window.end, hm(13, 30));
        assert_eq!(window.length(), Duration::minutes(90));
        assert_eq!(window.to_string(), "12:00-13:30");
    }

    #[test]
    fn rejects_malformed_windows() {
        assert!(matches!(TimeWindow::parse("noon"), Err(WindowParseError::Format(_))));
        assert!(matches!(TimeWindow::parse("12-13"), Err(WindowParseError::Time(_))));
        assert!(matches!(TimeWindow::parse("25:00-26:00"), Err(WindowParseError::Time(_))));
        assert!(matches!(
            TimeWindow::parse("13:00-12:00"),
            Err(WindowParseError::Inverted { .. })
        ));
    }

    #[test]
    fn window_is_half_open() {
        let window = TimeWindow::parse("12:00-13:00").unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        assert!(window.contains(day.and_time(hm(12, 0))));
        assert!(window.contains(day.and_time(hm(12, 59))));
        assert!(!window.contains(day.and_time(hm(13, 0))));
        assert!(!window.contains(day.and_time(hm(11, 59))));
    }

    #[test]
    fn blank_or_bad_no_entry_means_no_window() {
        let mut stop = Stop::new("s1", "Shop", Coordinate::new(35.0, 139.0));
        assert_eq!(stop.blocked_window(), None);

        stop.no_entry = Some("   ".to_string());
        assert_eq!(stop.blocked_window(), None);

        stop.no_entry = Some("after lunch".to_string());
        assert_eq!(stop.blocked_window(), None);

        stop.no_entry = Some("12:00-13:00".to_string());
        assert_eq!(stop.blocked_window(), Some(TimeWindow::new(hm(12, 0), hm(13, 0)).unwrap()));
    }

    #[test]
    fn stop_defaults_apply_when_loading() {
        let stop: Stop = serde_json::from_str(
            r#"{"id":"C-001","name":"Corner Shop","location":{"lat":35.5,"lng":140.1}}"#,
        )
        .unwrap();
        assert_eq!(stop.projected_value, 0);
        assert_eq!(stop.work_minutes, None);
        assert!(!stop.must_visit_first);
        assert_eq!(stop.address, None);
    }
}
