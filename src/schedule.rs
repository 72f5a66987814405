//! Sequential timetable for an ordered route.
//!
//! Walks the route once, carrying the clock and the current position forward.
//! Travel between stops is always estimated from straight-line distance at
//! the fallback speed, whichever source priced the optimizer's matrix.

use chrono::{Duration, NaiveDateTime};
use tracing::trace;

use crate::error::PlanError;
use crate::haversine::{distance_km, travel_minutes};
use crate::model::{Coordinate, ScheduleEntry, Stop, TimeWindow};

#[derive(Debug, Clone)]
pub struct ScheduleParams {
    /// Departure from the origin.
    pub start: NaiveDateTime,
    /// Work duration for stops that don't carry their own.
    pub default_work_minutes: u32,
    pub lunch: TimeWindow,
}

/// Time-stamp every stop of `route`, where `route[k]` names `stops[route[k] - 1]`.
///
/// Arrival inside a stop's do-not-enter window is pushed to the window's end,
/// then arrival inside lunch is pushed to lunch's end. Work that starts before
/// lunch and runs into it is extended by the full lunch length.
pub fn simulate<'a>(
    route: &[usize],
    stops: &'a [Stop],
    origin: Coordinate,
    params: &ScheduleParams,
) -> Result<Vec<ScheduleEntry<'a>>, PlanError> {
    if params.lunch.start >= params.lunch.end {
        return Err(PlanError::InvalidConfig(format!(
            "lunch must end after it starts, got {}",
            params.lunch
        )));
    }
    if let Some(&index) = route.iter().find(|&&index| index == 0 || index > stops.len()) {
        return Err(PlanError::RouteIndexOutOfRange {
            index,
            stops: stops.len(),
        });
    }

    let mut entries = Vec::with_capacity(route.len());
    let mut current_time = params.start;
    let mut current_position = origin;

    for (position, &index) in route.iter().enumerate() {
        let stop = &stops[index - 1];

        let travel_km = distance_km(current_position, stop.location);
        let travel_min = travel_minutes(travel_km);
        let mut arrival = current_time + Duration::minutes(i64::from(travel_min));

        if let Some(blocked) = stop.blocked_window() {
            if blocked.contains(arrival) {
                trace!(stop = %stop.id, window = %blocked, "arrival deferred past do-not-enter window");
                arrival = blocked.on(arrival.date()).1;
            }
        }

        let (lunch_start, lunch_end) = params.lunch.on(arrival.date());
        if lunch_start <= arrival && arrival < lunch_end {
            arrival = lunch_end;
        }

        let work_minutes = stop.work_minutes.unwrap_or(params.default_work_minutes);
        let mut finish = arrival + Duration::minutes(i64::from(work_minutes));

        if arrival < lunch_start && finish > lunch_start {
            finish += params.lunch.length();
        }

        entries.push(ScheduleEntry {
            sequence: position as u32 + 1,
            stop,
            arrival,
            finish,
            work_minutes,
            travel_minutes: travel_min,
            travel_km,
        });

        current_time = finish;
        current_position = stop.location;
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 4, 1).unwrap().and_time(hm(h, m))
    }

    fn params(start: NaiveDateTime, lunch: (u32, u32, u32, u32)) -> ScheduleParams {
        ScheduleParams {
            start,
            default_work_minutes: 30,
            lunch: TimeWindow::new(hm(lunch.0, lunch.1), hm(lunch.2, lunch.3)).unwrap(),
        }
    }

    /// A stop at the origin, so travel is zero and arrival equals the clock.
    fn stop_here(id: &str) -> Stop {
        Stop::new(id, id, Coordinate::new(35.0, 139.0))
    }

    fn origin() -> Coordinate {
        Coordinate::new(35.0, 139.0)
    }

    #[test]
    fn empty_route_is_empty_schedule() {
        let entries = simulate(&[], &[], origin(), &params(at(9, 0), (12, 0, 13, 0))).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn default_work_minutes_apply() {
        let stops = vec![stop_here("a")];
        let entries = simulate(&[1], &stops, origin(), &params(at(9, 0), (12, 0, 13, 0))).unwrap();

        assert_eq!(entries[0].sequence, 1);
        assert_eq!(entries[0].arrival, at(9, 0));
        assert_eq!(entries[0].finish, at(9, 30));
        assert_eq!(entries[0].work_minutes, 30);
        assert_eq!(entries[0].travel_minutes, 0);
    }

    #[test]
    fn blocked_window_defers_arrival() {
        let mut stop = stop_here("a");
        stop.work_minutes = Some(20);
        stop.no_entry = Some("12:00-13:00".to_string());
        let stops = vec![stop];

        let entries = simulate(&[1], &stops, origin(), &params(at(12, 10), (14, 0, 15, 0))).unwrap();
        assert_eq!(entries[0].arrival, at(13, 0));
        assert_eq!(entries[0].finish, at(13, 20));
    }

    #[test]
    fn malformed_blocked_window_is_ignored() {
        let mut stop = stop_here("a");
        stop.no_entry = Some("lunchtime".to_string());
        let stops = vec![stop];

        let entries = simulate(&[1], &stops, origin(), &params(at(12, 10), (14, 0, 15, 0))).unwrap();
        assert_eq!(entries[0].arrival, at(12, 10));
    }

    #[test]
    fn lunch_checked_after_blocked_window() {
        // Blocked until 12:00 pushes arrival into lunch, which pushes it again.
        let mut stop = stop_here("a");
        stop.no_entry = Some("11:00-12:00".to_string());
        let stops = vec![stop];

        let entries = simulate(&[1], &stops, origin(), &params(at(11, 30), (12, 0, 13, 0))).unwrap();
        assert_eq!(entries[0].arrival, at(13, 0));
    }

    #[test]
    fn work_straddling_lunch_is_extended() {
        let mut stop = stop_here("a");
        stop.work_minutes = Some(10);
        let stops = vec![stop];

        let entries = simulate(&[1], &stops, origin(), &params(at(13, 55), (14, 0, 15, 0))).unwrap();
        assert_eq!(entries[0].arrival, at(13, 55));
        assert_eq!(entries[0].finish, at(15, 5));
    }

    #[test]
    fn work_ending_exactly_at_lunch_is_not_extended() {
        let mut stop = stop_here("a");
        stop.work_minutes = Some(5);
        let stops = vec![stop];

        let entries = simulate(&[1], &stops, origin(), &params(at(13, 55), (14, 0, 15, 0))).unwrap();
        assert_eq!(entries[0].finish, at(14, 0));
    }

    #[test]
    fn travel_advances_clock_and_position() {
        // 0.1 degree of latitude is ~11.1 km, i.e. 22 minutes at 30 km/h.
        let a = Stop::new("a", "A", Coordinate::new(35.1, 139.0));
        let b = Stop::new("b", "B", Coordinate::new(35.1, 139.0));
        let stops = vec![a, b];

        let entries = simulate(&[1, 2], &stops, origin(), &params(at(9, 0), (12, 0, 13, 0))).unwrap();
        assert_eq!(entries[0].travel_minutes, 22);
        assert_eq!(entries[0].arrival, at(9, 22));
        assert!((entries[0].travel_km - 11.12).abs() < 0.01);

        assert_eq!(entries[1].sequence, 2);
        assert_eq!(entries[1].travel_minutes, 0);
        assert_eq!(entries[1].arrival, entries[0].finish);
    }

    #[test]
    fn rejects_inverted_lunch() {
        let mut stop = stop_here("a");
        stop.work_minutes = Some(10);
        let stops = vec![stop];
        let params = ScheduleParams {
            start: at(12, 55),
            default_work_minutes: 10,
            lunch: TimeWindow {
                start: hm(13, 0),
                end: hm(12, 0),
            },
        };

        let result = simulate(&[1], &stops, origin(), &params);
        assert!(matches!(result, Err(PlanError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_out_of_range_route() {
        let stops = vec![stop_here("a")];
        let result = simulate(&[2], &stops, origin(), &params(at(9, 0), (12, 0, 13, 0)));
        assert_eq!(result, Err(PlanError::RouteIndexOutOfRange { index: 2, stops: 1 }));
    }
}
