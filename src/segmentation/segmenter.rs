use chrono::{DateTime, NaiveDate, Utc};

use crate::geo;
use crate::models::gps_point::GpsPoint;
use crate::models::trip_segment::TripSegment;

struct OpenSegment {
    start_time: DateTime<Utc>,
    start_point_id: i64,
}

/// Splits one vehicle's time-ordered points for one day into trip segments.
///
/// Single forward pass: an ignition-on sample opens a segment, an
/// ignition-off sample closes it, and distance accrues between consecutive
/// samples only while a segment is open and the previous sample was
/// ignition-on. A segment still open at the end of the window is truncated
/// at the last observed point, not dropped. Samples with unknown ignition
/// state neither open nor close a segment.
pub fn segment_points(
    vehicle_id: i32,
    trip_date: NaiveDate,
    points: &[GpsPoint],
) -> Vec<TripSegment> {
    let mut segments = Vec::new();
    let mut current: Option<OpenSegment> = None;
    let mut last: Option<&GpsPoint> = None;
    let mut distance = 0.0f64;

    for point in points {
        if point.acc_on == Some(true) && current.is_none() {
            current = Some(OpenSegment {
                start_time: point.gps_time_utc,
                start_point_id: point.id,
            });
            distance = 0.0;
        } else if point.acc_on == Some(false) {
            if let Some(open) = current.take() {
                segments.push(close_segment(
                    vehicle_id,
                    trip_date,
                    &open,
                    point,
                    distance,
                    segments.len(),
                ));
            }
        }

        if current.is_some() {
            if let Some(prev) = last {
                if prev.acc_on == Some(true) {
                    distance += geo::haversine_distance(prev.lat, prev.lon, point.lat, point.lon);
                }
            }
        }

        last = Some(point);
    }

    // Trip still running at the window boundary: truncate it there.
    if let (Some(open), Some(tail)) = (current.take(), last) {
        segments.push(close_segment(
            vehicle_id,
            trip_date,
            &open,
            tail,
            distance,
            segments.len(),
        ));
    }

    segments
}

fn close_segment(
    vehicle_id: i32,
    trip_date: NaiveDate,
    open: &OpenSegment,
    end: &GpsPoint,
    distance: f64,
    emitted: usize,
) -> TripSegment {
    TripSegment {
        vehicle_id,
        trip_date,
        day_segment_number: (emitted + 1) as i16,
        start_time: open.start_time,
        end_time: end.gps_time_utc,
        duration_seconds: (end.gps_time_utc - open.start_time).num_seconds() as i32,
        distance_meters: distance.round() as i32,
        start_point_id: open.start_point_id,
        end_point_id: end.id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 28).unwrap()
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 28, hour, minute, 0).unwrap()
    }

    fn point(id: i64, time: DateTime<Utc>, acc_on: Option<bool>, lat: f64, lon: f64) -> GpsPoint {
        GpsPoint {
            id,
            vehicle_id: 1,
            gps_time_utc: time,
            gps_time_unix: time.timestamp(),
            lat,
            lon,
            direction: None,
            speed_kph: None,
            odometer: None,
            lo_status: None,
            acc_on,
            voltage: None,
            raw_status: None,
        }
    }

    #[test]
    fn stationary_trip_has_duration_but_no_distance() {
        let points = vec![
            point(1, at(8, 0), Some(true), 20.65, -100.39),
            point(2, at(8, 10), Some(true), 20.65, -100.39),
            point(3, at(8, 20), Some(false), 20.65, -100.39),
        ];
        let segments = segment_points(1, date(), &points);

        assert_eq!(segments.len(), 1);
        let s = &segments[0];
        assert_eq!(s.start_time, at(8, 0));
        assert_eq!(s.end_time, at(8, 20));
        assert_eq!(s.duration_seconds, 1200);
        assert_eq!(s.distance_meters, 0);
        assert_eq!(s.day_segment_number, 1);
        assert_eq!(s.start_point_id, 1);
        assert_eq!(s.end_point_id, 3);
    }

    #[test]
    fn ignition_never_on_yields_no_segments() {
        let points = vec![
            point(1, at(8, 0), Some(false), 20.65, -100.39),
            point(2, at(9, 0), Some(false), 20.66, -100.40),
        ];
        assert!(segment_points(1, date(), &points).is_empty());
    }

    #[test]
    fn empty_input_yields_no_segments() {
        assert!(segment_points(1, date(), &[]).is_empty());
    }

    #[test]
    fn stream_ending_mid_trip_truncates_at_last_point() {
        let points = vec![point(1, at(23, 50), Some(true), 20.65, -100.39)];
        let segments = segment_points(1, date(), &points);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start_time, at(23, 50));
        assert_eq!(segments[0].end_time, at(23, 50));
        assert_eq!(segments[0].duration_seconds, 0);
        assert_eq!(segments[0].distance_meters, 0);
        assert_eq!(segments[0].end_point_id, 1);
    }

    #[test]
    fn distance_accrues_only_after_ignition_on_samples() {
        // 0.01 deg of longitude at the equator is ~1112 m. The leg into the
        // closing off-sample does not count: the segment closes first.
        let points = vec![
            point(1, at(8, 0), Some(true), 0.0, 0.0),
            point(2, at(8, 5), Some(true), 0.0, 0.01),
            point(3, at(8, 10), Some(false), 0.0, 0.02),
        ];
        let segments = segment_points(1, date(), &points);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].distance_meters, 1112);
    }

    #[test]
    fn unknown_ignition_state_neither_opens_nor_closes() {
        let points = vec![
            point(1, at(8, 0), Some(true), 0.0, 0.0),
            point(2, at(8, 5), None, 0.0, 0.01),
            point(3, at(8, 10), Some(false), 0.0, 0.01),
        ];
        let segments = segment_points(1, date(), &points);

        // The on->unknown leg accrues (previous sample was on); the
        // unknown->off leg does not.
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].distance_meters, 1112);
        assert_eq!(segments[0].end_time, at(8, 10));
    }

    #[test]
    fn segment_numbers_are_gap_free_and_ordered() {
        let points = vec![
            point(1, at(7, 0), Some(true), 0.0, 0.0),
            point(2, at(7, 30), Some(false), 0.0, 0.0),
            point(3, at(9, 0), Some(true), 0.0, 0.0),
            point(4, at(9, 45), Some(false), 0.0, 0.0),
            point(5, at(22, 0), Some(true), 0.0, 0.0),
        ];
        let segments = segment_points(1, date(), &points);

        let numbers: Vec<i16> = segments.iter().map(|s| s.day_segment_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(segments[2].end_time, at(22, 0)); // truncated tail trip
    }

    #[test]
    fn closed_segments_match_on_off_transitions() {
        // Two on->off transitions after an on sample, plus a truncated tail.
        let acc = [true, true, false, true, false, true];
        let points: Vec<GpsPoint> = acc
            .iter()
            .enumerate()
            .map(|(i, on)| point(i as i64 + 1, at(10, i as u32 * 5), Some(*on), 0.0, 0.0))
            .collect();

        let segments = segment_points(1, date(), &points);
        assert_eq!(segments.len(), 3);
        assert!(segments.iter().all(|s| s.duration_seconds >= 0));
        assert!(segments.iter().all(|s| s.distance_meters >= 0));
    }

    #[test]
    fn repeated_on_samples_do_not_reopen_a_running_trip() {
        let points = vec![
            point(1, at(8, 0), Some(true), 0.0, 0.0),
            point(2, at(8, 5), Some(true), 0.0, 0.0),
            point(3, at(8, 10), Some(true), 0.0, 0.0),
            point(4, at(8, 15), Some(false), 0.0, 0.0),
        ];
        let segments = segment_points(1, date(), &points);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start_time, at(8, 0));
    }
}
