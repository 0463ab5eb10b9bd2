use chrono::{DateTime, NaiveDate, Utc};

/// A contiguous ignition-on interval for one vehicle on one day.
/// `start_point_id`/`end_point_id` reference the bounding `gps_points` rows.
#[derive(Debug, Clone, PartialEq)]
pub struct TripSegment {
    pub vehicle_id: i32,
    pub trip_date: NaiveDate,
    pub day_segment_number: i16, // 1-based, gap-free per vehicle/day
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_seconds: i32,
    pub distance_meters: i32,
    pub start_point_id: i64,
    pub end_point_id: i64,
}
