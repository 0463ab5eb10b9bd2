use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// One stored telemetry sample. Immutable once written; ordered by
/// `(vehicle_id, gps_time_utc)`.
#[derive(Debug, Clone, FromRow)]
pub struct GpsPoint {
    pub id: i64, // bigserial
    pub vehicle_id: i32,
    pub gps_time_utc: DateTime<Utc>,
    pub gps_time_unix: i64,
    pub lat: f64,
    pub lon: f64,
    pub direction: Option<i32>,
    pub speed_kph: Option<f64>,
    pub odometer: Option<f64>,
    pub lo_status: Option<i32>,
    pub acc_on: Option<bool>,
    pub voltage: Option<f64>,
    pub raw_status: Option<String>,
}

/// Insert form of [`GpsPoint`], before the store assigns a row id.
#[derive(Debug, Clone)]
pub struct NewGpsPoint {
    pub vehicle_id: i32,
    pub gps_time_utc: DateTime<Utc>,
    pub gps_time_unix: i64,
    pub lat: f64,
    pub lon: f64,
    pub direction: Option<i32>,
    pub speed_kph: Option<f64>,
    pub odometer: Option<f64>,
    pub lo_status: Option<i32>,
    pub acc_on: Option<bool>,
    pub voltage: Option<f64>,
    pub raw_status: Option<String>,
}
