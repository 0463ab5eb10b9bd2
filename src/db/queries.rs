pub const SELECT_WATERMARK: &str = r#"
SELECT last_synced_at, mode, updated_at FROM sync_watermark WHERE id = $1;
"#;

pub const UPSERT_WATERMARK: &str = r#"
INSERT INTO sync_watermark (id, last_synced_at, mode, updated_at)
VALUES ($1, $2, $3, NOW())
ON CONFLICT (id) DO UPDATE
SET last_synced_at = $2,
    mode = $3,
    updated_at = NOW();
"#;

pub const SELECT_LATEST_TOKEN: &str = r#"
SELECT token FROM track_api_tokens WHERE is_active ORDER BY id DESC LIMIT 1;
"#;

pub const INSERT_GPS_POINT: &str = r#"
INSERT INTO gps_points (
    vehicle_id, gps_time_utc, gps_time_unix, lat, lon, direction,
    speed_kph, odometer, lo_status, acc_on, voltage, raw_status
) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
ON CONFLICT (vehicle_id, gps_time_utc) DO NOTHING;
"#;

pub const SELECT_DISTINCT_VEHICLES: &str = r#"
SELECT DISTINCT vehicle_id FROM gps_points
WHERE gps_time_utc >= $1 AND gps_time_utc < $2;
"#;

pub const SELECT_VEHICLE_POINTS: &str = r#"
SELECT id, vehicle_id, gps_time_utc, gps_time_unix, lat, lon, direction,
       speed_kph, odometer, lo_status, acc_on, voltage, raw_status
FROM gps_points
WHERE vehicle_id = $1 AND gps_time_utc >= $2 AND gps_time_utc < $3
ORDER BY gps_time_utc ASC;
"#;

pub const DELETE_SEGMENTS_FOR_DAY: &str = r#"
DELETE FROM trip_segments WHERE vehicle_id = $1 AND trip_date = $2;
"#;

pub const INSERT_TRIP_SEGMENT: &str = r#"
INSERT INTO trip_segments (
    vehicle_id, trip_date, day_segment_number, start_time, end_time,
    duration_seconds, distance_meters, start_point_id, end_point_id
) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9);
"#;
