use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::Row;
use tracing::warn;

use crate::db::{queries, DbPool};
use crate::models::gps_point::{GpsPoint, NewGpsPoint};
use crate::models::trip_segment::TripSegment;
use crate::models::watermark::{SyncMode, SyncWatermark, WATERMARK_ID};

/// Result of a chunked point insert. Failed chunks are skipped, not fatal;
/// their indices are surfaced so the caller can report them.
#[derive(Debug, Clone, Default)]
pub struct InsertOutcome {
    pub inserted: usize,
    pub failed_chunks: Vec<usize>,
}

/// The subset of the store the sync coordinator depends on, kept behind a
/// trait so cycles can be exercised against an in-memory store.
#[async_trait]
pub trait SyncStore: Send + Sync {
    async fn get_watermark(&self) -> Result<Option<SyncWatermark>, sqlx::Error>;
    async fn put_watermark(&self, watermark: &SyncWatermark) -> Result<(), sqlx::Error>;
    async fn insert_points(&self, points: &[NewGpsPoint]) -> Result<InsertOutcome, sqlx::Error>;
}

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
    chunk_size: usize,
    chunk_pause: Duration,
}

impl PgStore {
    pub fn new(pool: DbPool, chunk_size: usize, chunk_pause: Duration) -> Self {
        Self {
            pool,
            chunk_size: chunk_size.max(1),
            chunk_pause,
        }
    }

    pub async fn fetch_watermark(&self) -> Result<Option<SyncWatermark>, sqlx::Error> {
        let row = sqlx::query(queries::SELECT_WATERMARK)
            .bind(WATERMARK_ID)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let mode: String = row.try_get("mode")?;
                Ok(Some(SyncWatermark {
                    last_synced_at: row.try_get("last_synced_at")?,
                    mode: SyncMode::parse(&mode),
                    updated_at: row.try_get("updated_at")?,
                }))
            }
            None => Ok(None),
        }
    }

    pub async fn store_watermark(&self, watermark: &SyncWatermark) -> Result<(), sqlx::Error> {
        sqlx::query(queries::UPSERT_WATERMARK)
            .bind(WATERMARK_ID)
            .bind(watermark.last_synced_at)
            .bind(watermark.mode.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Inserts points in fixed-size chunks with a pause between chunks to
    /// bound write bursts. A failed chunk is logged and skipped; surviving
    /// chunks still commit. Duplicate samples are dropped by the store's
    /// `(vehicle_id, gps_time_utc)` conflict target.
    pub async fn store_points(&self, points: &[NewGpsPoint]) -> Result<InsertOutcome, sqlx::Error> {
        let mut outcome = InsertOutcome::default();
        if points.is_empty() {
            return Ok(outcome);
        }

        let chunk_count = points.len().div_ceil(self.chunk_size);
        for (index, chunk) in points.chunks(self.chunk_size).enumerate() {
            match self.insert_chunk(chunk).await {
                Ok(inserted) => outcome.inserted += inserted,
                Err(e) => {
                    warn!(
                        "Point chunk {}/{} failed ({} points): {}",
                        index + 1,
                        chunk_count,
                        chunk.len(),
                        e
                    );
                    outcome.failed_chunks.push(index);
                }
            }
            if index + 1 < chunk_count {
                tokio::time::sleep(self.chunk_pause).await;
            }
        }

        Ok(outcome)
    }

    async fn insert_chunk(&self, chunk: &[NewGpsPoint]) -> Result<usize, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0usize;

        for point in chunk {
            let result = sqlx::query(queries::INSERT_GPS_POINT)
                .bind(point.vehicle_id)
                .bind(point.gps_time_utc)
                .bind(point.gps_time_unix)
                .bind(point.lat)
                .bind(point.lon)
                .bind(point.direction)
                .bind(point.speed_kph)
                .bind(point.odometer)
                .bind(point.lo_status)
                .bind(point.acc_on)
                .bind(point.voltage)
                .bind(point.raw_status.as_deref())
                .execute(&mut *tx)
                .await?;
            inserted += result.rows_affected() as usize;
        }

        tx.commit().await?;
        Ok(inserted)
    }

    pub async fn distinct_vehicles(&self, date: NaiveDate) -> Result<Vec<i32>, sqlx::Error> {
        let (start, end) = day_range(date);
        sqlx::query_scalar::<_, i32>(queries::SELECT_DISTINCT_VEHICLES)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn vehicle_points(
        &self,
        vehicle_id: i32,
        date: NaiveDate,
    ) -> Result<Vec<GpsPoint>, sqlx::Error> {
        let (start, end) = day_range(date);
        sqlx::query_as::<_, GpsPoint>(queries::SELECT_VEHICLE_POINTS)
            .bind(vehicle_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
    }

    /// Replaces the segment set for `(vehicle_id, trip_date)` in one
    /// transaction, making a segmentation re-run idempotent for that day.
    pub async fn replace_segments(
        &self,
        vehicle_id: i32,
        trip_date: NaiveDate,
        segments: &[TripSegment],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(queries::DELETE_SEGMENTS_FOR_DAY)
            .bind(vehicle_id)
            .bind(trip_date)
            .execute(&mut *tx)
            .await?;

        for segment in segments {
            sqlx::query(queries::INSERT_TRIP_SEGMENT)
                .bind(segment.vehicle_id)
                .bind(segment.trip_date)
                .bind(segment.day_segment_number)
                .bind(segment.start_time)
                .bind(segment.end_time)
                .bind(segment.duration_seconds)
                .bind(segment.distance_meters)
                .bind(segment.start_point_id)
                .bind(segment.end_point_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl SyncStore for PgStore {
    async fn get_watermark(&self) -> Result<Option<SyncWatermark>, sqlx::Error> {
        self.fetch_watermark().await
    }

    async fn put_watermark(&self, watermark: &SyncWatermark) -> Result<(), sqlx::Error> {
        self.store_watermark(watermark).await
    }

    async fn insert_points(&self, points: &[NewGpsPoint]) -> Result<InsertOutcome, sqlx::Error> {
        self.store_points(points).await
    }
}

fn day_range(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    (start, start + chrono::Duration::days(1))
}
