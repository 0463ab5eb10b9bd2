use async_trait::async_trait;
use tracing::warn;

use crate::db::{queries, DbPool};
use crate::error::FetchError;
use crate::models::gps_point::NewGpsPoint;
use crate::models::track_api::{TrackRequest, TrackResponse};

/// Upstream feed of GPS samples for a `[begin, end)` window in epoch
/// milliseconds. Implementations return points in ascending time order.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    async fn fetch(&self, begin_time_ms: i64, end_time_ms: i64)
        -> Result<Vec<NewGpsPoint>, FetchError>;
}

/// HTTP client for the vendor track API. API tokens are rotated out-of-band
/// into the `track_api_tokens` table; the newest active row wins.
pub struct TrackApiClient {
    http: reqwest::Client,
    base_url: String,
    vehicle_ids: Vec<i32>,
    pool: DbPool,
}

impl TrackApiClient {
    pub fn new(
        base_url: String,
        vehicle_ids: Vec<i32>,
        pool: DbPool,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url,
            vehicle_ids,
            pool,
        })
    }

    /// Newest active token, or `None`. Lookup failures collapse to `None`:
    /// a missing credential skips the cycle rather than failing it.
    async fn latest_token(&self) -> Option<String> {
        match sqlx::query_scalar::<_, String>(queries::SELECT_LATEST_TOKEN)
            .fetch_optional(&self.pool)
            .await
        {
            Ok(token) => token,
            Err(e) => {
                warn!("Token lookup failed: {}", e);
                None
            }
        }
    }

    async fn fetch_vehicle(
        &self,
        token: &str,
        vehicle_id: i32,
        begin_time_ms: i64,
        end_time_ms: i64,
    ) -> Result<Vec<NewGpsPoint>, FetchError> {
        let request = TrackRequest::new(token, vehicle_id, begin_time_ms, end_time_ms);
        let body = self
            .http
            .post(&self.base_url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let response: TrackResponse = serde_json::from_str(&body)?;
        if response.result != 0 {
            return Err(FetchError::Api {
                code: response.result,
                note: response.result_note,
            });
        }

        let mut points = Vec::with_capacity(response.detail.data.len());
        for raw in &response.detail.data {
            match raw.to_point() {
                Some(point) => points.push(point),
                None => warn!(
                    "Skipping sample with invalid GpsTime {} for vehicle {}",
                    raw.gps_time, raw.vehicle_id
                ),
            }
        }
        Ok(points)
    }
}

#[async_trait]
impl TelemetrySource for TrackApiClient {
    async fn fetch(
        &self,
        begin_time_ms: i64,
        end_time_ms: i64,
    ) -> Result<Vec<NewGpsPoint>, FetchError> {
        let token = match self.latest_token().await {
            Some(token) => token,
            None => return Err(FetchError::Auth),
        };

        let mut points = Vec::new();
        for vehicle_id in &self.vehicle_ids {
            let batch = self
                .fetch_vehicle(&token, *vehicle_id, begin_time_ms, end_time_ms)
                .await?;
            points.extend(batch);
        }

        points.sort_by(|a, b| {
            (a.vehicle_id, a.gps_time_utc).cmp(&(b.vehicle_id, b.gps_time_utc))
        });
        Ok(points)
    }
}
