use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::db::store::SyncStore;
use crate::error::{FetchError, SyncError};
use crate::models::watermark::{SyncMode, SyncWatermark};
use crate::sync::window::{bootstrap_watermark, plan_cycle, FetchWindow, SyncTuning};
use crate::telemetry::TelemetrySource;

/// What a completed cycle did, for the caller's logs and metrics.
#[derive(Debug)]
pub struct CycleSummary {
    pub window: FetchWindow,
    pub fetched: usize,
    pub inserted: usize,
    pub failed_chunks: Vec<usize>,
    pub mode: SyncMode,
}

#[derive(Debug)]
pub enum CycleOutcome {
    /// No usable credential; the cycle was skipped without touching the
    /// watermark. Expected while tokens rotate, not a fault.
    SkippedNoCredential,
    Completed(CycleSummary),
}

/// Owner of the watermark state machine. One `run_cycle` per scheduler
/// tick; the scheduler awaits each cycle before starting the next, which is
/// what guarantees single-writer access to the watermark.
pub struct SyncCoordinator<S, D> {
    source: S,
    store: D,
    tuning: SyncTuning,
}

impl<S: TelemetrySource, D: SyncStore> SyncCoordinator<S, D> {
    pub fn new(source: S, store: D, tuning: SyncTuning) -> Self {
        Self {
            source,
            store,
            tuning,
        }
    }

    /// Runs one sync cycle against `now`. The watermark advances only after
    /// fetch and storage both finish; a failed cycle leaves it untouched so
    /// the next cycle re-attempts the same window.
    pub async fn run_cycle(&self, now: DateTime<Utc>) -> Result<CycleOutcome, SyncError> {
        let watermark = match self.store.get_watermark().await? {
            Some(watermark) => watermark,
            None => {
                info!("No sync watermark found, bootstrapping");
                bootstrap_watermark(now, &self.tuning)
            }
        };

        let plan = plan_cycle(&watermark, now, &self.tuning);
        let window = plan.window;

        let points = match self
            .source
            .fetch(window.from.timestamp_millis(), window.to.timestamp_millis())
            .await
        {
            Ok(points) => points,
            Err(FetchError::Auth) => {
                warn!("No usable track api token, skipping sync cycle");
                return Ok(CycleOutcome::SkippedNoCredential);
            }
            Err(e) => return Err(SyncError::Fetch(e)),
        };

        let insert = self.store.insert_points(&points).await?;
        if !insert.failed_chunks.is_empty() {
            warn!(
                "{} point chunk(s) failed to persist this cycle: {:?}",
                insert.failed_chunks.len(),
                insert.failed_chunks
            );
        }

        self.store
            .put_watermark(&SyncWatermark {
                last_synced_at: window.to,
                mode: plan.next_mode,
                updated_at: now,
            })
            .await?;

        info!(
            "Sync cycle committed [{} .. {}): {} fetched, {} inserted, mode {}",
            window.from,
            window.to,
            points.len(),
            insert.inserted,
            plan.next_mode.as_str()
        );

        Ok(CycleOutcome::Completed(CycleSummary {
            window,
            fetched: points.len(),
            inserted: insert.inserted,
            failed_chunks: insert.failed_chunks,
            mode: plan.next_mode,
        }))
    }
}
