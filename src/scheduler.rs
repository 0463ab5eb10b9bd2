use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::db::store::PgStore;
use crate::segmentation::runner::SegmentationRunner;
use crate::sync::coordinator::{CycleOutcome, SyncCoordinator};
use crate::telemetry::TrackApiClient;

/// Drives the two jobs of the service: a sync cycle every realtime
/// interval and a segmentation run once a day. Both loops await each unit
/// of work before sleeping again, so invocations of the same job never
/// overlap and the watermark has a single writer.
pub async fn run(
    coordinator: SyncCoordinator<TrackApiClient, PgStore>,
    runner: SegmentationRunner,
    config: &AppConfig,
) {
    let sync_every = Duration::from_secs(config.realtime_interval_minutes.max(1) as u64 * 60);
    tokio::join!(
        sync_loop(coordinator, sync_every),
        segmentation_loop(runner, config.segmentation_hour_utc),
    );
}

async fn sync_loop(coordinator: SyncCoordinator<TrackApiClient, PgStore>, every: Duration) {
    info!("Sync loop running every {:?}", every);
    let mut tick = tokio::time::interval(every);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tick.tick().await;
        match coordinator.run_cycle(Utc::now()).await {
            Ok(CycleOutcome::Completed(_)) => {}
            Ok(CycleOutcome::SkippedNoCredential) => {
                warn!("Sync cycle skipped: waiting for a usable api token");
            }
            // Watermark untouched; the next tick re-attempts the window.
            Err(e) => error!("Sync cycle failed: {}", e),
        }
    }
}

async fn segmentation_loop(runner: SegmentationRunner, hour_utc: u32) {
    info!("Segmentation scheduled daily at {:02}:00 UTC", hour_utc);

    loop {
        tokio::time::sleep(until_next_run(Utc::now(), hour_utc)).await;

        let date = (Utc::now() - chrono::Duration::days(1)).date_naive();
        if let Err(e) = runner.run_for_date(date).await {
            error!("Segmentation run for {} failed: {}", date, e);
        }
    }
}

fn until_next_run(now: DateTime<Utc>, hour_utc: u32) -> Duration {
    let mut next = match now.date_naive().and_hms_opt(hour_utc.min(23), 0, 0) {
        Some(at) => at.and_utc(),
        None => now + chrono::Duration::days(1),
    };
    if next <= now {
        next = next + chrono::Duration::days(1);
    }
    (next - now).to_std().unwrap_or(Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn next_run_later_today() {
        let now = Utc.with_ymd_and_hms(2025, 11, 29, 0, 30, 0).unwrap();
        assert_eq!(until_next_run(now, 1), Duration::from_secs(30 * 60));
    }

    #[test]
    fn next_run_rolls_to_tomorrow() {
        let now = Utc.with_ymd_and_hms(2025, 11, 29, 1, 30, 0).unwrap();
        assert_eq!(until_next_run(now, 1), Duration::from_secs(23 * 3600 + 30 * 60));
    }

    #[test]
    fn run_hour_boundary_is_exclusive() {
        let now = Utc.with_ymd_and_hms(2025, 11, 29, 1, 0, 0).unwrap();
        assert_eq!(until_next_run(now, 1), Duration::from_secs(24 * 3600));
    }
}
