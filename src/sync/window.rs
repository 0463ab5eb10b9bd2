use chrono::{DateTime, Duration, Utc};

use crate::config::AppConfig;
use crate::models::watermark::{SyncMode, SyncWatermark};

/// Time parameters of the sync state machine.
#[derive(Debug, Clone)]
pub struct SyncTuning {
    pub realtime_interval: Duration,
    pub catchup_batch: Duration,
    pub retention: Duration,
}

impl SyncTuning {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            realtime_interval: Duration::minutes(config.realtime_interval_minutes),
            catchup_batch: Duration::minutes(config.catchup_batch_minutes),
            retention: Duration::days(config.retention_days),
        }
    }
}

/// Half-open fetch window `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// What one sync cycle should do: the window to fetch and the mode to
/// record for the next cycle once the window commits.
#[derive(Debug, Clone, Copy)]
pub struct CyclePlan {
    pub window: FetchWindow,
    pub next_mode: SyncMode,
}

/// First-run watermark: start `retention` behind the present, in catchup.
pub fn bootstrap_watermark(now: DateTime<Utc>, tuning: &SyncTuning) -> SyncWatermark {
    SyncWatermark {
        last_synced_at: now - tuning.retention,
        mode: SyncMode::Catchup,
        updated_at: now,
    }
}

/// Pure transition function of the two-state sync machine.
///
/// Catchup advances in `catchup_batch`-sized windows until the window
/// reaches the present, then hands the next cycle to realtime. Realtime
/// fetches up to the present but never reaches further back than two
/// realtime intervals, so skipped cycles cannot grow into an unbounded
/// re-fetch. A realtime watermark older than three realtime intervals is
/// treated as an outage and the cycle runs as catchup instead.
pub fn plan_cycle(watermark: &SyncWatermark, now: DateTime<Utc>, tuning: &SyncTuning) -> CyclePlan {
    match effective_mode(watermark, now, tuning) {
        SyncMode::Catchup => {
            let from = watermark.last_synced_at;
            let to = from + tuning.catchup_batch;
            if to >= now {
                CyclePlan {
                    window: FetchWindow {
                        from,
                        to: now.max(from),
                    },
                    next_mode: SyncMode::Realtime,
                }
            } else {
                CyclePlan {
                    window: FetchWindow { from, to },
                    next_mode: SyncMode::Catchup,
                }
            }
        }
        SyncMode::Realtime => {
            let from = watermark
                .last_synced_at
                .max(now - tuning.realtime_interval * 2);
            CyclePlan {
                window: FetchWindow {
                    from,
                    to: now.max(from),
                },
                next_mode: SyncMode::Realtime,
            }
        }
    }
}

fn effective_mode(watermark: &SyncWatermark, now: DateTime<Utc>, tuning: &SyncTuning) -> SyncMode {
    match watermark.mode {
        SyncMode::Realtime
            if now - watermark.last_synced_at > tuning.realtime_interval * 3 =>
        {
            SyncMode::Catchup
        }
        mode => mode,
    }
}
