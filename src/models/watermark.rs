use chrono::{DateTime, Utc};

/// Row key of the single watermark row.
pub const WATERMARK_ID: &str = "gps_sync";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Catchup,
    Realtime,
}

impl SyncMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncMode::Catchup => "catchup",
            SyncMode::Realtime => "realtime",
        }
    }

    /// Unknown values fall back to catchup, the safe mode.
    pub fn parse(s: &str) -> Self {
        match s {
            "realtime" => SyncMode::Realtime,
            _ => SyncMode::Catchup,
        }
    }
}

/// Boundary up to which telemetry has been durably synced. `last_synced_at`
/// is the exclusive upper bound of the last committed fetch window and is
/// monotonically non-decreasing across successful cycles.
#[derive(Debug, Clone)]
pub struct SyncWatermark {
    pub last_synced_at: DateTime<Utc>,
    pub mode: SyncMode,
    pub updated_at: DateTime<Utc>,
}
