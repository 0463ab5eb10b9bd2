use thiserror::Error;

/// Failures raised while pulling a window of points from the track API.
#[derive(Debug, Error)]
pub enum FetchError {
    /// No usable API token. Expected while tokens rotate; cycles skip quietly.
    #[error("no usable track api token")]
    Auth,

    #[error("track api transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("track api rejected request: code {code} ({note})")]
    Api { code: i32, note: String },

    #[error("track api response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("telemetry fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("store failure: {0}")]
    Store(#[from] sqlx::Error),
}
