mod config;
mod db;
mod error;
mod geo;
mod models;
mod scheduler;
mod segmentation;
mod sync;
mod telemetry;

use std::time::Duration;

use config::AppConfig;
use db::store::PgStore;
use segmentation::runner::SegmentationRunner;
use sync::coordinator::SyncCoordinator;
use sync::window::SyncTuning;
use telemetry::TrackApiClient;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load config
    let config = AppConfig::load()?;

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .init();

    info!("Starting Fleet Trips Service...");

    // Init DB
    let pool = db::init_pool(&config.database_url).await?;
    info!("Connected to database");

    let store = PgStore::new(
        pool.clone(),
        config.insert_chunk_size,
        Duration::from_secs(config.insert_chunk_pause_seconds),
    );
    let client = TrackApiClient::new(
        config.track_api_base_url.clone(),
        config.track_api_vehicle_ids.clone(),
        pool,
    )?;
    let coordinator = SyncCoordinator::new(client, store.clone(), SyncTuning::from_config(&config));
    let runner = SegmentationRunner::new(store);

    scheduler::run(coordinator, runner, &config).await;

    Ok(())
}
