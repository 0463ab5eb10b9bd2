use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub track_api_base_url: String,
    pub track_api_vehicle_ids: Vec<i32>,
    pub realtime_interval_minutes: i64,
    pub catchup_batch_minutes: i64,
    pub retention_days: i64,
    pub insert_chunk_size: usize,
    pub insert_chunk_pause_seconds: u64,
    pub segmentation_hour_utc: u32,
    pub database_url: String,
    pub log_level: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let track_api_base_url =
            env::var("TRACK_API_BASE_URL").context("TRACK_API_BASE_URL is required")?;
        let track_api_vehicle_ids = env::var("TRACK_API_VEHICLE_IDS")
            .context("TRACK_API_VEHICLE_IDS is required")?
            .split(',')
            .map(|s| s.trim().parse::<i32>())
            .collect::<Result<Vec<_>, _>>()
            .context("TRACK_API_VEHICLE_IDS must be a comma-separated list of vehicle ids")?;

        let realtime_interval_minutes = env::var("SYNC_REALTIME_INTERVAL_MINUTES")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);
        let catchup_batch_minutes = env::var("SYNC_CATCHUP_BATCH_MINUTES")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .unwrap_or(60);
        let retention_days = env::var("SYNC_RETENTION_DAYS")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .unwrap_or(3);
        let insert_chunk_size = env::var("INSERT_CHUNK_SIZE")
            .unwrap_or_else(|_| "200".to_string())
            .parse()
            .unwrap_or(200);
        let insert_chunk_pause_seconds = env::var("INSERT_CHUNK_PAUSE_SECONDS")
            .unwrap_or_else(|_| "1".to_string())
            .parse()
            .unwrap_or(1);
        let segmentation_hour_utc = env::var("SEGMENTATION_HOUR_UTC")
            .unwrap_or_else(|_| "1".to_string())
            .parse::<u32>()
            .unwrap_or(1)
            .min(23);

        let db_host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
        let db_port = env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
        let db_name = env::var("DB_DATABASE").unwrap_or_else(|_| "fleet_trips".to_string());
        let db_user = env::var("DB_USER").unwrap_or_else(|_| "fleet".to_string());
        let db_pwd = env::var("DB_PWD").unwrap_or_else(|_| "fleet".to_string());

        let database_url = format!(
            "postgres://{}:{}@{}:{}/{}",
            db_user, db_pwd, db_host, db_port, db_name
        );

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            track_api_base_url,
            track_api_vehicle_ids,
            realtime_interval_minutes,
            catchup_batch_minutes,
            retention_days,
            insert_chunk_size,
            insert_chunk_pause_seconds,
            segmentation_hour_utc,
            database_url,
            log_level,
        })
    }
}
