use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::db::store::PgStore;
use crate::segmentation::segmenter::segment_points;

/// What a daily segmentation run did. Failed vehicles are reported, not
/// fatal; the run makes maximal forward progress.
#[derive(Debug)]
pub struct RunSummary {
    pub date: NaiveDate,
    pub vehicles: usize,
    pub segments_written: usize,
    pub failed_vehicles: Vec<i32>,
}

/// Derives trip segments for every vehicle active on a given day. Pure
/// consumer of the point store; shares no mutable state with the sync side.
pub struct SegmentationRunner {
    store: PgStore,
}

impl SegmentationRunner {
    pub fn new(store: PgStore) -> Self {
        Self { store }
    }

    pub async fn run_for_date(&self, date: NaiveDate) -> Result<RunSummary, sqlx::Error> {
        info!("Starting trip segmentation for {}", date);

        let vehicles = self.store.distinct_vehicles(date).await?;
        info!("Found {} vehicle(s) with points on {}", vehicles.len(), date);

        let mut summary = RunSummary {
            date,
            vehicles: vehicles.len(),
            segments_written: 0,
            failed_vehicles: Vec::new(),
        };

        for vehicle_id in vehicles {
            match self.process_vehicle(vehicle_id, date).await {
                Ok(written) => summary.segments_written += written,
                Err(e) => {
                    error!("Segmentation failed for vehicle {} on {}: {}", vehicle_id, date, e);
                    summary.failed_vehicles.push(vehicle_id);
                }
            }
        }

        info!(
            "Finished trip segmentation for {}: {} segment(s) across {} vehicle(s), {} failed",
            date,
            summary.segments_written,
            summary.vehicles,
            summary.failed_vehicles.len()
        );
        Ok(summary)
    }

    async fn process_vehicle(&self, vehicle_id: i32, date: NaiveDate) -> Result<usize, sqlx::Error> {
        let points = self.store.vehicle_points(vehicle_id, date).await?;
        if points.is_empty() {
            warn!("Vehicle {} has no points on {}", vehicle_id, date);
            return Ok(0);
        }

        let segments = segment_points(vehicle_id, date, &points);
        if segments.is_empty() {
            return Ok(0);
        }

        self.store.replace_segments(vehicle_id, date, &segments).await?;
        info!("Saved {} segment(s) for vehicle {} on {}", segments.len(), vehicle_id, date);
        Ok(segments.len())
    }
}
