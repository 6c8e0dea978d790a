use crate::core::accumulate::accumulate;
use crate::core::merge::merge_contours;
use crate::domain::model::{
    BundleOutcome, BundleReport, BundledDataset, ContourBatch, RunPhase, StationContourSet,
    StationRecord,
};
use crate::domain::ports::{IsochroneSource, Pacer};

/// Fetches every planned batch for every station, one call at a time, and folds
/// the results into a [`BundledDataset`]. Failed batches are logged and count as
/// zero features; nothing here can abort the run.
pub async fn bundle_isochrones<I, P>(
    stations: &[StationRecord],
    plan: &[ContourBatch],
    client: &I,
    pacer: &P,
) -> BundleOutcome
where
    I: IsochroneSource + ?Sized,
    P: Pacer + ?Sized,
{
    let total = stations.len();
    let mut report = BundleReport {
        stations_total: total,
        ..BundleReport::default()
    };
    let mut dataset = BundledDataset::new();
    let mut phases = Vec::with_capacity(total * 2);

    for (index, station) in stations.iter().enumerate() {
        enter(&mut phases, RunPhase::ProcessingStation(index));
        tracing::info!("[{}/{}] Fetching for {}...", index + 1, total, station.display_name);

        let contours = collect_station(station, plan, client, pacer, &mut report).await;

        if contours.is_empty() {
            tracing::warn!("   No contours collected for {}, skipping", station.display_name);
            report.stations_skipped += 1;
        } else {
            tracing::info!("   Saved {} contours total.", contours.len());
            report.stations_bundled += 1;
            if dataset.contains(&station.display_name) {
                report.stations_replaced += 1;
            }
        }

        enter(&mut phases, RunPhase::Accumulating(index));
        dataset = accumulate(dataset, &station.display_name, contours);
    }

    report.contours_collected = dataset.contour_count();

    BundleOutcome {
        dataset,
        report,
        phases,
    }
}

fn enter(phases: &mut Vec<RunPhase>, next: RunPhase) {
    tracing::debug!("Run phase: {}", next);
    phases.push(next);
}

async fn collect_station<I, P>(
    station: &StationRecord,
    plan: &[ContourBatch],
    client: &I,
    pacer: &P,
    report: &mut BundleReport,
) -> StationContourSet
where
    I: IsochroneSource + ?Sized,
    P: Pacer + ?Sized,
{
    let mut contours = StationContourSet::new();

    for batch in plan {
        report.batches_attempted += 1;

        match client.fetch(station.coordinate, batch).await {
            Ok(fetched) => {
                tracing::debug!(
                    "   Batch {}: {} features ({} discarded)",
                    batch,
                    fetched.features.len(),
                    fetched.discarded
                );
                report.features_discarded += fetched.discarded;
                contours = merge_contours(contours, fetched.features);
            }
            Err(failure) => {
                tracing::warn!("   Error on batch {}: {}", batch, failure);
                report.batches_failed += 1;
            }
        }

        pacer.pause().await;
    }

    contours
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::planner::{plan_batches, threshold_range};
    use crate::domain::model::{ContourFeature, Coordinate, FetchFailure, FetchedContours};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Answers every threshold in the batch, except for the stations and batch
    /// starts listed as failing.
    struct ScriptedEngine {
        failing_lats: Vec<f64>,
        failing_batch_starts: Vec<u32>,
        calls: Mutex<Vec<(f64, u32)>>,
    }

    impl ScriptedEngine {
        fn new() -> Self {
            Self {
                failing_lats: Vec::new(),
                failing_batch_starts: Vec::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing_station(mut self, lat: f64) -> Self {
            self.failing_lats.push(lat);
            self
        }

        fn failing_batch(mut self, start: u32) -> Self {
            self.failing_batch_starts.push(start);
            self
        }
    }

    #[async_trait]
    impl IsochroneSource for ScriptedEngine {
        async fn fetch(
            &self,
            coordinate: Coordinate,
            batch: &ContourBatch,
        ) -> Result<FetchedContours, FetchFailure> {
            let start = batch.first().map(|t| t.minutes()).unwrap_or(0);
            self.calls.lock().unwrap().push((coordinate.lat, start));

            if self.failing_lats.contains(&coordinate.lat) {
                return Err(FetchFailure::Transport("connection reset".to_string()));
            }
            if self.failing_batch_starts.contains(&start) {
                return Err(FetchFailure::Status {
                    status: 500,
                    body: "boom".to_string(),
                });
            }

            let features = batch
                .thresholds()
                .iter()
                .filter_map(|t| {
                    ContourFeature::from_geojson(json!({
                        "type": "Feature",
                        "properties": {"contour": t.minutes()},
                        "geometry": {"type": "Polygon", "coordinates": []}
                    }))
                })
                .collect();

            Ok(FetchedContours {
                features,
                discarded: 0,
            })
        }
    }

    #[derive(Default)]
    struct CountingPacer {
        pauses: AtomicUsize,
    }

    #[async_trait]
    impl Pacer for CountingPacer {
        async fn pause(&self) {
            self.pauses.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn default_plan() -> Vec<ContourBatch> {
        plan_batches(&threshold_range(1, 20), 4).unwrap()
    }

    fn stations() -> Vec<StationRecord> {
        vec![
            StationRecord::new("Allenby", 32.0, 34.7),
            StationRecord::new("Carlebach", 32.1, 34.8),
        ]
    }

    #[tokio::test]
    async fn test_all_batches_merged_per_station() {
        let engine = ScriptedEngine::new();
        let pacer = CountingPacer::default();

        let outcome = bundle_isochrones(&stations(), &default_plan(), &engine, &pacer).await;

        assert_eq!(outcome.dataset.len(), 2);
        let allenby = outcome.dataset.get("Allenby").unwrap();
        assert_eq!(allenby.thresholds(), (1..=20).collect::<Vec<_>>());
        assert_eq!(outcome.report.batches_attempted, 10);
        assert_eq!(outcome.report.batches_failed, 0);
        assert_eq!(outcome.report.contours_collected, 40);
    }

    #[tokio::test]
    async fn test_pacer_runs_after_every_call() {
        let engine = ScriptedEngine::new().failing_batch(5);
        let pacer = CountingPacer::default();

        bundle_isochrones(&stations(), &default_plan(), &engine, &pacer).await;

        assert_eq!(pacer.pauses.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn test_failed_batch_does_not_stop_other_batches() {
        let engine = ScriptedEngine::new().failing_batch(5);
        let pacer = CountingPacer::default();

        let outcome = bundle_isochrones(&stations(), &default_plan(), &engine, &pacer).await;

        let allenby = outcome.dataset.get("Allenby").unwrap();
        assert_eq!(allenby.len(), 16);
        assert!(allenby.get(5).is_none());
        assert!(allenby.get(9).is_some());
        assert_eq!(outcome.report.batches_failed, 2);
        assert_eq!(engine.calls.lock().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_failed_station_is_absent_and_others_continue() {
        let engine = ScriptedEngine::new().failing_station(32.0);
        let pacer = CountingPacer::default();

        let outcome = bundle_isochrones(&stations(), &default_plan(), &engine, &pacer).await;

        assert!(!outcome.dataset.contains("Allenby"));
        assert!(outcome.dataset.contains("Carlebach"));
        assert_eq!(outcome.report.stations_skipped, 1);
        assert_eq!(outcome.report.stations_bundled, 1);
        assert_eq!(outcome.report.batches_failed, 5);
    }

    #[tokio::test]
    async fn test_calls_follow_station_then_batch_order() {
        let engine = ScriptedEngine::new();
        let pacer = CountingPacer::default();

        bundle_isochrones(&stations(), &default_plan(), &engine, &pacer).await;

        let calls = engine.calls.lock().unwrap().clone();
        let starts: Vec<u32> = calls.iter().map(|(_, s)| *s).collect();
        assert_eq!(starts, vec![1, 5, 9, 13, 17, 1, 5, 9, 13, 17]);
        assert_eq!(calls[4].0, 32.0);
        assert_eq!(calls[5].0, 32.1);
    }

    #[tokio::test]
    async fn test_no_stations_yields_empty_dataset() {
        let engine = ScriptedEngine::new();
        let pacer = CountingPacer::default();

        let outcome = bundle_isochrones(&[], &default_plan(), &engine, &pacer).await;

        assert!(outcome.dataset.is_empty());
        assert!(outcome.phases.is_empty());
        assert_eq!(pacer.pauses.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_phases_alternate_per_station() {
        let engine = ScriptedEngine::new().failing_station(32.0);
        let pacer = CountingPacer::default();

        let outcome = bundle_isochrones(&stations(), &default_plan(), &engine, &pacer).await;

        assert_eq!(
            outcome.phases,
            vec![
                RunPhase::ProcessingStation(0),
                RunPhase::Accumulating(0),
                RunPhase::ProcessingStation(1),
                RunPhase::Accumulating(1),
            ]
        );
    }

    #[tokio::test]
    async fn test_overwritten_duplicate_counts_as_replaced() {
        let engine = ScriptedEngine::new();
        let pacer = CountingPacer::default();
        let stations = vec![
            StationRecord::new("Elifelet", 32.0, 34.7),
            StationRecord::new("Elifelet", 32.1, 34.8),
        ];

        let outcome = bundle_isochrones(&stations, &default_plan(), &engine, &pacer).await;
        let report = &outcome.report;

        assert_eq!(outcome.dataset.len(), 1);
        assert_eq!(report.stations_total, 2);
        assert_eq!(report.stations_bundled, 2);
        assert_eq!(report.stations_skipped, 0);
        assert_eq!(report.stations_replaced, 1);
        assert_eq!(report.stations_total, report.stations_bundled + report.stations_skipped);
    }
}
