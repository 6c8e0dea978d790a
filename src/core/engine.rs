use crate::core::Pipeline;
use crate::domain::model::BundleReport;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};

pub use crate::domain::model::RunPhase;

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output_path: String,
    pub report: BundleReport,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub phases: Vec<RunPhase>,
}

impl RunSummary {
    pub fn final_phase(&self) -> RunPhase {
        self.phases.last().copied().unwrap_or(RunPhase::Idle)
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

pub struct BundleEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> BundleEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Load → bundle → write. Only loading and writing can fail; in both cases
    /// nothing is written.
    pub async fn run(&self) -> Result<RunSummary> {
        let started_at = Utc::now();
        let mut phases = vec![RunPhase::Idle];

        enter(&mut phases, RunPhase::LoadingStations);
        let stations = self.pipeline.extract().await?;

        let mut outcome = self.pipeline.transform(stations).await?;
        phases.append(&mut outcome.phases);
        let report = outcome.report.clone();

        enter(&mut phases, RunPhase::WritingOutput);
        let output_path = self.pipeline.load(outcome).await?;

        enter(&mut phases, RunPhase::Done);
        let summary = RunSummary {
            output_path,
            report,
            started_at,
            finished_at: Utc::now(),
            phases,
        };

        tracing::info!(
            "📊 Bundled {}/{} stations ({} replaced by duplicates), {} contours, {} of {} batches failed, {} features discarded ({}s)",
            summary.report.stations_bundled,
            summary.report.stations_total,
            summary.report.stations_replaced,
            summary.report.contours_collected,
            summary.report.batches_failed,
            summary.report.batches_attempted,
            summary.report.features_discarded,
            summary.elapsed().num_seconds()
        );

        Ok(summary)
    }
}

fn enter(phases: &mut Vec<RunPhase>, next: RunPhase) {
    if let Some(current) = phases.last() {
        tracing::debug!("Run phase: {} -> {}", current, next);
    }
    phases.push(next);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{BundleOutcome, StationRecord};
    use crate::utils::error::BundleError;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct MockPipeline {
        stations: Vec<StationRecord>,
        fail_load: bool,
        fail_write: bool,
        transformed: AtomicBool,
    }

    impl MockPipeline {
        fn new(stations: Vec<StationRecord>) -> Self {
            Self {
                stations,
                fail_load: false,
                fail_write: false,
                transformed: AtomicBool::new(false),
            }
        }
    }

    #[async_trait::async_trait]
    impl Pipeline for MockPipeline {
        async fn extract(&self) -> Result<Vec<StationRecord>> {
            if self.fail_load {
                return Err(BundleError::StationLoadError {
                    path: "stations.json".to_string(),
                    message: "missing".to_string(),
                });
            }
            Ok(self.stations.clone())
        }

        async fn transform(&self, stations: Vec<StationRecord>) -> Result<BundleOutcome> {
            self.transformed.store(true, Ordering::SeqCst);
            let mut outcome = BundleOutcome::default();
            outcome.report.stations_total = stations.len();
            for index in 0..stations.len() {
                outcome.phases.push(RunPhase::ProcessingStation(index));
                outcome.phases.push(RunPhase::Accumulating(index));
            }
            Ok(outcome)
        }

        async fn load(&self, _outcome: BundleOutcome) -> Result<String> {
            if self.fail_write {
                return Err(BundleError::IoError(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only",
                )));
            }
            Ok("station_isochrones.json".to_string())
        }
    }

    #[tokio::test]
    async fn test_run_reaches_done() {
        let engine = BundleEngine::new(MockPipeline::new(vec![
            StationRecord::new("A", 32.0, 34.0),
            StationRecord::new("B", 32.1, 34.1),
        ]));

        let summary = engine.run().await.unwrap();

        assert_eq!(summary.final_phase(), RunPhase::Done);
        assert_eq!(
            summary.phases,
            vec![
                RunPhase::Idle,
                RunPhase::LoadingStations,
                RunPhase::ProcessingStation(0),
                RunPhase::Accumulating(0),
                RunPhase::ProcessingStation(1),
                RunPhase::Accumulating(1),
                RunPhase::WritingOutput,
                RunPhase::Done
            ]
        );
        assert_eq!(summary.report.stations_total, 2);
        assert!(summary.finished_at >= summary.started_at);
    }

    #[tokio::test]
    async fn test_empty_station_list_goes_straight_to_output() {
        let engine = BundleEngine::new(MockPipeline::new(vec![]));
        let summary = engine.run().await.unwrap();
        assert_eq!(
            summary.phases,
            vec![
                RunPhase::Idle,
                RunPhase::LoadingStations,
                RunPhase::WritingOutput,
                RunPhase::Done
            ]
        );
        assert_eq!(summary.output_path, "station_isochrones.json");
    }

    #[tokio::test]
    async fn test_load_failure_aborts_before_processing() {
        let mut pipeline = MockPipeline::new(vec![]);
        pipeline.fail_load = true;
        let engine = BundleEngine::new(pipeline);

        let err = engine.run().await.unwrap_err();

        assert!(matches!(err, BundleError::StationLoadError { .. }));
        assert!(!engine.pipeline().transformed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_write_failure_is_fatal() {
        let mut pipeline = MockPipeline::new(vec![StationRecord::new("A", 32.0, 34.0)]);
        pipeline.fail_write = true;
        let engine = BundleEngine::new(pipeline);

        let err = engine.run().await.unwrap_err();
        assert!(matches!(err, BundleError::IoError(_)));
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(RunPhase::ProcessingStation(0).to_string(), "processing station 1");
        assert_eq!(RunPhase::Accumulating(2).to_string(), "accumulating station 3");
    }
}
