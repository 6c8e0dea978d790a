use crate::domain::model::{
    BundleOutcome, ContourBatch, Coordinate, FetchFailure, FetchedContours, StationRecord,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 重複車站名稱的處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Fail the load when a display name repeats.
    #[default]
    Reject,
    /// Keep every record; later stations overwrite earlier ones in the output.
    Overwrite,
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(DuplicatePolicy::Reject),
            "overwrite" => Ok(DuplicatePolicy::Overwrite),
            other => Err(format!(
                "unknown duplicate policy '{}', expected 'reject' or 'overwrite'",
                other
            )),
        }
    }
}

pub trait ConfigProvider: Send + Sync {
    fn isochrone_endpoint(&self) -> &str;
    fn costing(&self) -> &str;
    fn stations_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn min_minutes(&self) -> u32;
    fn max_minutes(&self) -> u32;
    fn batch_size(&self) -> usize;
    fn request_timeout(&self) -> Duration;
    fn pacing_interval(&self) -> Duration;
    fn duplicate_policy(&self) -> DuplicatePolicy;
}

#[async_trait]
pub trait StationSource: Send + Sync {
    async fn load_stations(&self) -> Result<Vec<StationRecord>>;
}

/// Remote isochrone engine. One call per batch; failures are values, not errors.
#[async_trait]
pub trait IsochroneSource: Send + Sync {
    async fn fetch(
        &self,
        coordinate: Coordinate,
        batch: &ContourBatch,
    ) -> std::result::Result<FetchedContours, FetchFailure>;
}

/// Minimum-interval gate between consecutive remote calls.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self);
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<StationRecord>>;
    async fn transform(&self, stations: Vec<StationRecord>) -> Result<BundleOutcome>;
    async fn load(&self, outcome: BundleOutcome) -> Result<String>;
}
