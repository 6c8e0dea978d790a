pub mod accumulate;
pub mod bundler;
pub mod engine;
pub mod merge;
pub mod pacing;
pub mod pipeline;
pub mod planner;

pub use crate::domain::model::{BundleOutcome, BundledDataset, StationContourSet, StationRecord};
pub use crate::domain::ports::{ConfigProvider, IsochroneSource, Pacer, Pipeline, Storage};
pub use crate::utils::error::Result;
