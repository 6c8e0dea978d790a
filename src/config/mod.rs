pub mod toml_config;

use crate::adapters::http::{DEFAULT_COSTING, DEFAULT_ISOCHRONE_ENDPOINT};
use crate::core::planner::{DEFAULT_BATCH_SIZE, DEFAULT_MAX_MINUTES, DEFAULT_MIN_MINUTES};
use crate::core::ConfigProvider;
use crate::domain::ports::DuplicatePolicy;
use crate::utils::error::{BundleError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_url, Validate,
};
use std::time::Duration;

pub const DEFAULT_STATIONS_PATH: &str = "stations.json";
pub const DEFAULT_OUTPUT_PATH: &str = "station_isochrones.json";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_PACING_INTERVAL_MS: u64 = 1000;

/// 上限與 Valhalla 公開實例的設定一致
const MAX_CONTOUR_MINUTES: u32 = 120;

/// 所有設定來源共用的驗證規則
pub(crate) fn validate_settings<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validate_url("isochrone_endpoint", config.isochrone_endpoint())?;
    validate_non_empty_string("costing", config.costing())?;
    validate_path("stations_path", config.stations_path())?;
    validate_path("output_path", config.output_path())?;
    validate_range("min_minutes", config.min_minutes(), 1, MAX_CONTOUR_MINUTES)?;
    validate_range(
        "max_minutes",
        config.max_minutes(),
        config.min_minutes(),
        MAX_CONTOUR_MINUTES,
    )?;

    if config.batch_size() == 0 {
        return Err(BundleError::InvalidConfigValueError {
            field: "batch_size".to_string(),
            value: "0".to_string(),
            reason: "Batch size must be at least 1".to_string(),
        });
    }

    if config.request_timeout().is_zero() {
        return Err(BundleError::InvalidConfigValueError {
            field: "request_timeout_seconds".to_string(),
            value: "0".to_string(),
            reason: "Requests need a bounded, non-zero timeout".to_string(),
        });
    }

    Ok(())
}

#[cfg(feature = "cli")]
pub use cli::CliConfig;

#[cfg(feature = "cli")]
mod cli {
    use super::*;
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "isochrone-bundler")]
    #[command(about = "Bundle walking isochrones for every station into one JSON file")]
    pub struct CliConfig {
        #[arg(long, default_value = DEFAULT_ISOCHRONE_ENDPOINT)]
        pub isochrone_endpoint: String,

        #[arg(long, default_value = DEFAULT_COSTING)]
        pub costing: String,

        #[arg(long, default_value = DEFAULT_STATIONS_PATH)]
        pub stations_path: String,

        #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
        pub output_path: String,

        #[arg(long, default_value_t = DEFAULT_MIN_MINUTES)]
        pub min_minutes: u32,

        #[arg(long, default_value_t = DEFAULT_MAX_MINUTES)]
        pub max_minutes: u32,

        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE, help = "Contours per request (engine cap)")]
        pub batch_size: usize,

        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECONDS)]
        pub request_timeout_seconds: u64,

        #[arg(long, default_value_t = DEFAULT_PACING_INTERVAL_MS, help = "Pause after every request, in milliseconds")]
        pub pacing_interval_ms: u64,

        #[arg(long, default_value = "reject", help = "reject | overwrite")]
        pub duplicate_names: String,

        #[arg(long, help = "Print the batch plan and stations without calling the engine")]
        pub dry_run: bool,

        #[arg(long, help = "Emit logs as JSON lines")]
        pub json_logs: bool,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,
    }

    impl Default for CliConfig {
        fn default() -> Self {
            Self::parse_from(["isochrone-bundler"])
        }
    }

    impl ConfigProvider for CliConfig {
        fn isochrone_endpoint(&self) -> &str {
            &self.isochrone_endpoint
        }

        fn costing(&self) -> &str {
            &self.costing
        }

        fn stations_path(&self) -> &str {
            &self.stations_path
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn min_minutes(&self) -> u32 {
            self.min_minutes
        }

        fn max_minutes(&self) -> u32 {
            self.max_minutes
        }

        fn batch_size(&self) -> usize {
            self.batch_size
        }

        fn request_timeout(&self) -> Duration {
            Duration::from_secs(self.request_timeout_seconds)
        }

        fn pacing_interval(&self) -> Duration {
            Duration::from_millis(self.pacing_interval_ms)
        }

        fn duplicate_policy(&self) -> DuplicatePolicy {
            // validate() 已確保字串合法
            self.duplicate_names.parse().unwrap_or_default()
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            self.duplicate_names
                .parse::<DuplicatePolicy>()
                .map_err(|reason| BundleError::InvalidConfigValueError {
                    field: "duplicate_names".to_string(),
                    value: self.duplicate_names.clone(),
                    reason,
                })?;
            validate_settings(self)
        }
    }

}
