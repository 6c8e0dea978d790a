use crate::adapters::http::{DEFAULT_COSTING, DEFAULT_ISOCHRONE_ENDPOINT};
use crate::config::{
    validate_settings, DEFAULT_OUTPUT_PATH, DEFAULT_PACING_INTERVAL_MS, DEFAULT_STATIONS_PATH,
    DEFAULT_TIMEOUT_SECONDS,
};
use crate::core::planner::{DEFAULT_BATCH_SIZE, DEFAULT_MAX_MINUTES, DEFAULT_MIN_MINUTES};
use crate::core::ConfigProvider;
use crate::domain::ports::DuplicatePolicy;
use crate::utils::error::{BundleError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub source: SourceConfig,
    pub isochrone: IsochroneConfig,
    pub pacing: PacingConfig,
    pub load: LoadConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub stations_path: String,
    pub duplicate_names: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            stations_path: DEFAULT_STATIONS_PATH.to_string(),
            duplicate_names: "reject".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IsochroneConfig {
    pub endpoint: String,
    pub costing: String,
    pub min_minutes: u32,
    pub max_minutes: u32,
    pub batch_size: usize,
    pub timeout_seconds: u64,
}

impl Default for IsochroneConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ISOCHRONE_ENDPOINT.to_string(),
            costing: DEFAULT_COSTING.to_string(),
            min_minutes: DEFAULT_MIN_MINUTES,
            max_minutes: DEFAULT_MAX_MINUTES,
            batch_size: DEFAULT_BATCH_SIZE,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub interval_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_PACING_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub output_path: String,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub verbose: bool,
    pub json: bool,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| BundleError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${VALHALLA_URL})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }
}

impl ConfigProvider for TomlConfig {
    fn isochrone_endpoint(&self) -> &str {
        &self.isochrone.endpoint
    }

    fn costing(&self) -> &str {
        &self.isochrone.costing
    }

    fn stations_path(&self) -> &str {
        &self.source.stations_path
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn min_minutes(&self) -> u32 {
        self.isochrone.min_minutes
    }

    fn max_minutes(&self) -> u32 {
        self.isochrone.max_minutes
    }

    fn batch_size(&self) -> usize {
        self.isochrone.batch_size
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.isochrone.timeout_seconds)
    }

    fn pacing_interval(&self) -> Duration {
        Duration::from_millis(self.pacing.interval_ms)
    }

    fn duplicate_policy(&self) -> DuplicatePolicy {
        self.source.duplicate_names.parse().unwrap_or_default()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.source
            .duplicate_names
            .parse::<DuplicatePolicy>()
            .map_err(|reason| BundleError::InvalidConfigValueError {
                field: "source.duplicate_names".to_string(),
                value: self.source.duplicate_names.clone(),
                reason,
            })?;
        validate_settings(self)
    }
}
