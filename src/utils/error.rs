use thiserror::Error;

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("HTTP client error: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Failed to load stations from {path}: {message}")]
    StationLoadError { path: String, message: String },

    #[error("Duplicate station name '{name}' in station list")]
    DuplicateStationError { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Input,
    Output,
    Configuration,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl BundleError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            BundleError::ApiError(_) => ErrorCategory::Network,
            BundleError::StationLoadError { .. }
            | BundleError::DuplicateStationError { .. } => ErrorCategory::Input,
            BundleError::IoError(_) => ErrorCategory::Output,
            BundleError::SerializationError(_) => ErrorCategory::Data,
            BundleError::InvalidConfigValueError { .. }
            | BundleError::ConfigValidationError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Configuration | ErrorCategory::Data => {
                ErrorSeverity::High
            }
            // 寫檔失敗時所有已抓取的資料都會遺失
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for the binaries, derived from severity.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            BundleError::ApiError(_) => {
                "Check network connectivity and that the isochrone endpoint is reachable"
            }
            BundleError::IoError(_) => {
                "Check that the output directory exists and is writable, then rerun"
            }
            BundleError::SerializationError(_) => "Inspect the input file for malformed JSON",
            BundleError::StationLoadError { .. } => {
                "Verify the stations file exists and every entry has a name, lat and lon (CSV needs name,name_he,lat,lon headers)"
            }
            BundleError::DuplicateStationError { .. } => {
                "Rename the duplicated station or pass --duplicate-names overwrite"
            }
            BundleError::InvalidConfigValueError { .. } | BundleError::ConfigValidationError { .. } => {
                "Review the configuration values and try again"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            BundleError::ApiError(e) => format!("Could not reach the isochrone service: {}", e),
            BundleError::IoError(e) => format!("Could not read or write a file: {}", e),
            BundleError::StationLoadError { path, message } => {
                format!("Station list '{}' could not be loaded ({})", path, message)
            }
            BundleError::DuplicateStationError { name } => {
                format!("Station '{}' appears more than once in the station list", name)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BundleError>;
