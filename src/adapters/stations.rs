use crate::domain::model::StationRecord;
use crate::domain::ports::{DuplicatePolicy, StationSource, Storage};
use crate::utils::error::{BundleError, Result};
use crate::utils::validation::validate_coordinate;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;

/// 車站清單中的一筆原始資料 (`stations.json` 或 CSV)
#[derive(Debug, Clone, Deserialize)]
struct RawStation {
    name: Option<String>,
    name_he: Option<String>,
    lat: f64,
    lon: f64,
}

impl RawStation {
    /// `name_he` wins when present and non-empty, otherwise `name`. Names are kept verbatim.
    fn display_name(&self) -> Option<&str> {
        [self.name_he.as_deref(), self.name.as_deref()]
            .into_iter()
            .flatten()
            .find(|n| !n.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationFormat {
    Json,
    Csv,
}

impl StationFormat {
    pub fn from_path(path: &str) -> Self {
        if path.to_ascii_lowercase().ends_with(".csv") {
            StationFormat::Csv
        } else {
            StationFormat::Json
        }
    }
}

/// Parses and validates a station list. Every failure here is fatal for the run.
pub fn parse_stations(
    path: &str,
    data: &[u8],
    format: StationFormat,
    policy: DuplicatePolicy,
) -> Result<Vec<StationRecord>> {
    let load_error = |message: String| BundleError::StationLoadError {
        path: path.to_string(),
        message,
    };

    let raw: Vec<RawStation> = match format {
        StationFormat::Json => {
            serde_json::from_slice(data).map_err(|e| load_error(e.to_string()))?
        }
        StationFormat::Csv => {
            let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(data);
            reader
                .deserialize()
                .collect::<std::result::Result<Vec<RawStation>, csv::Error>>()
                .map_err(|e| load_error(e.to_string()))?
        }
    };

    let mut seen = HashSet::new();
    let mut stations = Vec::with_capacity(raw.len());

    for (index, entry) in raw.iter().enumerate() {
        let name = entry
            .display_name()
            .ok_or_else(|| load_error(format!("station #{} has no name", index + 1)))?;

        validate_coordinate(entry.lat, entry.lon)
            .map_err(|reason| load_error(format!("station '{}': {}", name, reason)))?;

        if !seen.insert(name.to_string()) {
            match policy {
                DuplicatePolicy::Reject => {
                    return Err(BundleError::DuplicateStationError {
                        name: name.to_string(),
                    })
                }
                DuplicatePolicy::Overwrite => {
                    tracing::warn!("⚠️ Duplicate station name '{}', later entry will win", name);
                }
            }
        }

        stations.push(StationRecord::new(name, entry.lat, entry.lon));
    }

    Ok(stations)
}

/// Reads the station list through a [`Storage`] backend.
pub struct FileStationSource<'a, S: Storage> {
    storage: &'a S,
    path: String,
    policy: DuplicatePolicy,
}

impl<'a, S: Storage> FileStationSource<'a, S> {
    pub fn new(storage: &'a S, path: impl Into<String>, policy: DuplicatePolicy) -> Self {
        Self {
            storage,
            path: path.into(),
            policy,
        }
    }
}

#[async_trait]
impl<'a, S: Storage> StationSource for FileStationSource<'a, S> {
    async fn load_stations(&self) -> Result<Vec<StationRecord>> {
        tracing::info!("Loading stations from {}...", self.path);

        let data = self
            .storage
            .read_file(&self.path)
            .await
            .map_err(|e| BundleError::StationLoadError {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        let stations = parse_stations(&self.path, &data, StationFormat::from_path(&self.path), self.policy)?;
        tracing::info!("Found {} stations.", stations.len());
        Ok(stations)
    }
}
