use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// 車站座標 (WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// 一個車站：顯示名稱加座標。顯示名稱是整次執行的唯一鍵
#[derive(Debug, Clone, PartialEq)]
pub struct StationRecord {
    pub display_name: String,
    pub coordinate: Coordinate,
}

impl StationRecord {
    pub fn new(display_name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            display_name: display_name.into(),
            coordinate: Coordinate::new(lat, lon),
        }
    }
}

/// Walking-time bound in minutes. Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ContourThreshold(u32);

impl ContourThreshold {
    pub fn new(minutes: u32) -> Option<Self> {
        (minutes > 0).then_some(Self(minutes))
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    /// Reads a `contour` property value the way the routing engine may send it:
    /// JSON numbers are truncated toward zero, integer strings are parsed.
    /// Returns `None` for missing, non-numeric or non-positive values.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let minutes = match value {
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    i
                } else {
                    let f = n.as_f64()?;
                    if !f.is_finite() {
                        return None;
                    }
                    f.trunc() as i64
                }
            }
            serde_json::Value::String(s) => s.trim().parse::<i64>().ok()?,
            _ => return None,
        };

        u32::try_from(minutes).ok().and_then(Self::new)
    }
}

impl fmt::Display for ContourThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A group of thresholds sent together in a single isochrone request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContourBatch(Vec<ContourThreshold>);

impl ContourBatch {
    pub fn new(thresholds: Vec<ContourThreshold>) -> Self {
        Self(thresholds)
    }

    pub fn thresholds(&self) -> &[ContourThreshold] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<ContourThreshold> {
        self.0.first().copied()
    }
}

impl fmt::Display for ContourBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let minutes: Vec<String> = self.0.iter().map(|t| t.to_string()).collect();
        write!(f, "[{}]", minutes.join(","))
    }
}

/// 單一等時線多邊形，保留引擎回傳的原始 GeoJSON feature
#[derive(Debug, Clone, PartialEq)]
pub struct ContourFeature {
    threshold: ContourThreshold,
    feature: serde_json::Value,
}

impl ContourFeature {
    /// Builds a feature from a raw GeoJSON value, reading `properties.contour`.
    /// Features without a usable threshold yield `None`.
    pub fn from_geojson(feature: serde_json::Value) -> Option<Self> {
        let threshold = feature
            .get("properties")
            .and_then(|props| props.get("contour"))
            .and_then(ContourThreshold::from_json)?;

        Some(Self { threshold, feature })
    }

    pub fn threshold(&self) -> ContourThreshold {
        self.threshold
    }

    pub fn geojson(&self) -> &serde_json::Value {
        &self.feature
    }
}

impl Serialize for ContourFeature {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.feature.serialize(serializer)
    }
}

/// Threshold → feature for one station. At most one feature per threshold.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StationContourSet {
    contours: BTreeMap<ContourThreshold, ContourFeature>,
}

impl StationContourSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `feature` under its threshold, returning the feature it replaced.
    pub fn insert(&mut self, feature: ContourFeature) -> Option<ContourFeature> {
        self.contours.insert(feature.threshold(), feature)
    }

    pub fn get(&self, minutes: u32) -> Option<&ContourFeature> {
        ContourThreshold::new(minutes).and_then(|t| self.contours.get(&t))
    }

    pub fn thresholds(&self) -> Vec<u32> {
        self.contours.keys().map(|t| t.minutes()).collect()
    }

    pub fn len(&self) -> usize {
        self.contours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }
}

/// Station display name → contour set. Only non-empty sets are stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BundledDataset {
    stations: BTreeMap<String, StationContourSet>,
}

impl BundledDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn replace(&mut self, name: String, contours: StationContourSet) {
        self.stations.insert(name, contours);
    }

    pub fn get(&self, name: &str) -> Option<&StationContourSet> {
        self.stations.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.stations.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn contour_count(&self) -> usize {
        self.stations.values().map(StationContourSet::len).sum()
    }

    /// Compact JSON, no trailing newline.
    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// 單次請求失敗的原因。永遠不是致命錯誤，由呼叫端當作零個 feature 處理
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchFailure {
    #[error("isochrone service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response body: {0}")]
    Decode(String),
}

/// Features accepted from one successful call, plus how many were dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedContours {
    pub features: Vec<ContourFeature>,
    pub discarded: usize,
}

/// 單次執行的統計數字
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BundleReport {
    pub stations_total: usize,
    pub stations_bundled: usize,
    pub stations_skipped: usize,
    /// Bundled stations whose name was already taken; the later set wins in the output.
    pub stations_replaced: usize,
    pub batches_attempted: usize,
    pub batches_failed: usize,
    pub contours_collected: usize,
    pub features_discarded: usize,
}

/// 執行狀態機的各個階段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    LoadingStations,
    ProcessingStation(usize),
    Accumulating(usize),
    WritingOutput,
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::Idle => write!(f, "idle"),
            RunPhase::LoadingStations => write!(f, "loading stations"),
            RunPhase::ProcessingStation(i) => write!(f, "processing station {}", i + 1),
            RunPhase::Accumulating(i) => write!(f, "accumulating station {}", i + 1),
            RunPhase::WritingOutput => write!(f, "writing output"),
            RunPhase::Done => write!(f, "done"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BundleOutcome {
    pub dataset: BundledDataset,
    pub report: BundleReport,
    /// Per-station phases in the order they were entered.
    pub phases: Vec<RunPhase>,
}
