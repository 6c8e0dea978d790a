use crate::domain::model::{ContourBatch, ContourFeature, Coordinate, FetchFailure, FetchedContours};
use crate::domain::ports::IsochroneSource;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ISOCHRONE_ENDPOINT: &str = "https://valhalla1.openstreetmap.de/isochrone";
pub const DEFAULT_COSTING: &str = "pedestrian";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const MAX_LOGGED_BODY: usize = 300;

#[derive(Debug, Serialize)]
struct IsochroneRequest<'a> {
    locations: [Coordinate; 1],
    costing: &'a str,
    contours: Vec<ContourTime>,
    polygons: bool,
}

#[derive(Debug, Serialize)]
struct ContourTime {
    time: u32,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<serde_json::Value>,
}

/// Valhalla 等時線 API 客戶端 (`POST /isochrone`)
pub struct ValhallaClient {
    client: Client,
    endpoint: String,
    costing: String,
}

impl ValhallaClient {
    pub fn new(endpoint: impl Into<String>, costing: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("isochrone-bundler/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            costing: costing.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_body<'a>(&'a self, coordinate: Coordinate, batch: &ContourBatch) -> IsochroneRequest<'a> {
        IsochroneRequest {
            locations: [coordinate],
            costing: &self.costing,
            contours: batch
                .thresholds()
                .iter()
                .map(|t| ContourTime { time: t.minutes() })
                .collect(),
            polygons: true,
        }
    }
}

/// Keeps features with a positive `properties.contour`, counting the rest.
pub fn parse_feature_collection(body: &str) -> std::result::Result<FetchedContours, FetchFailure> {
    let collection: FeatureCollection =
        serde_json::from_str(body).map_err(|e| FetchFailure::Decode(e.to_string()))?;

    let mut fetched = FetchedContours::default();
    for raw in collection.features {
        match ContourFeature::from_geojson(raw) {
            Some(feature) => fetched.features.push(feature),
            None => fetched.discarded += 1,
        }
    }

    if fetched.discarded > 0 {
        tracing::debug!("Discarded {} features with unusable contour tags", fetched.discarded);
    }

    Ok(fetched)
}

fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_LOGGED_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[async_trait]
impl IsochroneSource for ValhallaClient {
    async fn fetch(
        &self,
        coordinate: Coordinate,
        batch: &ContourBatch,
    ) -> std::result::Result<FetchedContours, FetchFailure> {
        if batch.is_empty() {
            return Ok(FetchedContours::default());
        }

        let payload = self.request_body(coordinate, batch);
        tracing::debug!("POST {} contours={}", self.endpoint, batch);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| FetchFailure::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchFailure::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(FetchFailure::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        parse_feature_collection(&body)
    }
}
