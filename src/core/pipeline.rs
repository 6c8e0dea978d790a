use crate::adapters::http::ValhallaClient;
use crate::adapters::stations::FileStationSource;
use crate::core::bundler::bundle_isochrones;
use crate::core::pacing::FixedIntervalPacer;
use crate::core::planner::{plan_batches, threshold_range};
use crate::core::{ConfigProvider, IsochroneSource, Pacer, Pipeline, Storage};
use crate::domain::model::{BundleOutcome, ContourBatch, StationRecord};
use crate::domain::ports::StationSource;
use crate::utils::error::Result;

/// Station list → per-station isochrones → one JSON artifact.
pub struct BundlePipeline<S, C, I = ValhallaClient, P = FixedIntervalPacer>
where
    S: Storage,
    C: ConfigProvider,
    I: IsochroneSource,
    P: Pacer,
{
    storage: S,
    config: C,
    client: I,
    pacer: P,
    plan: Vec<ContourBatch>,
}

impl<S: Storage, C: ConfigProvider> BundlePipeline<S, C> {
    /// Wires the Valhalla client and the fixed-interval pacer from `config`.
    pub fn new(storage: S, config: C) -> Result<Self> {
        let client = ValhallaClient::new(
            config.isochrone_endpoint(),
            config.costing(),
            config.request_timeout(),
        )?;
        let pacer = FixedIntervalPacer::new(config.pacing_interval());
        Self::with_components(storage, config, client, pacer)
    }
}

impl<S, C, I, P> BundlePipeline<S, C, I, P>
where
    S: Storage,
    C: ConfigProvider,
    I: IsochroneSource,
    P: Pacer,
{
    pub fn with_components(storage: S, config: C, client: I, pacer: P) -> Result<Self> {
        // 批次規劃與車站無關，整次執行只算一次
        let thresholds = threshold_range(config.min_minutes(), config.max_minutes());
        let plan = plan_batches(&thresholds, config.batch_size())?;

        Ok(Self {
            storage,
            config,
            client,
            pacer,
            plan,
        })
    }

    pub fn plan(&self) -> &[ContourBatch] {
        &self.plan
    }

    pub fn config(&self) -> &C {
        &self.config
    }
}

#[async_trait::async_trait]
impl<S, C, I, P> Pipeline for BundlePipeline<S, C, I, P>
where
    S: Storage,
    C: ConfigProvider,
    I: IsochroneSource,
    P: Pacer,
{
    async fn extract(&self) -> Result<Vec<StationRecord>> {
        FileStationSource::new(
            &self.storage,
            self.config.stations_path(),
            self.config.duplicate_policy(),
        )
        .load_stations()
        .await
    }

    async fn transform(&self, stations: Vec<StationRecord>) -> Result<BundleOutcome> {
        tracing::info!(
            "Starting fetch for {} stations ({} batches per station)...",
            stations.len(),
            self.plan.len()
        );

        Ok(bundle_isochrones(&stations, &self.plan, &self.client, &self.pacer).await)
    }

    async fn load(&self, outcome: BundleOutcome) -> Result<String> {
        let output_path = self.config.output_path();
        tracing::info!("Finished. Saving to {}...", output_path);

        let data = outcome.dataset.to_json_bytes()?;
        self.storage.write_file(output_path, &data).await?;

        Ok(output_path.to_string())
    }
}
