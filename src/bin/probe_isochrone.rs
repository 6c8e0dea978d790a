use clap::Parser;
use isochrone_bundler::core::planner::plan_batches;
use isochrone_bundler::core::IsochroneSource;
use isochrone_bundler::domain::model::{ContourThreshold, Coordinate};
use isochrone_bundler::utils::logger;
use isochrone_bundler::ValhallaClient;
use std::time::Duration;

/// 對等時線服務送出單一請求，確認連線與回應格式
#[derive(Parser)]
#[command(name = "probe-isochrone")]
struct Args {
    #[arg(long, default_value = isochrone_bundler::adapters::http::DEFAULT_ISOCHRONE_ENDPOINT)]
    endpoint: String,

    #[arg(long, default_value_t = 32.0853)]
    lat: f64,

    #[arg(long, default_value_t = 34.7818)]
    lon: f64,

    /// Minutes to request, comma separated
    #[arg(long, value_delimiter = ',', default_values_t = vec![10u32, 20])]
    minutes: Vec<u32>,

    #[arg(long, default_value_t = 30)]
    timeout_seconds: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(true);

    let thresholds: Vec<ContourThreshold> = args
        .minutes
        .iter()
        .filter_map(|m| ContourThreshold::new(*m))
        .collect();
    let batch = plan_batches(&thresholds, thresholds.len().max(1))?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("no positive minutes given"))?;

    let client = ValhallaClient::new(&args.endpoint, "pedestrian", Duration::from_secs(args.timeout_seconds))?;

    println!("Testing {} with contours {}...", client.endpoint(), batch);
    match client.fetch(Coordinate::new(args.lat, args.lon), &batch).await {
        Ok(fetched) => {
            let minutes: Vec<u32> = fetched.features.iter().map(|f| f.threshold().minutes()).collect();
            println!("✅ Success! Contours returned: {:?}", minutes);
            if fetched.discarded > 0 {
                println!("⚠️ {} features had no usable contour tag", fetched.discarded);
            }
        }
        Err(failure) => {
            println!("❌ Failed: {}", failure);
            std::process::exit(2);
        }
    }

    Ok(())
}
