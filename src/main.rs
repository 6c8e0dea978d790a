use clap::Parser;
use isochrone_bundler::core::Pipeline;
use isochrone_bundler::utils::error::BundleError;
use isochrone_bundler::utils::{logger, validation::Validate};
use isochrone_bundler::{BundleEngine, BundlePipeline, CliConfig, LocalStorage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init(config.verbose, config.json_logs);

    tracing::info!("Starting isochrone-bundler");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let dry_run = config.dry_run;
    let pipeline = match BundlePipeline::new(LocalStorage::default(), config) {
        Ok(pipeline) => pipeline,
        Err(e) => fail(e),
    };

    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - no isochrone requests will be sent");
        match pipeline.extract().await {
            Ok(stations) => {
                println!("📋 Batch plan ({} requests per station):", pipeline.plan().len());
                for batch in pipeline.plan() {
                    println!("  {}", batch);
                }
                println!("🚉 Stations ({}):", stations.len());
                for station in &stations {
                    println!(
                        "  {} ({:.5}, {:.5})",
                        station.display_name, station.coordinate.lat, station.coordinate.lon
                    );
                }
                println!(
                    "📡 Would send {} requests to {}",
                    stations.len() * pipeline.plan().len(),
                    pipeline.config().isochrone_endpoint
                );
                return Ok(());
            }
            Err(e) => fail(e),
        }
    }

    let engine = BundleEngine::new(pipeline);

    match engine.run().await {
        Ok(summary) => {
            tracing::info!("✅ Bundle completed successfully!");
            println!("✅ Done! Saved {} stations.", summary.report.stations_bundled);
            println!("📁 Output saved to: {}", summary.output_path);
        }
        Err(e) => fail(e),
    }

    Ok(())
}

fn fail(e: BundleError) -> ! {
    tracing::error!(
        "❌ Bundle run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    std::process::exit(e.exit_code())
}
