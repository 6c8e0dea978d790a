use clap::Parser;
use isochrone_bundler::core::ConfigProvider;
use isochrone_bundler::utils::error::BundleError;
use isochrone_bundler::utils::{logger, validation::Validate};
use isochrone_bundler::{BundleEngine, BundlePipeline, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-bundle")]
#[command(about = "Isochrone bundler driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "bundle-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the stations file from config
    #[arg(long)]
    stations: Option<String>,

    /// Override the output file from config
    #[arg(long)]
    output: Option<String>,

    /// Override the pause between requests, in milliseconds
    #[arg(long)]
    pacing_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    logger::init(args.verbose || config.logging.verbose, config.logging.json);
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(stations) = args.stations {
        tracing::info!("🔧 Stations file overridden to: {}", stations);
        config.source.stations_path = stations;
    }
    if let Some(output) = args.output {
        tracing::info!("🔧 Output file overridden to: {}", output);
        config.load.output_path = output;
    }
    if let Some(pacing_ms) = args.pacing_ms {
        tracing::info!("🔧 Pacing interval overridden to: {}ms", pacing_ms);
        config.pacing.interval_ms = pacing_ms;
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config);

    let pipeline = BundlePipeline::new(LocalStorage::default(), config).unwrap_or_else(|e| fail(e));
    let engine = BundleEngine::new(pipeline);

    match engine.run().await {
        Ok(summary) => {
            println!("✅ Done! Saved {} stations.", summary.report.stations_bundled);
            println!("📁 Output saved to: {}", summary.output_path);
        }
        Err(e) => fail(e),
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    println!("📋 Configuration Summary:");
    println!("  Endpoint: {}", config.isochrone_endpoint());
    println!("  Costing: {}", config.costing());
    println!("  Stations: {}", config.stations_path());
    println!("  Output: {}", config.output_path());
    println!(
        "  Contours: {}..={} min, {} per request",
        config.min_minutes(),
        config.max_minutes(),
        config.batch_size()
    );
    println!("  Pacing: {:?} between requests", config.pacing_interval());
    println!();
}

fn fail(e: BundleError) -> ! {
    tracing::error!(
        "❌ Bundle run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code())
}
