pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{http::ValhallaClient, storage::LocalStorage};
pub use config::toml_config::TomlConfig;
pub use core::{bundler::bundle_isochrones, engine::BundleEngine, pipeline::BundlePipeline};
pub use utils::error::{BundleError, Result};
