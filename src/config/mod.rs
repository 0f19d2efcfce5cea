#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::SyncConfig;

use crate::utils::error::Result;
use crate::utils::validation::Validate;

/// Loads the configuration file when one is given, otherwise the defaults,
/// and validates the result.
pub fn load_config(path: Option<&str>) -> Result<SyncConfig> {
    let config = match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path);
            SyncConfig::from_file(path)?
        }
        None => SyncConfig::default(),
    };
    config.validate()?;
    Ok(config)
}
