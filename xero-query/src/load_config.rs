/// `load_config` module: reads the static YAML config and turns it into the
/// core [`Config`] plus the [`ModelRegistry`] the CLI queries against.
///
/// Secrets never live in the YAML file; see [`crate::transport::Credentials`].
///
/// # Errors
/// All errors in this module use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::Result;
use std::fs;
use std::path::Path;
use tracing::{error, info};
use xero_query_core::config::Config;
use xero_query_core::ModelRegistry;

/// Loads and parses a YAML config file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let config: Config = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    config.trace_loaded();
    Ok(config)
}

/// The built-in accounting models with the config's models layered on top.
pub fn build_registry(config: &Config) -> ModelRegistry {
    let mut registry = ModelRegistry::with_accounting_defaults();
    for model in &config.models {
        info!(model = %model.name, resource_uri = %model.resource_uri, "Registering model from config");
        registry.register(model.clone());
    }
    registry
}
