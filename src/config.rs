use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::model::ModelDescriptor;

pub const DEFAULT_BASE_URL: &str = "https://api.xero.com";

/// Static configuration: where the API lives and which extra models exist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    /// Registered on top of the built-in accounting models; same name overrides.
    #[serde(default)]
    pub models: Vec<ModelDescriptor>,
}

impl Config {
    pub fn trace_loaded(&self) {
        info!(
            base_url = %self.api.base_url,
            models_count = self.models.len(),
            "Loaded Config"
        );
        debug!(?self, "Config loaded (full debug)");
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
