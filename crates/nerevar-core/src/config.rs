use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "https://nerevar.cc/api/v1";
pub const API_URL_ENV: &str = "NEREVAR_API_URL";
pub const DATA_DIR_ENV: &str = "NEREVAR_DATA_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CoreConfig {
    pub api: ApiConfig,
    pub paths: PathsConfig,
    pub update: UpdateConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Applies to metadata lookups only; archive downloads are unbounded.
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathsConfig {
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateConfig {
    pub payload_channel: String,
    pub app_channel: String,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            payload_channel: "tes3mp".to_string(),
            app_channel: "nerevar".to_string(),
        }
    }
}

impl CoreConfig {
    pub fn from_env() -> Self {
        Self::default().with_overrides(
            std::env::var(API_URL_ENV).ok(),
            std::env::var(DATA_DIR_ENV).ok(),
        )
    }

    fn with_overrides(mut self, api_url: Option<String>, data_dir: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(dir) = data_dir.filter(|d| !d.trim().is_empty()) {
            self.paths.data_dir = Some(PathBuf::from(dir));
        }
        self
    }
}
