use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;
use tracing::info;

use crate::models::Viewbox;
use crate::projection::Projection;

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    pub thread_count: Option<usize>,
    pub geocoder_url: String,
    pub user_agent: String,
    pub viewbox: Viewbox,
    pub min_length: usize,
    pub delay_ms: u64,
    pub zoom: u8,
    pub start_field: String,
    pub finish_field: String,
    pub projection: Projection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3002".to_string(),
            thread_count: None,
            geocoder_url: "https://nominatim.openstreetmap.org/search".to_string(),
            user_agent: concat!("cyklomapa-search/", env!("CARGO_PKG_VERSION")).to_string(),
            viewbox: Viewbox::default(),
            min_length: 2,
            delay_ms: 200,
            zoom: 16,
            start_field: "jpStartStreetSearch".to_string(),
            finish_field: "jpFinishStreetSearch".to_string(),
            projection: Projection::WebMercator,
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let path = if std::path::Path::new("cyklomapa-search.toml").exists() {
            "cyklomapa-search.toml"
        } else if std::path::Path::new("cyklomapa-search.example.toml").exists() {
            "cyklomapa-search.example.toml"
        } else {
            info!("no configuration file found, using defaults");
            return Ok(Self::default());
        };

        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        info!("loaded configuration from {}", path);
        Ok(config)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.start_field == config.finish_field {
            return Err(anyhow::anyhow!("start_field and finish_field must differ"));
        }
        Ok(config)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}
