use std::future::Future;
use std::pin::Pin;

use reqwest::Client;
use tracing::debug;

use crate::models::{GeocodeResult, RawPlace, Viewbox};

/// A forward geocoding provider.
pub trait Geocoder: Send + Sync + 'static {
    /// Resolve free text to candidate locations.
    fn search(
        &self,
        query: String,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<GeocodeResult>>> + Send + '_>>;
}

/// Nominatim `/search`, bounded to a fixed viewbox.
pub struct Nominatim {
    client: Client,
    url: String,
    viewbox: Viewbox,
}

impl Nominatim {
    pub fn new(client: Client, url: impl Into<String>, viewbox: Viewbox) -> Self {
        Self {
            client,
            url: url.into(),
            viewbox,
        }
    }

    async fn fetch(&self, query: String) -> anyhow::Result<Vec<GeocodeResult>> {
        let viewbox = self.viewbox.to_string();
        debug!("geocoding {:?} within {}", query, viewbox);

        let resp = self
            .client
            .get(&self.url)
            .query(&[
                ("format", "json"),
                ("viewbox", viewbox.as_str()),
                ("bounded", "1"),
                ("q", query.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(anyhow::anyhow!("geocoder returned status {}", resp.status()));
        }

        let places: Vec<RawPlace> = resp
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("failed to parse geocoding response: {}", e))?;
        debug!("geocoder returned {} places for {:?}", places.len(), query);
        Ok(places.into_iter().map(GeocodeResult::from).collect())
    }
}

impl Geocoder for Nominatim {
    fn search(
        &self,
        query: String,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<GeocodeResult>>> + Send + '_>> {
        Box::pin(self.fetch(query))
    }
}
