//! HTTP client for the hosted JSON store holding the city/weather dataset.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Response};
use serde::Serialize;
use tracing::instrument;
use url::Url;

use crate::types::{CityId, Dataset, StoreError, WeatherReading};

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_DATASET_PATH: &str = "weather";
const WEATHER_COLLECTION: &str = "weather";

/// Body sent on PATCH: the full reading plus its id
#[derive(Serialize)]
struct WeatherRecord<'a> {
    id: &'a CityId,
    #[serde(flatten)]
    reading: &'a WeatherReading,
}

#[derive(Debug, Clone)]
pub struct RemoteStore {
    client: Arc<Client>,
    base_url: Url,
    dataset_path: String,
}

impl RemoteStore {
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url).map_err(|e| StoreError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(format!(
                "{} cannot be used as a base URL",
                base_url
            )));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url,
            dataset_path: DEFAULT_DATASET_PATH.to_string(),
        })
    }

    /// Serve the dataset from another path (default `weather`)
    pub fn with_dataset_path(mut self, path: impl Into<String>) -> Self {
        self.dataset_path = path.into();
        self
    }

    fn endpoint<'s>(&self, segments: impl IntoIterator<Item = &'s str>) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments.into_iter().filter(|s| !s.is_empty()));
        Ok(url)
    }

    fn weather_url(&self, id: &CityId) -> Result<Url, StoreError> {
        self.endpoint([WEATHER_COLLECTION, id.as_str()])
    }

    /// Check response status and extract error
    async fn check_response(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    /// Fetch the full `{cities, weather}` dataset.
    ///
    /// Anything but a 2xx `application/json` response is an error.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_dataset(&self) -> Result<Dataset, StoreError> {
        let url = self.endpoint(self.dataset_path.split('/'))?;
        tracing::debug!("Fetching dataset from {}", url);

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;
        let response = Self::check_response(response).await?;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !is_json(&content_type) {
            return Err(StoreError::ContentType(content_type));
        }

        let body = response.bytes().await?;
        let dataset: Dataset =
            serde_json::from_slice(&body).map_err(|e| StoreError::Parse(e.to_string()))?;

        tracing::info!(
            "Fetched {} cities and {} weather readings",
            dataset.cities.len(),
            dataset.weather.len()
        );
        Ok(dataset)
    }

    /// Send the updated reading for `id`
    #[instrument(skip(self, reading), level = "info")]
    pub async fn patch_weather(
        &self,
        id: &CityId,
        reading: &WeatherReading,
    ) -> Result<(), StoreError> {
        let url = self.weather_url(id)?;

        let response = self
            .client
            .patch(url)
            .json(&WeatherRecord { id, reading })
            .send()
            .await?;
        Self::check_response(response).await?;

        tracing::debug!("Patched weather for {}", id);
        Ok(())
    }

    /// Remove the reading for `id`
    #[instrument(skip(self), level = "info")]
    pub async fn delete_weather(&self, id: &CityId) -> Result<(), StoreError> {
        let url = self.weather_url(id)?;

        let response = self.client.delete(url).send().await?;
        Self::check_response(response).await?;

        tracing::debug!("Deleted weather for {}", id);
        Ok(())
    }
}

/// Whether a `Content-Type` value names JSON, ignoring case and parameters
fn is_json(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|essence| essence.eq_ignore_ascii_case("application/json"))
}
