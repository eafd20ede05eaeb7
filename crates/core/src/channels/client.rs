//! HTTP client for the tuner's channel list.

use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::error::ChannelListError;
use super::playlist::{parse_m3u, tuner_channels};
use super::types::TunerChannel;
use crate::config::Config;
use crate::metrics::CHANNEL_LIST_FETCHES;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches the tuner's channel list and caches it after the first success.
pub struct ChannelListClient {
    client: Client,
    list_url: String,
    stream_url_template: String,
    url_prefix: String,
    cache: RwLock<Option<Arc<Vec<TunerChannel>>>>,
}

impl ChannelListClient {
    pub fn new(config: &Config) -> Result<Self, ChannelListError> {
        Self::with_timeout(config, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(config: &Config, timeout: Duration) -> Result<Self, ChannelListError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChannelListError::Client(e.to_string()))?;

        Ok(Self {
            client,
            list_url: config.tuner.channel_list_url(),
            stream_url_template: config.tuner.stream_url_template(),
            url_prefix: config.server.url_prefix.clone(),
            cache: RwLock::new(None),
        })
    }

    pub fn list_url(&self) -> &str {
        &self.list_url
    }

    /// Cached channels, loading them on first use.
    pub async fn channels(&self) -> Result<Arc<Vec<TunerChannel>>, ChannelListError> {
        if let Some(channels) = self.cache.read().await.as_ref() {
            return Ok(Arc::clone(channels));
        }

        // Concurrent first callers queue here; only the first one fetches.
        let mut cache = self.cache.write().await;
        if let Some(channels) = cache.as_ref() {
            return Ok(Arc::clone(channels));
        }
        self.load_into(&mut cache).await
    }

    /// Reload the list from the tuner, replacing the cache on success.
    pub async fn refresh(&self) -> Result<Arc<Vec<TunerChannel>>, ChannelListError> {
        let mut cache = self.cache.write().await;
        self.load_into(&mut cache).await
    }

    async fn load_into(
        &self,
        cache: &mut Option<Arc<Vec<TunerChannel>>>,
    ) -> Result<Arc<Vec<TunerChannel>>, ChannelListError> {
        match self.fetch().await {
            Ok(channels) => {
                CHANNEL_LIST_FETCHES.with_label_values(&["success"]).inc();
                info!("Loaded {} channels from {}", channels.len(), self.list_url);
                let channels = Arc::new(channels);
                *cache = Some(Arc::clone(&channels));
                Ok(channels)
            }
            Err(e) => {
                CHANNEL_LIST_FETCHES.with_label_values(&["error"]).inc();
                warn!("Failed to load channel list from {}: {}", self.list_url, e);
                Err(e)
            }
        }
    }

    async fn fetch(&self) -> Result<Vec<TunerChannel>, ChannelListError> {
        debug!(url = %self.list_url, "Fetching channel list");

        let response = self.client.get(&self.list_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChannelListError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let entries = parse_m3u(&body)?;
        Ok(tuner_channels(
            &entries,
            &self.stream_url_template,
            &self.url_prefix,
        ))
    }
}
