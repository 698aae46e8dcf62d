use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::cache::ResponseCache;
use crate::error::{CoactorError, Result};
use crate::tmdb::{
    filter_credits, select_cast, CastEnvelope, CastMember, Credit, CreditsSource, DateWindow,
};

/// Connection settings for [`TmdbClient`]
#[derive(Debug, Clone)]
pub struct TmdbClientConfig {
    /// API root, e.g. `https://api.themoviedb.org/3`
    pub base_url: String,
    /// Value of the `language` query parameter
    pub language: String,
    pub timeout_secs: u64,
    /// Pause before every network request
    pub request_delay_ms: u64,
    pub max_retries: usize,
    /// First retry delay, doubled on each further attempt
    pub retry_backoff_ms: u64,
    /// Responses kept per endpoint kind; 0 disables caching
    pub cache_capacity: usize,
}

impl Default for TmdbClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.themoviedb.org/3".to_string(),
            language: "en-US".to_string(),
            timeout_secs: 20,
            request_delay_ms: 0,
            max_retries: 3,
            retry_backoff_ms: 1000,
            cache_capacity: 512,
        }
    }
}

/// TMDb HTTP client
///
/// Fetches person movie credits and movie casts, retrying rate-limited and
/// server-side failures with exponential backoff. Unfiltered responses are
/// optionally cached per endpoint so re-visited actors cost no extra calls.
pub struct TmdbClient {
    client: Client,
    api_key: String,
    config: TmdbClientConfig,
    credits_cache: Option<ResponseCache<Vec<Credit>>>,
    cast_cache: Option<ResponseCache<Vec<CastMember>>>,
}

impl TmdbClient {
    /// Create a new TMDb client
    ///
    /// # Arguments
    ///
    /// * `config` - Endpoint, retry and caching settings
    /// * `api_key` - TMDb API key sent as the `api_key` query parameter
    ///
    /// # Panics
    ///
    /// Panics if HTTP client cannot be created (should not happen in normal operation)
    pub fn new(config: TmdbClientConfig, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        let (credits_cache, cast_cache) = if config.cache_capacity > 0 {
            (
                Some(ResponseCache::new(config.cache_capacity)),
                Some(ResponseCache::new(config.cache_capacity)),
            )
        } else {
            (None, None)
        };

        Self {
            client,
            api_key,
            config,
            credits_cache,
            cast_cache,
        }
    }

    /// Fetch the `cast` list at `path`, consulting `cache` first.
    async fn cached_cast_list<T>(
        &self,
        cache: Option<&ResponseCache<Vec<T>>>,
        path: String,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Clone + Send,
    {
        if let Some(cache) = cache {
            if let Some(cached) = cache.get(&path) {
                log::debug!("Cache hit for {}", path);
                return Ok(cached);
            }
        }

        let list: Vec<T> = self.get_with_retry(&path).await?;

        if let Some(cache) = cache {
            cache.put(path, list.clone());
        }

        Ok(list)
    }

    /// Request `path` until it succeeds, fails for good, or retries run out.
    async fn get_with_retry<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let start = Instant::now();
        let mut attempt = 0;
        let mut delay = Duration::from_millis(self.config.retry_backoff_ms);

        loop {
            match self.get_once(path).await {
                Ok(list) => {
                    log::debug!(
                        "GET {} took {:?} (attempt {})",
                        path,
                        start.elapsed(),
                        attempt + 1
                    );
                    return Ok(list);
                }
                Err(e) if attempt < self.config.max_retries && e.is_retryable() => {
                    log::warn!(
                        "Retry {}/{} for {} after error: {}",
                        attempt + 1,
                        self.config.max_retries,
                        path,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2; // Exponential backoff
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Single request. A 404 means TMDb has nothing for this id and yields an empty list.
    async fn get_once<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        if self.config.request_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.request_delay_ms)).await;
        }

        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.config.language.as_str()),
            ])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| CoactorError::Api(format!("Network error: {}", e)))?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            log::warn!("TMDb has no data for {}, skipping", path);
            return Ok(Vec::new());
        }

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(CoactorError::ApiStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CoactorError::Api(format!("Network error: {}", e)))?;
        let envelope: CastEnvelope<T> =
            serde_json::from_slice(&body).map_err(|e| CoactorError::Decode(e.to_string()))?;

        Ok(envelope.cast)
    }
}

#[async_trait]
impl CreditsSource for TmdbClient {
    async fn get_credits(&self, person_id: &str, window: &DateWindow) -> Result<Vec<Credit>> {
        let path = format!("/person/{}/movie_credits", person_id);
        let credits = self
            .cached_cast_list(self.credits_cache.as_ref(), path)
            .await?;
        Ok(filter_credits(credits, window))
    }

    async fn get_cast(
        &self,
        movie_id: &str,
        limit: Option<usize>,
        exclude_ids: &[String],
    ) -> Result<Vec<CastMember>> {
        let path = format!("/movie/{}/credits", movie_id);
        let cast = self.cached_cast_list(self.cast_cache.as_ref(), path).await?;
        Ok(select_cast(cast, limit, exclude_ids))
    }
}
