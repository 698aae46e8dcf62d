use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::crawl::CrawlPlan;
use crate::tmdb::{DateWindow, TmdbClientConfig};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub coactor: CoactorConfig,
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Process-level settings
#[derive(Debug, Clone, Deserialize)]
pub struct CoactorConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for CoactorConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// TMDb API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub request_delay_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            language: default_language(),
            timeout_secs: default_timeout_secs(),
            request_delay_ms: 0,
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

/// Co-actor crawl configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    #[serde(default = "default_seed_id")]
    pub seed_id: String,
    #[serde(default = "default_seed_name")]
    pub seed_name: String,
    /// Inclusive, `YYYY-MM-DD`
    #[serde(default = "default_start_date")]
    pub start_date: String,
    /// Inclusive, `YYYY-MM-DD`
    #[serde(default = "default_end_date")]
    pub end_date: String,
    #[serde(default = "default_cast_limit")]
    pub cast_limit: usize,
    #[serde(default = "default_rounds")]
    pub rounds: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seed_id: default_seed_id(),
            seed_name: default_seed_name(),
            start_date: default_start_date(),
            end_date: default_end_date(),
            cast_limit: default_cast_limit(),
            rounds: default_rounds(),
        }
    }
}

/// Output table locations
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_nodes_path")]
    pub nodes_path: PathBuf,
    #[serde(default = "default_edges_path")]
    pub edges_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            nodes_path: default_nodes_path(),
            edges_path: default_edges_path(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_api_key_env() -> String {
    "TMDB_API_KEY".to_string()
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_max_retries() -> usize {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_cache_capacity() -> usize {
    512
}

fn default_seed_id() -> String {
    "2975".to_string()
}

fn default_seed_name() -> String {
    "Laurence Fishburne".to_string()
}

fn default_start_date() -> String {
    "1999-01-01".to_string()
}

fn default_end_date() -> String {
    "1999-12-31".to_string()
}

fn default_cast_limit() -> usize {
    5
}

fn default_rounds() -> usize {
    2
}

fn default_nodes_path() -> PathBuf {
    PathBuf::from("nodes.csv")
}

fn default_edges_path() -> PathBuf {
    PathBuf::from("edges.csv")
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in COACTOR_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        let config = Self::read()?;
        config.validate()?;
        Ok(config)
    }

    /// Same lookup as [`Config::load`] but without validation, so callers
    /// can apply overrides first.
    pub fn read() -> Result<Self> {
        // .env is optional
        let _ = dotenv::dotenv();
        Self::read_from(&Self::config_path())
    }

    /// Config file location: `COACTOR_CONFIG` or `./config.toml`
    pub fn config_path() -> PathBuf {
        std::env::var("COACTOR_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"))
    }

    /// Load and validate configuration from an explicit path
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config = Self::read_from(config_path)?;
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from an explicit path without validating it
    pub fn read_from(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
        Self::parse(&config_str)
    }

    /// Output table locations from the config file at `config_path`.
    /// A missing file means the defaults; a broken one is an error.
    pub fn output_at(config_path: &Path) -> Result<OutputConfig> {
        if !config_path.exists() {
            return Ok(OutputConfig::default());
        }
        Ok(Self::read_from(config_path)?.output)
    }

    /// Replace crawl settings given on the command line
    pub fn with_overrides(mut self, rounds: Option<usize>, cast_limit: Option<usize>) -> Self {
        if let Some(rounds) = rounds {
            self.crawl.rounds = rounds;
        }
        if let Some(cast_limit) = cast_limit {
            self.crawl.cast_limit = cast_limit;
        }
        self
    }

    /// Parse configuration text without validating it
    pub fn parse(config_str: &str) -> Result<Self> {
        toml::from_str(config_str).context("Failed to parse config.toml")
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.api_key()?;

        for (field, value) in [
            ("crawl.start_date", &self.crawl.start_date),
            ("crawl.end_date", &self.crawl.end_date),
        ] {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").with_context(|| {
                format!("{} must be a YYYY-MM-DD date, got {:?}", field, value)
            })?;
            // Window filtering compares strings, so the zero-padded width matters too
            if value.len() != 10 {
                anyhow::bail!("{} must be zero-padded YYYY-MM-DD, got {:?}", field, value);
            }
        }

        if self.crawl.start_date > self.crawl.end_date {
            anyhow::bail!(
                "crawl.start_date ({}) must not be after crawl.end_date ({})",
                self.crawl.start_date,
                self.crawl.end_date
            );
        }

        if self.crawl.cast_limit == 0 {
            anyhow::bail!("crawl.cast_limit must be greater than 0");
        }

        if self.crawl.seed_id.trim().is_empty() {
            anyhow::bail!("crawl.seed_id must not be empty");
        }

        Ok(())
    }

    /// Resolve the TMDb API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.tmdb.api_key_env).with_context(|| {
            format!(
                "Environment variable {} not set. Set it in your .env file or as an environment variable with your TMDb API key.",
                self.tmdb.api_key_env
            )
        })
    }

    /// Client settings derived from the `[tmdb]` section
    pub fn client_config(&self) -> TmdbClientConfig {
        TmdbClientConfig {
            base_url: self.tmdb.base_url.clone(),
            language: self.tmdb.language.clone(),
            timeout_secs: self.tmdb.timeout_secs,
            request_delay_ms: self.tmdb.request_delay_ms,
            max_retries: self.tmdb.max_retries,
            retry_backoff_ms: self.tmdb.retry_backoff_ms,
            cache_capacity: self.tmdb.cache_capacity,
        }
    }

    /// Crawl plan derived from the `[crawl]` section
    pub fn crawl_plan(&self) -> CrawlPlan {
        CrawlPlan {
            seed_id: self.crawl.seed_id.clone(),
            seed_name: self.crawl.seed_name.clone(),
            window: DateWindow::new(self.crawl.start_date.clone(), self.crawl.end_date.clone()),
            cast_limit: self.crawl.cast_limit,
            rounds: self.crawl.rounds,
        }
    }
}
