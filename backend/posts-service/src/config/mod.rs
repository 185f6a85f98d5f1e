/// Configuration for posts-service
///
/// Everything is read from the environment once at startup. Product tunables
/// for trending live in [`RankingConfig`], which carries a version string so a
/// deployed ranking can be identified from logs.
use chrono::Duration as ChronoDuration;
use db_pool::env_utils::{env_flag, env_or, env_required};
use db_pool::{DbConfig, EnvError};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::services::scoring::{DecayScorer, ScoringError};

const SERVICE_NAME: &str = "posts-service";

/// Upper bound for any ranking window; longer spans overflow timestamp math.
pub const MAX_WINDOW_DAYS: i64 = 3650;

/// Headroom given to the HTTP client so the pipeline deadline fires first.
const SEARCH_CLIENT_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Env(#[from] EnvError),

    #[error("Invalid ranking configuration: {0}")]
    Scoring(#[from] ScoringError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DbConfig,
    pub search: SearchConfig,
    pub timeouts: TimeoutConfig,
    pub ranking: RankingConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Base address of the Solr server, e.g. `http://solr:8983`.
    pub address: String,
    pub core: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

/// Per-dependency deadlines applied around every call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    pub database: Duration,
    pub search: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            database: Duration::from_millis(2000),
            search: Duration::from_millis(3000),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankingConfig {
    pub version: String,
    /// Views newer than `now - trend_window` count toward trending.
    pub trend_window: ChronoDuration,
    /// Views older than `now - prune_window` are deleted.
    pub prune_window: ChronoDuration,
    /// Only posts published within this span are trending candidates.
    pub publish_recency: Option<ChronoDuration>,
    pub target_fraction: f64,
    pub half_life_days: f64,
    pub top_k: usize,
    pub default_rows: usize,
    pub max_rows: usize,
    pub prune_interval: Duration,
    /// Also prune in the background whenever trending is requested.
    pub prune_on_request: bool,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            version: "2024-decay-v1".to_string(),
            trend_window: ChronoDuration::days(7),
            prune_window: ChronoDuration::days(7),
            publish_recency: Some(ChronoDuration::days(14)),
            target_fraction: 0.33,
            half_life_days: 7.0,
            top_k: 250,
            default_rows: 50,
            max_rows: 250,
            prune_interval: Duration::from_secs(60 * 60),
            prune_on_request: false,
        }
    }
}

impl RankingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let recency_days: i64 = env_or("PUBLISH_RECENCY_DAYS", 14)?;

        let config = Self {
            version: env_or("RANKING_CONFIG_VERSION", defaults.version)?,
            trend_window: days("TRENDING_WINDOW_DAYS", env_or("TRENDING_WINDOW_DAYS", 7)?)?,
            prune_window: days("PRUNE_WINDOW_DAYS", env_or("PRUNE_WINDOW_DAYS", 7)?)?,
            publish_recency: if recency_days > 0 {
                Some(days("PUBLISH_RECENCY_DAYS", recency_days)?)
            } else {
                None
            },
            target_fraction: env_or("DECAY_TARGET_FRACTION", defaults.target_fraction)?,
            half_life_days: env_or("DECAY_HALF_LIFE_DAYS", defaults.half_life_days)?,
            top_k: env_or("TRENDING_TOP_K", defaults.top_k)?,
            default_rows: env_or("DEFAULT_PAGE_SIZE", defaults.default_rows)?,
            max_rows: env_or("MAX_PAGE_SIZE", defaults.max_rows)?,
            prune_interval: Duration::from_secs(env_or(
                "PRUNE_INTERVAL_SECS",
                defaults.prune_interval.as_secs(),
            )?),
            prune_on_request: env_flag("PRUNE_ON_REQUEST", defaults.prune_on_request)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scorer()?;

        if self.trend_window <= ChronoDuration::zero() {
            return Err(ConfigError::Invalid("trend window must be positive".into()));
        }
        if self.prune_window <= ChronoDuration::zero() {
            return Err(ConfigError::Invalid("prune window must be positive".into()));
        }
        let max_window = ChronoDuration::days(MAX_WINDOW_DAYS);
        for (name, window) in [
            ("trend window", Some(self.trend_window)),
            ("prune window", Some(self.prune_window)),
            ("publish recency", self.publish_recency),
        ] {
            if window.is_some_and(|w| w > max_window) {
                return Err(ConfigError::Invalid(format!(
                    "{} exceeds {} days",
                    name, MAX_WINDOW_DAYS
                )));
            }
        }
        if self.top_k == 0 {
            return Err(ConfigError::Invalid("top_k must be at least 1".into()));
        }
        if self.default_rows == 0 || self.default_rows > self.max_rows {
            return Err(ConfigError::Invalid(format!(
                "default page size {} must be between 1 and max page size {}",
                self.default_rows, self.max_rows
            )));
        }
        if self.prune_interval.is_zero() {
            return Err(ConfigError::Invalid("prune interval must be positive".into()));
        }
        let prune_window = self
            .prune_window
            .to_std()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.prune_interval > prune_window {
            return Err(ConfigError::Invalid(format!(
                "prune interval {:?} exceeds prune window {:?}",
                self.prune_interval, prune_window
            )));
        }
        Ok(())
    }

    pub fn scorer(&self) -> Result<DecayScorer, ScoringError> {
        DecayScorer::new(self.target_fraction, self.half_life_days)
    }

    pub fn log_config(&self) {
        info!(
            version = %self.version,
            trend_window_days = self.trend_window.num_days(),
            prune_window_days = self.prune_window.num_days(),
            publish_recency_days = self.publish_recency.map(|d| d.num_days()),
            target_fraction = self.target_fraction,
            half_life_days = self.half_life_days,
            top_k = self.top_k,
            "Ranking configuration loaded"
        );
    }
}

fn days(key: &str, value: i64) -> Result<ChronoDuration, ConfigError> {
    ChronoDuration::try_days(value)
        .ok_or_else(|| ConfigError::Invalid(format!("{} is out of range: {}", key, value)))
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let timeouts = TimeoutConfig {
            database: Duration::from_millis(env_or("TIMEOUT_DATABASE_MS", 2000u64)?),
            search: Duration::from_millis(env_or("TIMEOUT_SEARCH_MS", 3000u64)?),
        };

        Ok(Config {
            app: AppConfig {
                env: env_or("APP_ENV", "development".to_string())?,
                port: env_or("API_PORT", 8080)?,
            },
            database: DbConfig::from_env(SERVICE_NAME)?,
            search: SearchConfig {
                address: env_required("SOLR_ADDRESS")?,
                core: env_or("SOLR_CORE", "rss".to_string())?,
                connect_timeout: Duration::from_secs(2),
                request_timeout: timeouts.search + SEARCH_CLIENT_GRACE,
            },
            timeouts,
            ranking: RankingConfig::from_env()?,
        })
    }
}
