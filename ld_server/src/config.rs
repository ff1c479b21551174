//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use liars_deck::{
    MatchSettings,
    constants::{DEFAULT_STARTING_LIVES, MAX_PLAYERS, MIN_PLAYERS},
    table::TableConfig,
};
use std::{
    net::{Ipv4Addr, SocketAddr},
    path::PathBuf,
    str::FromStr,
};

/// Default bind address when neither `--bind` nor `SERVER_BIND` is set
pub const DEFAULT_BIND: SocketAddr = SocketAddr::new(
    std::net::IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
    3000,
);

/// Default static asset directory
pub const DEFAULT_STATIC_DIR: &str = "public";

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Directory served for any path not matched by a route
    pub static_dir: PathBuf,
    /// Prometheus scrape endpoint; metrics are disabled when unset
    pub metrics_bind: Option<SocketAddr>,
    /// The hosted table and its match rules
    pub table: TableConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `static_dir_override` - Optional static directory override (from CLI args)
    /// * `seed_override` - Optional shuffle seed override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but can't be parsed
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        static_dir_override: Option<PathBuf>,
        seed_override: Option<u64>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_env("SERVER_BIND")?.unwrap_or(DEFAULT_BIND),
        };

        let static_dir = static_dir_override
            .or_else(|| std::env::var("STATIC_DIR").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR));

        let metrics_bind = parse_env("METRICS_BIND")?;

        let seed = match seed_override {
            Some(seed) => Some(seed),
            None => parse_env("MATCH_SEED")?,
        };

        let settings = MatchSettings {
            starting_lives: parse_env("MATCH_STARTING_LIVES")?.unwrap_or(DEFAULT_STARTING_LIVES),
            max_players: parse_env("MATCH_MAX_PLAYERS")?.unwrap_or(MAX_PLAYERS),
            seed,
        };

        let mut table = TableConfig {
            settings,
            ..TableConfig::default()
        };
        if let Ok(name) = std::env::var("TABLE_NAME") {
            table.name = name;
        }

        Ok(ServerConfig {
            bind,
            static_dir,
            metrics_bind,
            table,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        let settings = &self.table.settings;

        if settings.starting_lives < 1 {
            return Err(ConfigError::Invalid {
                var: "MATCH_STARTING_LIVES".to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }

        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&settings.max_players) {
            return Err(ConfigError::Invalid {
                var: "MATCH_MAX_PLAYERS".to_string(),
                reason: format!(
                    "Must be between {MIN_PLAYERS} and {MAX_PLAYERS} (hands of a 20-card deck)"
                ),
            });
        }

        if self.table.name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                var: "TABLE_NAME".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Must differ from the server address ({})", self.bind),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse an environment variable, treating an unset variable as `None`
fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                var: key.to_string(),
                reason: format!("{value:?}: {e}"),
            }),
        Err(_) => Ok(None),
    }
}
