//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `powerscout.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use powerscout_app::scheduler::SchedulerConfig;
use powerscout_domain::discovery::Exclusions;
use powerscout_domain::id::EntityId;

/// Upper bound for every discovery delay, one year.
const MAX_DISCOVERY_DELAY_SECS: u64 = 365 * 24 * 60 * 60;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Host registry export.
    pub registry: RegistryConfig,
    /// Discovery scheduling and exclusions.
    pub discovery: DiscoveryConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Location of the host registry export.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Path of the JSON file holding entities, states, and devices.
    pub path: PathBuf,
}

/// Discovery configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Run the background scheduler. Passes can still be started over HTTP.
    pub enabled: bool,
    pub initial_delay_secs: u64,
    pub interval_secs: u64,
    pub event_settle_secs: u64,
    /// Power entities never considered by discovery.
    pub exclude_entities: Vec<String>,
}

impl Config {
    /// Load configuration from `powerscout.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if a
    /// value fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("powerscout.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("POWERSCOUT_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("POWERSCOUT_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Ok(val) = std::env::var("POWERSCOUT_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("POWERSCOUT_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("POWERSCOUT_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("POWERSCOUT_REGISTRY_PATH") {
            self.registry.path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("POWERSCOUT_DISCOVERY_ENABLED")
            && let Ok(enabled) = val.parse()
        {
            self.discovery.enabled = enabled;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.discovery.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "discovery interval must be non-zero".to_string(),
            ));
        }
        for (name, secs) in [
            ("initial_delay_secs", self.discovery.initial_delay_secs),
            ("interval_secs", self.discovery.interval_secs),
            ("event_settle_secs", self.discovery.event_settle_secs),
        ] {
            if secs > MAX_DISCOVERY_DELAY_SECS {
                return Err(ConfigError::Validation(format!(
                    "discovery {name} must be at most {MAX_DISCOVERY_DELAY_SECS}"
                )));
            }
        }
        self.exclusions()?;
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// Parse the excluded entity ids.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the first malformed id.
    pub fn exclusions(&self) -> Result<Exclusions, ConfigError> {
        self.discovery
            .exclude_entities
            .iter()
            .map(|id| {
                id.parse::<EntityId>()
                    .map_err(|err| ConfigError::Validation(format!("exclude_entities: {err}")))
            })
            .collect()
    }

    /// Timing handed to the discovery scheduler.
    #[must_use]
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            initial_delay: Duration::from_secs(self.discovery.initial_delay_secs),
            interval: Duration::from_secs(self.discovery.interval_secs),
            event_settle: Duration::from_secs(self.discovery.event_settle_secs),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:powerscout.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "powerscoutd=info,powerscout=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("registry.json"),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_delay_secs: 30,
            interval_secs: 24 * 60 * 60,
            event_settle_secs: 1,
            exclude_entities: Vec::new(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
