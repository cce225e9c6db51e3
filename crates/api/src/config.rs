use domain::SchedulerConfig;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    /// Identity token verification
    pub identity: IdentityConfig,
    #[serde(default)]
    pub cron: CronConfig,
    /// Coin economy and daily deadline
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
    #[serde(default)]
    pub push: PushConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl From<&DatabaseConfig> for persistence::db::DatabaseConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            connect_timeout_secs: config.connect_timeout_secs,
            idle_timeout_secs: config.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// HMAC secret shared with the identity provider
    pub jwt_secret: String,

    /// Expected `iss` claim, if any
    #[serde(default)]
    pub issuer: Option<String>,

    /// Leeway in seconds for clock skew tolerance
    #[serde(default = "default_identity_leeway")]
    pub leeway_secs: u64,
}

/// Shared secret of the external periodic trigger.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CronConfig {
    /// Empty disables the cron endpoints.
    #[serde(default)]
    pub secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobsConfig {
    /// Whether the binary hosts the daily jobs itself
    #[serde(default)]
    pub enabled: bool,

    /// Local hour at which overdue tasks are expired
    #[serde(default = "default_expiration_hour")]
    pub expiration_hour: u32,

    /// Local hour at which reminders are sent
    #[serde(default = "default_reminder_hour")]
    pub reminder_hour: u32,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            expiration_hour: default_expiration_hour(),
            reminder_hour: default_reminder_hour(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    /// When disabled, reminders are logged instead of delivered
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_push_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_ms: default_push_timeout_ms(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_identity_leeway() -> u64 {
    30
}
fn default_expiration_hour() -> u32 {
    4
}
fn default_reminder_hour() -> u32 {
    8
}
fn default_push_timeout_ms() -> u64 {
    5000
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

const TEST_DEFAULTS: &str = r#"
    [server]
    host = "0.0.0.0"
    port = 8080
    request_timeout_secs = 30

    [database]
    url = ""
    max_connections = 20
    min_connections = 5
    connect_timeout_secs = 10
    idle_timeout_secs = 600

    [logging]
    level = "info"
    format = "json"

    [security]
    cors_origins = []

    [identity]
    jwt_secret = "test-identity-secret"
    leeway_secs = 30

    [cron]
    secret = "test-cron-secret"

    [scheduler]
    completion_reward = 10
    failure_penalty = 10
    deadline_hour = 4
    starting_balance = 100
    utc_offset_minutes = 0

    [jobs]
    enabled = false
    expiration_hour = 4
    reminder_hour = 8

    [push]
    enabled = false
    timeout_ms = 5000
"#;

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with PAM__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("PAM").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Built from embedded defaults, without config files. Validation is
    /// skipped to allow partial configs.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(TEST_DEFAULTS, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "PAM__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.identity.jwt_secret.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "PAM__IDENTITY__JWT_SECRET environment variable must be set".to_string(),
            ));
        }

        if self.jobs.expiration_hour >= 24 || self.jobs.reminder_hour >= 24 {
            return Err(ConfigValidationError::InvalidValue(
                "job hours must be between 0 and 23".to_string(),
            ));
        }

        self.scheduler
            .validate()
            .map_err(ConfigValidationError::InvalidValue)?;

        Ok(())
    }

    /// Address to bind. Falls back to all interfaces if the host does not parse.
    pub fn socket_addr(&self) -> SocketAddr {
        let ip = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        SocketAddr::new(ip, self.server.port)
    }
}
