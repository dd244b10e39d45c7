use serde::Deserialize;

/// Root application configuration. Loaded from environment variables with
/// the prefix `TIER3_ENGINE__` and optional TOML config files.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

/// Engine-level tunables named explicitly in spec.md §6 "Configuration
/// inputs".
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Used only if an `AllowanceRule::max_allowance_per_transaction` is
    /// absent (spec.md §6).
    #[serde(default = "default_loyalty_discount_cents")]
    pub default_loyalty_discount_cents: i64,
    /// Requests for the same LID in one day beyond this are manager-card
    /// transactions (spec.md §4.1 step 5).
    #[serde(default = "default_daily_cap")]
    pub daily_cap: i64,
}

fn default_node_id() -> String {
    "tier3-engine-01".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8088
}
fn default_database_url() -> String {
    "sqlite://tier3.db".to_string()
}
fn default_max_connections() -> u32 {
    10
}
fn default_metrics_port() -> u16 {
    9092
}
fn default_loyalty_discount_cents() -> i64 {
    50
}
fn default_daily_cap() -> i64 {
    5
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            port: default_metrics_port(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_loyalty_discount_cents: default_loyalty_discount_cents(),
            daily_cap: default_daily_cap(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            api: ApiConfig::default(),
            database: DatabaseConfig::default(),
            metrics: MetricsConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and optional config
    /// file, falling back to defaults for anything unset.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("TIER3_ENGINE")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
