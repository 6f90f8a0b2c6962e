//! Canonical configuration for the gateway.
//!
//! Callers may load configuration from a nested JSON file or normalize it
//! from a flat environment-driven surface; either way everything funnels
//! into one [`Config`] value that is validated once at startup and then
//! treated as immutable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which search backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Elasticsearch (the only kind with a working adapter).
    Elasticsearch,
    /// Meilisearch. Recognized but not implemented.
    Meilisearch,
    /// MongoDB text search. Recognized but not implemented.
    Mongodb,
    /// Zinc. Recognized but not implemented.
    Zinc,
}

impl EngineKind {
    /// Returns the canonical lowercase name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Elasticsearch => "elasticsearch",
            EngineKind::Meilisearch => "meilisearch",
            EngineKind::Mongodb => "mongodb",
            EngineKind::Zinc => "zinc",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "elasticsearch" | "es" => Ok(EngineKind::Elasticsearch),
            "meilisearch" => Ok(EngineKind::Meilisearch),
            "mongodb" => Ok(EngineKind::Mongodb),
            "zinc" => Ok(EngineKind::Zinc),
            other => Err(ConfigError::UnknownEngineKind {
                value: other.to_string(),
            }),
        }
    }
}

/// Listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (default `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port. Must be in [1, 65535]; port 0 is rejected.
    #[serde(default = "default_port")]
    pub port: u32,

    /// Per-request read timeout in seconds.
    #[serde(default = "default_io_timeout_secs")]
    pub read_timeout_secs: u64,

    /// Per-request write timeout in seconds.
    #[serde(default = "default_io_timeout_secs")]
    pub write_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u32 {
    8080
}

fn default_io_timeout_secs() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            read_timeout_secs: default_io_timeout_secs(),
            write_timeout_secs: default_io_timeout_secs(),
        }
    }
}

/// Backend selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchEngineConfig {
    /// Backend kind, e.g. `"elasticsearch"`.
    #[serde(rename = "type", default = "default_engine_kind")]
    pub kind: String,
}

fn default_engine_kind() -> String {
    "elasticsearch".to_string()
}

impl Default for SearchEngineConfig {
    fn default() -> Self {
        Self {
            kind: default_engine_kind(),
        }
    }
}

/// Settings for the Elasticsearch adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticsearchConfig {
    /// Node URL (e.g. `http://localhost:9200`). Single-node pool.
    #[serde(default = "default_es_host")]
    pub host: String,

    /// Basic-auth username. Empty means unauthenticated.
    #[serde(default)]
    pub username: String,

    /// Basic-auth password.
    #[serde(default)]
    pub password: String,

    /// Index name holding the messages.
    #[serde(default = "default_es_index")]
    pub index: String,

    /// Number of primary shards (default: 1).
    #[serde(default = "default_shards")]
    pub shards: u32,

    /// Number of replicas per shard (default: 0).
    #[serde(default)]
    pub replicas: u32,

    /// Request timeout in milliseconds (default: 30000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Largest page size a caller may request; larger values are clamped.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,

    /// Deep-pagination ceiling. Requests whose window ends past this
    /// offset are rejected, matching the backend's own result window.
    #[serde(default = "default_max_result_window")]
    pub max_result_window: u32,
}

fn default_es_host() -> String {
    "http://localhost:9200".to_string()
}

fn default_es_index() -> String {
    "messages".to_string()
}

fn default_shards() -> u32 {
    1
}

fn default_request_timeout_ms() -> u64 {
    30000
}

fn default_max_page_size() -> u32 {
    100
}

fn default_max_result_window() -> u32 {
    10000
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            host: default_es_host(),
            username: String::new(),
            password: String::new(),
            index: default_es_index(),
            shards: default_shards(),
            replicas: 0,
            request_timeout_ms: default_request_timeout_ms(),
            max_page_size: default_max_page_size(),
            max_result_window: default_max_result_window(),
        }
    }
}

/// Authentication settings. Static key and JWT can be enabled independently;
/// when both are on, either credential grants access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Master switch. Off means every request is `Identity::Anonymous`.
    #[serde(default)]
    pub enabled: bool,

    /// Shared secret for the `X-API-Key` header. Required when `enabled`
    /// and `use_jwt` is off.
    #[serde(default)]
    pub api_key: String,

    /// Enables bearer-token verification.
    #[serde(default)]
    pub use_jwt: bool,

    /// Expected `iss` claim.
    #[serde(default)]
    pub issuer: String,

    /// Expected `aud` claim.
    #[serde(default)]
    pub audience: String,

    /// Path to a PEM file with the RS256 public key.
    #[serde(default)]
    pub public_key_path: String,

    /// Inline PEM public key. Ignored when `public_key_path` is set.
    #[serde(default)]
    pub public_key_inline: String,

    /// Maximum accepted token age in seconds.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
}

fn default_token_ttl_secs() -> u64 {
    3600
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            use_jwt: false,
            issuer: String::new(),
            audience: String::new(),
            public_key_path: String::new(),
            public_key_inline: String::new(),
            token_ttl_secs: default_token_ttl_secs(),
        }
    }
}

/// Logging settings. Consumed once at startup by the binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (default `info`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: `text` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Cache settings. Validated for forward compatibility; no cache layer
/// consumes them yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether result caching is requested.
    #[serde(default)]
    pub enabled: bool,

    /// Entry time-to-live in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_cache_ttl_secs() -> u64 {
    300
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

/// The complete gateway configuration.
///
/// Immutable after [`Config::validate`] succeeds; consumers receive it via
/// `Arc<Config>` or clone values out of it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Backend selection.
    #[serde(default)]
    pub search_engine: SearchEngineConfig,

    /// Elasticsearch adapter settings.
    #[serde(default)]
    pub elasticsearch: ElasticsearchConfig,

    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Cache settings (validated, not yet consumed).
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Config {
    /// Parses a nested JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::InvalidKeyMaterial {
            field: "config".to_string(),
            message: format!("invalid config document: {}", e),
        })
    }

    /// Returns the parsed engine kind.
    pub fn engine_kind(&self) -> Result<EngineKind, ConfigError> {
        self.search_engine.kind.parse()
    }

    /// Validates the whole configuration, returning the first violation.
    ///
    /// Must pass before the process serves traffic; a failure here is fatal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 || self.server.port > 65535 {
            return Err(ConfigError::InvalidPort {
                port: self.server.port,
            });
        }

        // Unknown kinds are rejected here; recognized-but-unimplemented
        // kinds are rejected later, when the engine is built.
        let _ = self.engine_kind()?;

        if self.elasticsearch.host.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "elasticsearch.host".to_string(),
            });
        }
        if self.elasticsearch.index.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "elasticsearch.index".to_string(),
            });
        }

        if self.auth.enabled {
            if self.auth.use_jwt {
                if self.auth.issuer.trim().is_empty() {
                    return Err(ConfigError::MissingField {
                        field: "auth.issuer".to_string(),
                    });
                }
                if self.auth.audience.trim().is_empty() {
                    return Err(ConfigError::MissingField {
                        field: "auth.audience".to_string(),
                    });
                }
                if self.auth.public_key_path.trim().is_empty()
                    && self.auth.public_key_inline.trim().is_empty()
                {
                    return Err(ConfigError::MissingField {
                        field: "auth.public_key_path or auth.public_key_inline".to_string(),
                    });
                }
            } else if self.auth.api_key.is_empty() {
                return Err(ConfigError::MissingField {
                    field: "auth.api_key".to_string(),
                });
            }
        }

        for (field, value) in [
            (
                "server.read_timeout_secs",
                self.server.read_timeout_secs as i64,
            ),
            (
                "server.write_timeout_secs",
                self.server.write_timeout_secs as i64,
            ),
            (
                "elasticsearch.request_timeout_ms",
                self.elasticsearch.request_timeout_ms as i64,
            ),
            (
                "elasticsearch.max_page_size",
                i64::from(self.elasticsearch.max_page_size),
            ),
            (
                "elasticsearch.max_result_window",
                i64::from(self.elasticsearch.max_result_window),
            ),
            ("auth.token_ttl_secs", self.auth.token_ttl_secs as i64),
            ("cache.ttl_secs", self.cache.ttl_secs as i64),
        ] {
            if value <= 0 {
                return Err(ConfigError::NonPositive {
                    field: field.to_string(),
                    value,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.elasticsearch.index, "messages");
        assert!(!config.auth.enabled);
        assert_eq!(config.auth.token_ttl_secs, 3600);
    }

    #[test]
    fn test_json_without_auth_section_is_valid() {
        // An omitted section must carry the same defaults as the
        // serde field defaults, TTL included.
        let config = Config::from_json(r#"{"server": {"port": 9200}}"#).unwrap();
        assert_eq!(config.auth.token_ttl_secs, 3600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_engine_kind_parsing() {
        assert_eq!(
            "elasticsearch".parse::<EngineKind>().unwrap(),
            EngineKind::Elasticsearch
        );
        assert_eq!("ES".parse::<EngineKind>().unwrap(), EngineKind::Elasticsearch);
        assert_eq!("zinc".parse::<EngineKind>().unwrap(), EngineKind::Zinc);
        assert!(matches!(
            "sphinx".parse::<EngineKind>(),
            Err(ConfigError::UnknownEngineKind { .. })
        ));
    }

    #[test]
    fn test_port_zero_rejected() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPort { port: 0 })
        ));
    }

    #[test]
    fn test_unknown_engine_kind_rejected() {
        let mut config = Config::default();
        config.search_engine.kind = "solr".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownEngineKind { .. })
        ));
    }

    #[test]
    fn test_empty_index_rejected() {
        let mut config = Config::default();
        config.elasticsearch.index = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("elasticsearch.index"));
    }

    #[test]
    fn test_static_key_mode_requires_api_key() {
        let mut config = Config::default();
        config.auth.enabled = true;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("auth.api_key"));

        config.auth.api_key = "secret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_jwt_mode_requires_claims_and_key_material() {
        let mut config = Config::default();
        config.auth.enabled = true;
        config.auth.use_jwt = true;
        config.auth.issuer = "https://issuer.example".to_string();
        config.auth.audience = "searchgate".to_string();

        // Neither file path nor inline PEM configured.
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("public_key"));

        config.auth.public_key_inline = "-----BEGIN PUBLIC KEY-----".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_jwt_mode_requires_issuer() {
        let mut config = Config::default();
        config.auth.enabled = true;
        config.auth.use_jwt = true;
        config.auth.audience = "searchgate".to_string();
        config.auth.public_key_path = "/etc/keys/pub.pem".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("auth.issuer"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.elasticsearch.request_timeout_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { .. })
        ));
    }

    #[test]
    fn test_from_json_nested_document() {
        let config = Config::from_json(
            r#"{
                "server": {"port": 9090},
                "search_engine": {"type": "elasticsearch"},
                "elasticsearch": {"host": "http://es:9200", "index": "msgs"},
                "auth": {"enabled": true, "api_key": "k"}
            }"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.elasticsearch.host, "http://es:9200");
        assert_eq!(config.elasticsearch.index, "msgs");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(Config::from_json("{not json").is_err());
    }
}
