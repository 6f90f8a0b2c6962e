//! Server configuration for the gateway HTTP surface.
//!
//! Two inputs exist: this flat, environment-friendly surface (clap, with
//! `ENGINE_`-prefixed variables where `.` in a setting name becomes `_`),
//! and an optional nested JSON file passed via `--config`. Both normalize
//! into the one canonical [`searchgate_engine::Config`] before validation,
//! so the rest of the system sees a single shape.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `ENGINE_SERVER_HOST` | 0.0.0.0 | Host to bind |
//! | `ENGINE_SERVER_PORT` | 8080 | Server port |
//! | `ENGINE_SEARCH_ENGINE_TYPE` | elasticsearch | Backend kind |
//! | `ENGINE_ELASTICSEARCH_HOST` | http://localhost:9200 | ES node URL |
//! | `ENGINE_ELASTICSEARCH_INDEX` | messages | ES index name |
//! | `ENGINE_AUTH_ENABLED` | false | Require credentials |
//! | `ENGINE_AUTH_API_KEY` | | Static key secret |
//! | `ENGINE_AUTH_USE_JWT` | false | Accept bearer tokens |
//! | `ENGINE_LOGGING_LEVEL` | info | Log level |

use std::fs;

use clap::Parser;
use searchgate_engine::{Config, ConfigError};

/// Flat server configuration, parsed from CLI flags and environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "searchgate")]
#[command(about = "Message full-text search gateway")]
pub struct ServerConfig {
    /// Optional nested JSON configuration file. Settings from the file
    /// replace the flat surface entirely when given.
    #[arg(long, env = "ENGINE_CONFIG")]
    pub config: Option<String>,

    /// Host address to bind to.
    #[arg(long, env = "ENGINE_SERVER_HOST", default_value = "0.0.0.0")]
    pub server_host: String,

    /// Port to listen on.
    #[arg(short, long, env = "ENGINE_SERVER_PORT", default_value = "8080")]
    pub server_port: u32,

    /// Read timeout in seconds.
    #[arg(long, env = "ENGINE_SERVER_READ_TIMEOUT", default_value = "30")]
    pub server_read_timeout: u64,

    /// Write timeout in seconds.
    #[arg(long, env = "ENGINE_SERVER_WRITE_TIMEOUT", default_value = "30")]
    pub server_write_timeout: u64,

    /// Search backend kind.
    #[arg(
        long,
        env = "ENGINE_SEARCH_ENGINE_TYPE",
        default_value = "elasticsearch"
    )]
    pub search_engine_type: String,

    /// Elasticsearch node URL.
    #[arg(
        long,
        env = "ENGINE_ELASTICSEARCH_HOST",
        default_value = "http://localhost:9200"
    )]
    pub elasticsearch_host: String,

    /// Elasticsearch basic-auth username (empty = unauthenticated).
    #[arg(long, env = "ENGINE_ELASTICSEARCH_USERNAME", default_value = "")]
    pub elasticsearch_username: String,

    /// Elasticsearch basic-auth password.
    #[arg(long, env = "ENGINE_ELASTICSEARCH_PASSWORD", default_value = "")]
    pub elasticsearch_password: String,

    /// Elasticsearch index name.
    #[arg(long, env = "ENGINE_ELASTICSEARCH_INDEX", default_value = "messages")]
    pub elasticsearch_index: String,

    /// Number of primary shards.
    #[arg(long, env = "ENGINE_ELASTICSEARCH_SHARDS", default_value = "1")]
    pub elasticsearch_shards: u32,

    /// Number of replicas per shard.
    #[arg(long, env = "ENGINE_ELASTICSEARCH_REPLICAS", default_value = "0")]
    pub elasticsearch_replicas: u32,

    /// Require credentials on /api/v1 routes.
    #[arg(long, env = "ENGINE_AUTH_ENABLED", default_value = "false")]
    pub auth_enabled: bool,

    /// Static key accepted in the X-API-Key header.
    #[arg(long, env = "ENGINE_AUTH_API_KEY", default_value = "")]
    pub auth_api_key: String,

    /// Accept RS256 bearer tokens.
    #[arg(long, env = "ENGINE_AUTH_USE_JWT", default_value = "false")]
    pub auth_use_jwt: bool,

    /// Expected token issuer.
    #[arg(long, env = "ENGINE_AUTH_ISSUER", default_value = "")]
    pub auth_issuer: String,

    /// Expected token audience.
    #[arg(long, env = "ENGINE_AUTH_AUDIENCE", default_value = "")]
    pub auth_audience: String,

    /// Path to a PEM file holding the token-verification public key.
    #[arg(long, env = "ENGINE_AUTH_PUBLIC_KEY_PATH", default_value = "")]
    pub auth_public_key_path: String,

    /// Inline PEM public key (the file path wins when both are set).
    #[arg(long, env = "ENGINE_AUTH_PUBLIC_KEY_INLINE", default_value = "")]
    pub auth_public_key_inline: String,

    /// Maximum accepted token age in seconds.
    #[arg(long, env = "ENGINE_AUTH_TOKEN_TTL", default_value = "3600")]
    pub auth_token_ttl: u64,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "ENGINE_LOGGING_LEVEL", default_value = "info")]
    pub logging_level: String,

    /// Log format (text, json).
    #[arg(long, env = "ENGINE_LOGGING_FORMAT", default_value = "text")]
    pub logging_format: String,

    /// Result caching requested (reserved; no cache layer exists yet).
    #[arg(long, env = "ENGINE_CACHE_ENABLED", default_value = "false")]
    pub cache_enabled: bool,

    /// Cache entry TTL in seconds.
    #[arg(long, env = "ENGINE_CACHE_TTL", default_value = "300")]
    pub cache_ttl: u64,

    /// Enable CORS.
    #[arg(long, env = "ENGINE_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        // Defaults mirror the clap default_value attributes.
        Self {
            config: None,
            server_host: "0.0.0.0".to_string(),
            server_port: 8080,
            server_read_timeout: 30,
            server_write_timeout: 30,
            search_engine_type: "elasticsearch".to_string(),
            elasticsearch_host: "http://localhost:9200".to_string(),
            elasticsearch_username: String::new(),
            elasticsearch_password: String::new(),
            elasticsearch_index: "messages".to_string(),
            elasticsearch_shards: 1,
            elasticsearch_replicas: 0,
            auth_enabled: false,
            auth_api_key: String::new(),
            auth_use_jwt: false,
            auth_issuer: String::new(),
            auth_audience: String::new(),
            auth_public_key_path: String::new(),
            auth_public_key_inline: String::new(),
            auth_token_ttl: 3600,
            logging_level: "info".to_string(),
            logging_format: "text".to_string(),
            cache_enabled: false,
            cache_ttl: 300,
            enable_cors: true,
        }
    }
}

impl ServerConfig {
    /// Creates a ServerConfig from environment variables, falling back to
    /// defaults when parsing fails.
    pub fn from_env() -> Self {
        Self::try_parse().unwrap_or_default()
    }

    /// Resolves the canonical engine configuration.
    ///
    /// When `--config` names a JSON file it is parsed as the nested form and
    /// used verbatim; otherwise the flat fields are normalized. Either way
    /// the result is validated before being returned, so a `Config` obtained
    /// here is safe to build an engine from.
    pub fn load_engine_config(&self) -> Result<Config, ConfigError> {
        let config = match &self.config {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|e| ConfigError::MissingField {
                    field: format!("config file {}: {}", path, e),
                })?;
                Config::from_json(&raw)?
            }
            None => self.normalize(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Maps the flat surface onto the nested canonical shape.
    fn normalize(&self) -> Config {
        let mut config = Config::default();
        config.server.host = self.server_host.clone();
        config.server.port = self.server_port;
        config.server.read_timeout_secs = self.server_read_timeout;
        config.server.write_timeout_secs = self.server_write_timeout;
        config.search_engine.kind = self.search_engine_type.clone();
        config.elasticsearch.host = self.elasticsearch_host.clone();
        config.elasticsearch.username = self.elasticsearch_username.clone();
        config.elasticsearch.password = self.elasticsearch_password.clone();
        config.elasticsearch.index = self.elasticsearch_index.clone();
        config.elasticsearch.shards = self.elasticsearch_shards;
        config.elasticsearch.replicas = self.elasticsearch_replicas;
        config.auth.enabled = self.auth_enabled;
        config.auth.api_key = self.auth_api_key.clone();
        config.auth.use_jwt = self.auth_use_jwt;
        config.auth.issuer = self.auth_issuer.clone();
        config.auth.audience = self.auth_audience.clone();
        config.auth.public_key_path = self.auth_public_key_path.clone();
        config.auth.public_key_inline = self.auth_public_key_inline.clone();
        config.auth.token_ttl_secs = self.auth_token_ttl;
        config.logging.level = self.logging_level.clone();
        config.logging.format = self.logging_format.clone();
        config.cache.enabled = self.cache_enabled;
        config.cache.ttl_secs = self.cache_ttl;
        config
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Creates a configuration suitable for testing: ephemeral port, short
    /// timeouts, no CORS.
    pub fn for_testing() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 1, // axum-test never binds it; must still validate
            server_read_timeout: 5,
            server_write_timeout: 5,
            logging_level: "debug".to_string(),
            enable_cors: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_normalizes_and_validates() {
        let server = ServerConfig::default();
        let config = server.load_engine_config().unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.elasticsearch.index, "messages");
        assert_eq!(config.search_engine.kind, "elasticsearch");
    }

    #[test]
    fn test_flat_fields_reach_nested_form() {
        let server = ServerConfig {
            server_port: 9999,
            elasticsearch_index: "chatlog".to_string(),
            auth_enabled: true,
            auth_api_key: "k".to_string(),
            ..ServerConfig::default()
        };
        let config = server.load_engine_config().unwrap();
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.elasticsearch.index, "chatlog");
        assert!(config.auth.enabled);
        assert_eq!(config.auth.api_key, "k");
    }

    #[test]
    fn test_invalid_flat_config_rejected() {
        let server = ServerConfig {
            auth_enabled: true, // no api_key, no jwt
            ..ServerConfig::default()
        };
        assert!(server.load_engine_config().is_err());
    }

    #[test]
    fn test_config_file_wins_over_flat_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"server": {{"port": 7070}}, "elasticsearch": {{"index": "from_file"}}}}"#
        )
        .unwrap();

        let server = ServerConfig {
            config: Some(file.path().to_string_lossy().into_owned()),
            server_port: 9999,
            ..ServerConfig::default()
        };
        let config = server.load_engine_config().unwrap();
        assert_eq!(config.server.port, 7070);
        assert_eq!(config.elasticsearch.index, "from_file");
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let server = ServerConfig {
            config: Some("/nonexistent/config.json".to_string()),
            ..ServerConfig::default()
        };
        assert!(server.load_engine_config().is_err());
    }

    #[test]
    fn test_socket_addr() {
        let server = ServerConfig {
            server_host: "127.0.0.1".to_string(),
            server_port: 3000,
            ..ServerConfig::default()
        };
        assert_eq!(server.socket_addr(), "127.0.0.1:3000");
    }
}
