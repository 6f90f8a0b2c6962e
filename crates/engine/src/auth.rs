//! Request authentication.
//!
//! The gate supports two credential modes that can be enabled independently:
//! a static shared key (`X-API-Key`) and RS256 bearer tokens. When both are
//! enabled either credential grants access; the static key is checked first.
//! Verification is a single pass per request and holds no state between
//! requests.

use std::fs;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

use crate::config::AuthConfig;
use crate::error::{AuthError, ConfigError};
use crate::types::Identity;

/// Where the JWT public key came from. Resolved exactly once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// JWT mode disabled; no key material loaded.
    None,
    /// Key was read from a PEM file on disk.
    FilePath(String),
    /// Key was supplied inline in the configuration.
    Inline,
}

/// Credentials extracted from a request by the transport layer.
#[derive(Debug, Clone, Default)]
pub struct RequestCredentials {
    /// Value of the `X-API-Key` header, if present.
    pub api_key: Option<String>,
    /// Bearer token from the `Authorization` header, if present.
    pub bearer_token: Option<String>,
}

impl RequestCredentials {
    /// No credentials at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// A static-key credential.
    pub fn with_api_key(key: impl Into<String>) -> Self {
        Self {
            api_key: Some(key.into()),
            bearer_token: None,
        }
    }

    /// A bearer-token credential.
    pub fn with_bearer(token: impl Into<String>) -> Self {
        Self {
            api_key: None,
            bearer_token: Some(token.into()),
        }
    }
}

/// Claims we require from a bearer token.
#[derive(Debug, Deserialize)]
struct Claims {
    sub: Option<String>,
    iss: String,
    aud: String,
    exp: i64,
}

/// Verifies request credentials against the configured auth policy.
pub struct AuthGate {
    enabled: bool,
    api_key: String,
    use_jwt: bool,
    decoding_key: Option<DecodingKey>,
    key_source: KeySource,
    validation: Validation,
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("enabled", &self.enabled)
            .field("use_jwt", &self.use_jwt)
            .field("key_source", &self.key_source)
            .finish_non_exhaustive()
    }
}

impl AuthGate {
    /// Builds a gate from validated configuration.
    ///
    /// JWT key material is resolved here, once: a file path wins over inline
    /// PEM when both are set, and the inline value is ignored with a warning.
    /// Unreadable or unparsable key material is a fatal configuration error.
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        let mut decoding_key = None;
        let mut key_source = KeySource::None;
        let mut validation = Validation::new(Algorithm::RS256);

        if config.enabled && config.use_jwt {
            let pem = if !config.public_key_path.trim().is_empty() {
                if !config.public_key_inline.trim().is_empty() {
                    tracing::warn!(
                        path = %config.public_key_path,
                        "both auth.public_key_path and auth.public_key_inline set; using the file"
                    );
                }
                key_source = KeySource::FilePath(config.public_key_path.clone());
                fs::read(&config.public_key_path).map_err(|e| ConfigError::InvalidKeyMaterial {
                    field: "auth.public_key_path".to_string(),
                    message: format!("cannot read {}: {}", config.public_key_path, e),
                })?
            } else {
                key_source = KeySource::Inline;
                config.public_key_inline.clone().into_bytes()
            };

            let key =
                DecodingKey::from_rsa_pem(&pem).map_err(|e| ConfigError::InvalidKeyMaterial {
                    field: "auth.public_key".to_string(),
                    message: format!("not a valid RSA public key PEM: {}", e),
                })?;
            decoding_key = Some(key);

            validation.set_issuer(&[config.issuer.as_str()]);
            validation.set_audience(&[config.audience.as_str()]);
            validation.validate_nbf = true;
            validation.leeway = 5;
        }

        Ok(Self {
            enabled: config.enabled,
            api_key: config.api_key.clone(),
            use_jwt: config.use_jwt,
            decoding_key,
            key_source,
            validation,
        })
    }

    /// Returns where the JWT key material was loaded from.
    pub fn key_source(&self) -> &KeySource {
        &self.key_source
    }

    /// Authenticates one request.
    ///
    /// With auth disabled every request passes as [`Identity::Anonymous`].
    /// Otherwise the static key is tried first when present, then the bearer
    /// token. Errors stay coarse so callers cannot probe which check failed.
    pub fn authenticate(&self, credentials: &RequestCredentials) -> Result<Identity, AuthError> {
        if !self.enabled {
            return Ok(Identity::Anonymous);
        }

        let static_mode = !self.api_key.is_empty();

        if static_mode {
            if let Some(presented) = &credentials.api_key {
                if constant_time_eq(presented.as_bytes(), self.api_key.as_bytes()) {
                    return Ok(Identity::StaticKey);
                }
                // Fall through to JWT when enabled; a wrong key alone is
                // not the final word if a token is also attached.
                if !self.use_jwt || credentials.bearer_token.is_none() {
                    return Err(AuthError::InvalidKey);
                }
            }
        }

        if self.use_jwt {
            if let Some(token) = &credentials.bearer_token {
                return self.verify_token(token);
            }
        }

        Err(AuthError::MissingCredentials)
    }

    fn verify_token(&self, token: &str) -> Result<Identity, AuthError> {
        let key = self.decoding_key.as_ref().ok_or(AuthError::InvalidToken)?;

        let data = decode::<Claims>(token, key, &self.validation).map_err(|e| {
            tracing::debug!(reason = %e, "bearer token rejected");
            AuthError::InvalidToken
        })?;

        Ok(Identity::Jwt {
            subject: data.claims.sub,
            issuer: data.claims.iss,
            audience: data.claims.aud,
            expires_at: data.claims.exp,
        })
    }
}

/// Compares two byte strings in constant time.
///
/// A length mismatch still folds over the overlapping bytes before
/// rejecting, so timing does not reveal how much of the secret matched.
fn constant_time_eq(presented: &[u8], expected: &[u8]) -> bool {
    if expected.is_empty() {
        return false;
    }
    if presented.len() != expected.len() {
        let _ = presented
            .iter()
            .zip(expected)
            .fold(0u8, |acc, (x, y)| acc | (x ^ y));
        return false;
    }
    let diff = presented
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (x, y)| acc | (x ^ y));
    diff == 0
}
