//! Client construction and transport-level plumbing for the Elasticsearch
//! adapter.

use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

use elasticsearch::Elasticsearch;
use elasticsearch::auth::Credentials;
use elasticsearch::http::response::Response;
use elasticsearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use elasticsearch::indices::IndicesRefreshParts;

use crate::config::ElasticsearchConfig;
use crate::error::{BackendError, EngineError, EngineResult};

/// Delay before the single retry of a failed transport call.
const RETRY_BACKOFF: Duration = Duration::from_millis(200);

/// Elasticsearch-backed search engine.
pub struct ElasticsearchEngine {
    client: Elasticsearch,
    config: ElasticsearchConfig,
}

impl Debug for ElasticsearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticsearchEngine")
            .field("host", &self.config.host)
            .field("index", &self.config.index)
            .finish_non_exhaustive()
    }
}

impl ElasticsearchEngine {
    /// Creates an engine from validated configuration. Builds the client
    /// once; no network traffic happens here.
    pub fn new(config: ElasticsearchConfig) -> EngineResult<Self> {
        let client = Self::build_client(&config)?;
        Ok(Self { client, config })
    }

    fn build_client(config: &ElasticsearchConfig) -> EngineResult<Elasticsearch> {
        let url: elasticsearch::http::Url = config.host.parse().map_err(|e| {
            EngineError::Backend(BackendError::ConnectionFailed {
                backend_name: "elasticsearch".to_string(),
                message: format!("invalid node URL '{}': {}", config.host, e),
            })
        })?;

        let conn_pool = SingleNodeConnectionPool::new(url);
        let mut builder = TransportBuilder::new(conn_pool)
            .timeout(Duration::from_millis(config.request_timeout_ms));

        if !config.username.is_empty() {
            builder = builder.auth(Credentials::Basic(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        let transport = builder.build().map_err(|e| {
            EngineError::Backend(BackendError::ConnectionFailed {
                backend_name: "elasticsearch".to_string(),
                message: format!("failed to build transport: {}", e),
            })
        })?;

        Ok(Elasticsearch::new(transport))
    }

    pub(crate) fn client(&self) -> &Elasticsearch {
        &self.client
    }

    /// Returns the adapter configuration.
    pub fn config(&self) -> &ElasticsearchConfig {
        &self.config
    }

    /// Returns the index name holding the messages.
    pub fn index(&self) -> &str {
        &self.config.index
    }

    /// Sends a request, retrying exactly once on transport failure.
    ///
    /// Safe because every write is idempotent by document key and deletes
    /// are no-ops when repeated. Request timeouts are not retried; the
    /// caller already waited the full deadline once.
    pub(crate) async fn send_with_retry<F, Fut>(
        &self,
        operation: &str,
        send: F,
    ) -> EngineResult<Response>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<Response, elasticsearch::Error>>,
    {
        match send().await {
            Ok(response) => Ok(response),
            Err(e) if e.is_timeout() => {
                tracing::warn!(operation, error = %e, "elasticsearch request timed out");
                Err(EngineError::Backend(BackendError::Timeout {
                    timeout_ms: self.config.request_timeout_ms,
                }))
            }
            Err(first) => {
                tracing::warn!(operation, error = %first, "elasticsearch call failed, retrying once");
                tokio::time::sleep(RETRY_BACKOFF).await;
                match send().await {
                    Ok(response) => Ok(response),
                    Err(e) if e.is_timeout() => Err(EngineError::Backend(BackendError::Timeout {
                        timeout_ms: self.config.request_timeout_ms,
                    })),
                    Err(second) => {
                        tracing::error!(operation, error = %second, "elasticsearch call failed after retry");
                        Err(EngineError::Backend(BackendError::Unavailable {
                            backend_name: "elasticsearch".to_string(),
                            message: format!("{} failed after retry", operation),
                        }))
                    }
                }
            }
        }
    }

    /// Checks a response status and drains the body into an error on
    /// failure. The raw backend text is logged, never returned.
    pub(crate) async fn check_response(
        &self,
        operation: &str,
        response: Response,
    ) -> EngineResult<Response> {
        let status = response.status_code();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::error!(operation, status = %status, body = %body, "elasticsearch rejected request");
        Err(EngineError::Backend(BackendError::QueryError {
            message: format!("{} returned status {}", operation, status),
        }))
    }

    /// Forces a refresh so just-indexed documents become searchable.
    ///
    /// Only needed by tests; production relies on the periodic refresh.
    pub async fn refresh_index(&self) -> EngineResult<()> {
        let index = [self.index()];
        let response = self
            .send_with_retry("refresh", || async {
                self.client
                    .indices()
                    .refresh(IndicesRefreshParts::Index(&index))
                    .send()
                    .await
            })
            .await?;
        self.check_response("refresh", response).await?;
        Ok(())
    }
}
