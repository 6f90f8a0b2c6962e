//! HTTP surface tests against an in-memory mock engine.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::TestServer;
use http::HeaderValue;
use serde_json::{Value, json};

use searchgate_engine::auth::AuthGate;
use searchgate_engine::{
    ClusterHealth, Config, EngineError, EngineKind, EngineResult, HealthStatus, IndexStats,
    Message, SearchEngine, SearchHit, SearchQuery, SearchResults,
};
use searchgate_rest::create_app;
use searchgate_rest::middleware::auth::X_API_KEY;

/// Naive in-memory engine: linear scan, substring match. Enough to drive
/// the HTTP layer without a cluster.
#[derive(Default)]
struct MockEngine {
    messages: Mutex<Vec<Message>>,
}

#[async_trait]
impl SearchEngine for MockEngine {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn kind(&self) -> EngineKind {
        EngineKind::Elasticsearch
    }

    async fn upsert(&self, message: &Message) -> EngineResult<()> {
        let mut messages = self.messages.lock().unwrap();
        messages.retain(|m| m.document_id() != message.document_id());
        messages.push(message.clone());
        Ok(())
    }

    async fn search(&self, query: &SearchQuery) -> EngineResult<SearchResults> {
        let page_size = query.effective_page_size(100);
        let from = query.offset(100);
        if from + u64::from(page_size) > 10_000 {
            return Err(EngineError::validation("result window exceeded"));
        }

        let messages = self.messages.lock().unwrap();
        let matching: Vec<_> = messages
            .iter()
            .filter(|m| m.text.contains(&query.keyword))
            .filter(|m| query.chat_id.is_none_or(|c| m.chat.id == c))
            .filter(|m| query.user_id.is_none_or(|u| m.from_user.id == u))
            .cloned()
            .collect();

        let hits = matching
            .iter()
            .skip(from as usize)
            .take(page_size as usize)
            .map(|m| SearchHit {
                message: m.clone(),
                score: 1.0,
            })
            .collect();

        Ok(SearchResults {
            hits,
            total_count: matching.len() as u64,
            page: query.page.max(1),
            page_size,
        })
    }

    async fn delete_by_chat(&self, chat_id: i64) -> EngineResult<u64> {
        let mut messages = self.messages.lock().unwrap();
        let before = messages.len();
        messages.retain(|m| m.chat.id != chat_id);
        Ok((before - messages.len()) as u64)
    }

    async fn delete_by_user(&self, user_id: i64) -> EngineResult<u64> {
        let mut messages = self.messages.lock().unwrap();
        let before = messages.len();
        messages.retain(|m| m.from_user.id != user_id);
        Ok((before - messages.len()) as u64)
    }

    async fn clear(&self) -> EngineResult<()> {
        self.messages.lock().unwrap().clear();
        Ok(())
    }

    async fn stats(&self) -> EngineResult<IndexStats> {
        Ok(IndexStats {
            doc_count: self.messages.lock().unwrap().len() as u64,
            index_size_bytes: 1024,
            shard_count: 1,
            replica_count: 0,
            cluster_health: ClusterHealth::Green,
        })
    }

    async fn ping(&self) -> HealthStatus {
        HealthStatus::Healthy
    }
}

fn message_body(chat_id: i64, message_id: i64, user_id: i64, text: &str) -> Value {
    json!({
        "message_id": message_id,
        "text": text,
        "chat": { "id": chat_id, "type": "group" },
        "from_user": { "id": user_id, "username": format!("user{}", user_id) },
        "timestamp": 1_700_000_000i64,
    })
}

fn server_with_config(config: Config) -> TestServer {
    let gate = AuthGate::from_config(&config.auth).expect("gate must build");
    let app = create_app(Arc::new(MockEngine::default()), gate, config, false);
    TestServer::new(app).expect("test server must start")
}

fn open_server() -> TestServer {
    server_with_config(Config::default())
}

fn keyed_server(api_key: &str) -> TestServer {
    let mut config = Config::default();
    config.auth.enabled = true;
    config.auth.api_key = api_key.to_string();
    server_with_config(config)
}

#[tokio::test]
async fn health_is_public() {
    let server = keyed_server("s3cret");

    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "healthy");
}

#[tokio::test]
async fn upsert_then_search_roundtrip() {
    let server = open_server();

    let response = server
        .post("/api/v1/upsert")
        .json(&message_body(-100, 1, 7, "the quick brown fox"))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["result"], "ok");

    let response = server
        .post("/api/v1/search")
        .json(&json!({ "keyword": "quick" }))
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["total_count"], 1);
    assert_eq!(body["hits"][0]["message"]["chat"]["id"], -100);
}

#[tokio::test]
async fn search_rejects_empty_keyword() {
    let server = open_server();

    let response = server
        .post("/api/v1/search")
        .json(&json!({ "keyword": "  " }))
        .await;
    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["error"], "validation_error");
}

#[tokio::test]
async fn search_rejects_window_past_the_ceiling() {
    let server = open_server();

    let response = server
        .post("/api/v1/search")
        .json(&json!({ "keyword": "x", "page": 500, "page_size": 100 }))
        .await;
    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["error"], "validation_error");
}

#[tokio::test]
async fn missing_credentials_get_401() {
    let server = keyed_server("s3cret");

    let response = server
        .post("/api/v1/search")
        .json(&json!({ "keyword": "x" }))
        .await;
    response.assert_status_unauthorized();
    assert_eq!(response.json::<Value>()["error"], "unauthorized");
}

#[tokio::test]
async fn static_key_grants_access() {
    let server = keyed_server("s3cret");

    let response = server
        .post("/api/v1/search")
        .add_header(X_API_KEY.clone(), HeaderValue::from_static("s3cret"))
        .json(&json!({ "keyword": "x" }))
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn wrong_static_key_gets_401() {
    let server = keyed_server("s3cret");

    let response = server
        .post("/api/v1/search")
        .add_header(X_API_KEY.clone(), HeaderValue::from_static("nope"))
        .json(&json!({ "keyword": "x" }))
        .await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn delete_messages_requires_chat_id() {
    let server = open_server();

    let response = server.delete("/api/v1/messages").await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn delete_messages_reports_count() {
    let server = open_server();

    for i in 1..=3 {
        server
            .post("/api/v1/upsert")
            .json(&message_body(-1, i, 7, "doomed"))
            .await
            .assert_status_ok();
    }
    server
        .post("/api/v1/upsert")
        .json(&message_body(-2, 9, 7, "survivor"))
        .await
        .assert_status_ok();

    let response = server.delete("/api/v1/messages?chat_id=-1").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["deleted"], 3);
}

#[tokio::test]
async fn delete_user_reports_count() {
    let server = open_server();

    server
        .post("/api/v1/upsert")
        .json(&message_body(-1, 1, 10, "by ten"))
        .await
        .assert_status_ok();
    server
        .post("/api/v1/upsert")
        .json(&message_body(-1, 2, 20, "by twenty"))
        .await
        .assert_status_ok();

    let response = server.delete("/api/v1/users/10").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["deleted"], 1);
}

#[tokio::test]
async fn clear_requires_confirmation() {
    let server = open_server();

    server
        .post("/api/v1/upsert")
        .json(&message_body(-1, 1, 7, "still here"))
        .await
        .assert_status_ok();

    let response = server.delete("/api/v1/clear").await;
    response.assert_status_bad_request();

    // Unconfirmed clear must not have touched anything.
    let response = server
        .post("/api/v1/search")
        .json(&json!({ "keyword": "still" }))
        .await;
    assert_eq!(response.json::<Value>()["total_count"], 1);

    let response = server.delete("/api/v1/clear?confirm=true").await;
    response.assert_status_ok();

    let response = server
        .post("/api/v1/search")
        .json(&json!({ "keyword": "still" }))
        .await;
    assert_eq!(response.json::<Value>()["total_count"], 0);
}

#[tokio::test]
async fn ping_and_stats() {
    let server = open_server();

    server
        .post("/api/v1/upsert")
        .json(&message_body(-1, 1, 7, "counted"))
        .await
        .assert_status_ok();

    let response = server.get("/api/v1/ping").await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["engine"], "mock");
    assert_eq!(body["doc_count"], 1);

    let response = server.get("/api/v1/stats").await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["doc_count"], 1);
    assert_eq!(body["cluster_health"], "green");
}

// ============================================================================
// JWT auth through the full HTTP stack
// ============================================================================

mod jwt {
    use super::*;
    use std::sync::OnceLock;

    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
    use rsa::pkcs1::EncodeRsaPrivateKey;
    use rsa::pkcs8::{EncodePublicKey, LineEnding};
    use rsa::{RsaPrivateKey, RsaPublicKey};
    use serde::Serialize;

    #[derive(Serialize)]
    struct TestClaims {
        sub: String,
        iss: String,
        aud: String,
        exp: i64,
        nbf: i64,
    }

    fn test_keypair() -> &'static (String, String) {
        static KEYS: OnceLock<(String, String)> = OnceLock::new();
        KEYS.get_or_init(|| {
            let mut rng = rand::thread_rng();
            let private = RsaPrivateKey::new(&mut rng, 2048).unwrap();
            let public = RsaPublicKey::from(&private);
            (
                private.to_pkcs1_pem(LineEnding::LF).unwrap().to_string(),
                public.to_public_key_pem(LineEnding::LF).unwrap(),
            )
        })
    }

    fn jwt_server() -> TestServer {
        let (_, public_pem) = test_keypair();
        let mut config = Config::default();
        config.auth.enabled = true;
        config.auth.use_jwt = true;
        config.auth.issuer = "https://issuer.example".to_string();
        config.auth.audience = "searchgate".to_string();
        config.auth.public_key_inline = public_pem.clone();
        server_with_config(config)
    }

    fn mint_token(exp_offset_secs: i64) -> String {
        let (private_pem, _) = test_keypair();
        let now = chrono::Utc::now().timestamp();
        let claims = TestClaims {
            sub: "user-1".to_string(),
            iss: "https://issuer.example".to_string(),
            aud: "searchgate".to_string(),
            exp: now + exp_offset_secs,
            nbf: now - 60,
        };
        encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &EncodingKey::from_rsa_pem(private_pem.as_bytes()).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn valid_token_grants_access() {
        let server = jwt_server();

        let response = server
            .post("/api/v1/search")
            .authorization_bearer(mint_token(600))
            .json(&json!({ "keyword": "x" }))
            .await;
        response.assert_status_ok();
    }

    #[tokio::test]
    async fn expired_token_gets_401() {
        let server = jwt_server();

        let response = server
            .post("/api/v1/search")
            .authorization_bearer(mint_token(-600))
            .json(&json!({ "keyword": "x" }))
            .await;
        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn garbage_token_gets_401() {
        let server = jwt_server();

        let response = server
            .post("/api/v1/search")
            .authorization_bearer("not.a.token")
            .json(&json!({ "keyword": "x" }))
            .await;
        response.assert_status_unauthorized();
    }
}

// Keep an explicit check that the mock honors identity-based replacement,
// since several tests above rely on it.
#[tokio::test]
async fn upsert_replaces_by_identity() {
    let server = open_server();

    server
        .post("/api/v1/upsert")
        .json(&message_body(-1, 1, 7, "first"))
        .await
        .assert_status_ok();
    server
        .post("/api/v1/upsert")
        .json(&message_body(-1, 1, 7, "second"))
        .await
        .assert_status_ok();

    let response = server.get("/api/v1/stats").await;
    assert_eq!(response.json::<Value>()["doc_count"], 1);
}
