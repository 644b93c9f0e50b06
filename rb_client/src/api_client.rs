//! HTTP API client for the blackjack server.

use async_trait::async_trait;
use remote_blackjack::{
    ActionResponse, ApiError, Endpoint, ErrorClass, GameApi, GatewayError, GatewayResult, Params,
    SessionInit, net::errors::ErrorBody,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::time::Duration;
use uuid::Uuid;

use crate::{
    config::ClientConfig,
    identity::{FileIdentityStore, IdentityStore},
};

/// A response as received, before any interpretation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

/// Sends one JSON `POST` and returns whatever came back.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fails only when no response was received at all.
    async fn post(&self, path: &str, body: &Value) -> Result<RawResponse, String>;
}

/// reqwest transport that keeps the server's session cookie.
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a new transport
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, path: &str, body: &Value) -> Result<RawResponse, String> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        let body = response.text().await.map_err(|e| e.to_string())?;
        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

/// API client for communicating with the blackjack server
pub struct ApiClient<T, S> {
    transport: T,
    identity: S,
}

/// The client used by the binary.
pub type HttpApiClient = ApiClient<HttpTransport, FileIdentityStore>;

impl HttpApiClient {
    pub fn from_config(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            HttpTransport::new(config.server_url.clone(), config.request_timeout)?,
            FileIdentityStore::new(config.identity_file.clone()),
        ))
    }
}

impl<T: Transport, S: IdentityStore> ApiClient<T, S> {
    /// Create a new API client
    pub fn new(transport: T, identity: S) -> Self {
        Self {
            transport,
            identity,
        }
    }

    pub fn identity(&self) -> &S {
        &self.identity
    }

    fn stored_identity(&self) -> GatewayResult<Option<String>> {
        self.identity
            .load()
            .map_err(|e| GatewayError::Identity(e.to_string()))
    }

    /// The stored id, generating and persisting one on first use.
    fn identity_or_create(&self) -> GatewayResult<String> {
        if let Some(id) = self.stored_identity()? {
            return Ok(id);
        }
        let id = Uuid::new_v4().to_string();
        self.identity
            .save(&id)
            .map_err(|e| GatewayError::Identity(e.to_string()))?;
        log::info!("Generated new client identity");
        Ok(id)
    }

    /// Calls an action endpoint.
    ///
    /// Mutating calls carry a fresh idempotency key. A 401 re-initializes the
    /// session and retries the call once with the same key.
    async fn call_endpoint(&self, endpoint: Endpoint, mut params: Params) -> GatewayResult<Value> {
        if endpoint.is_mutating() {
            params.insert(
                "idempotency_key".to_string(),
                Value::from(Uuid::new_v4().to_string()),
            );
        }
        if endpoint == Endpoint::ForceRestart {
            let client_id = self
                .stored_identity()?
                .ok_or_else(|| GatewayError::Identity("no stored client id".to_string()))?;
            params.insert("client_id".to_string(), Value::from(client_id));
        }
        let body = Value::Object(params);

        let result = match self.send(endpoint, &body).await {
            Err(GatewayError::Http { error, .. })
                if error.is_session_expired() && endpoint != Endpoint::InitializeSession =>
            {
                log::debug!("{endpoint}: session expired, re-initializing once");
                self.initialize_session().await?;
                self.send(endpoint, &body).await
            }
            other => other,
        };
        result.inspect_err(log_failure)
    }

    /// One request, with the status mapped to a result.
    async fn send(&self, endpoint: Endpoint, body: &Value) -> GatewayResult<Value> {
        let raw = self
            .transport
            .post(&endpoint.path(), body)
            .await
            .map_err(|message| GatewayError::Network { endpoint, message })?;

        if !(200..300).contains(&raw.status) {
            let data = if raw.body.trim().is_empty() {
                ErrorBody::default()
            } else {
                ErrorBody::from_raw(&raw.body)
            };
            return Err(GatewayError::Http {
                endpoint,
                error: ApiError::new(raw.status, raw.status_text, data),
            });
        }

        if raw.status == 204 || raw.body.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        serde_json::from_str(&raw.body).map_err(|e| GatewayError::Malformed {
            endpoint,
            reason: format!("invalid JSON: {e}"),
        })
    }
}

#[async_trait]
impl<T: Transport, S: IdentityStore> GameApi for ApiClient<T, S> {
    async fn initialize_session(&self) -> GatewayResult<SessionInit> {
        let endpoint = Endpoint::InitializeSession;
        let client_id = self.identity_or_create()?;

        let value = self
            .send(endpoint, &json!({ "client_id": client_id }))
            .await
            .inspect_err(log_failure)?;
        let init: SessionInit = parse(endpoint, value)?;

        if init.client_id != client_id {
            self.identity
                .save(&init.client_id)
                .map_err(|e| GatewayError::Identity(e.to_string()))?;
            log::info!("Server issued a new client identity");
        }
        log::debug!("Session initialized with {} tokens", init.tokens);
        Ok(init)
    }

    async fn call(&self, endpoint: Endpoint, params: Params) -> GatewayResult<ActionResponse> {
        let value = self.call_endpoint(endpoint, params).await?;
        parse(endpoint, value)
    }
}

fn parse<R: DeserializeOwned>(endpoint: Endpoint, value: Value) -> GatewayResult<R> {
    serde_json::from_value(value).map_err(|e| {
        let err = GatewayError::Malformed {
            endpoint,
            reason: e.to_string(),
        };
        log::error!("{err}");
        err
    })
}

fn log_failure(err: &GatewayError) {
    match err.class() {
        ErrorClass::Benign => log::debug!("{err}"),
        _ => log::error!("{err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::MemoryIdentityStore;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Answers from a queue and records every request.
    #[derive(Default)]
    struct FakeTransport {
        responses: Mutex<VecDeque<Result<RawResponse, String>>>,
        requests: Mutex<Vec<(String, Value)>>,
    }

    impl FakeTransport {
        fn respond(self, status: u16, body: Value) -> Self {
            self.responses.lock().unwrap().push_back(Ok(RawResponse {
                status,
                status_text: String::new(),
                body: body.to_string(),
            }));
            self
        }

        fn respond_raw(self, status: u16, body: &str) -> Self {
            self.responses.lock().unwrap().push_back(Ok(RawResponse {
                status,
                status_text: "Bad Gateway".to_string(),
                body: body.to_string(),
            }));
            self
        }

        fn drop_connection(self) -> Self {
            self.responses
                .lock()
                .unwrap()
                .push_back(Err("connection reset".to_string()));
            self
        }

        fn paths(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|(p, _)| p.clone())
                .collect()
        }

        fn body(&self, idx: usize) -> Value {
            self.requests.lock().unwrap()[idx].1.clone()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn post(&self, path: &str, body: &Value) -> Result<RawResponse, String> {
            self.requests
                .lock()
                .unwrap()
                .push((path.to_string(), body.clone()));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err("no scripted response".to_string()))
        }
    }

    fn action_body(tokens: i64) -> Value {
        json!({ "current_tokens": tokens, "game_state": { "bet": 0 } })
    }

    fn session_body(client_id: &str) -> Value {
        json!({
            "client_id": client_id,
            "tokens": 1000,
            "game_state": { "deck_len": 104, "is_round_active": false, "target_phase": "BETTING" }
        })
    }

    fn client(transport: FakeTransport) -> ApiClient<FakeTransport, MemoryIdentityStore> {
        ApiClient::new(transport, MemoryIdentityStore::with_id("known-id"))
    }

    #[tokio::test]
    async fn test_mutating_calls_carry_fresh_keys() {
        let api = client(
            FakeTransport::default()
                .respond(200, action_body(1000))
                .respond(200, action_body(1000))
                .respond(200, action_body(1000)),
        );
        api.call(Endpoint::Hit, Params::new()).await.unwrap();
        api.call(Endpoint::Hit, Params::new()).await.unwrap();
        api.call(Endpoint::RecoverGameState, Params::new())
            .await
            .unwrap();

        let first = api.transport.body(0)["idempotency_key"].clone();
        let second = api.transport.body(1)["idempotency_key"].clone();
        assert!(first.is_string());
        assert_ne!(first, second);
        assert!(api.transport.body(2).get("idempotency_key").is_none());
    }

    #[tokio::test]
    async fn test_session_expiry_retries_once_with_same_key() {
        let api = client(
            FakeTransport::default()
                .respond(401, json!({ "message": "Session expired." }))
                .respond(200, session_body("known-id"))
                .respond(200, action_body(900)),
        );
        let response = api.call(Endpoint::Hit, Params::new()).await.unwrap();
        assert_eq!(response.current_tokens, 900);

        assert_eq!(
            api.transport.paths(),
            vec!["/api/hit", "/api/initialize_session", "/api/hit"]
        );
        assert_eq!(
            api.transport.body(0)["idempotency_key"],
            api.transport.body(2)["idempotency_key"]
        );
        assert_eq!(api.transport.body(1), json!({ "client_id": "known-id" }));
    }

    #[tokio::test]
    async fn test_second_expiry_is_final() {
        let api = client(
            FakeTransport::default()
                .respond(401, json!({}))
                .respond(200, session_body("known-id"))
                .respond(401, json!({})),
        );
        let err = api.call(Endpoint::Bet, Params::new()).await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::SessionExpired);
        assert_eq!(api.transport.paths().len(), 3);
    }

    #[tokio::test]
    async fn test_force_restart_carries_client_id() {
        let api = client(FakeTransport::default().respond(200, action_body(1000)));
        api.call(Endpoint::ForceRestart, Params::new())
            .await
            .unwrap();
        assert_eq!(api.transport.body(0)["client_id"], json!("known-id"));
        assert!(api.transport.body(0)["idempotency_key"].is_string());
    }

    #[tokio::test]
    async fn test_force_restart_without_identity_fails_locally() {
        let api = ApiClient::new(FakeTransport::default(), MemoryIdentityStore::default());
        let err = api
            .call(Endpoint::ForceRestart, Params::new())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Identity(_)));
        assert!(api.transport.paths().is_empty());
    }

    #[tokio::test]
    async fn test_non_json_error_body() {
        let api = client(FakeTransport::default().respond_raw(502, "<html>Bad Gateway</html>"));
        match api.call(Endpoint::Hit, Params::new()).await {
            Err(GatewayError::Http { error, .. }) => {
                assert_eq!(error.status, 502);
                assert_eq!(error.message(), remote_blackjack::net::errors::NON_JSON_ERROR_MESSAGE);
            }
            other => panic!("expected HTTP error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_success_is_malformed_action() {
        let api = client(FakeTransport::default().respond_raw(204, ""));
        let err = api.call(Endpoint::Hit, Params::new()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_no_response_is_network_error() {
        let api = client(FakeTransport::default().drop_connection());
        let err = api.call(Endpoint::Hit, Params::new()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Network { .. }));
        assert_eq!(err.class(), ErrorClass::Fatal);
    }

    #[tokio::test]
    async fn test_split_queue_error_is_benign() {
        let api = client(
            FakeTransport::default().respond(400, json!({ "error": "No more split hands." })),
        );
        let err = api
            .call(Endpoint::AddToPlayersListByStand, Params::new())
            .await
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::Benign);
    }

    #[tokio::test]
    async fn test_session_identity_generated_then_overwritten() {
        let api = ApiClient::new(
            FakeTransport::default().respond(200, session_body("server-id")),
            MemoryIdentityStore::default(),
        );
        let init = api.initialize_session().await.unwrap();
        assert_eq!(init.client_id, "server-id");

        let sent = api.transport.body(0)["client_id"].as_str().unwrap().to_string();
        assert!(Uuid::parse_str(&sent).is_ok());
        assert_eq!(api.identity().current().as_deref(), Some("server-id"));
    }
}
