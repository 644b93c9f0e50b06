//! Scripted gateway shared by the controller tests.

#![allow(dead_code)]

use async_trait::async_trait;
use remote_blackjack::{
    ActionResponse, ApiError, Controller, ControllerConfig, Endpoint, GameApi, GatewayError,
    GatewayResult, Params, Phase, SessionInit,
    controller::Step,
    messages::SessionGameState,
    net::errors::ErrorBody,
};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Gateway answering from per-endpoint queues and recording every call.
#[derive(Default)]
pub struct ScriptedApi {
    sessions: Mutex<VecDeque<GatewayResult<SessionInit>>>,
    replies: Mutex<HashMap<Endpoint, VecDeque<GatewayResult<ActionResponse>>>>,
    calls: Mutex<Vec<(Endpoint, Params)>>,
}

impl ScriptedApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn session(&self, tokens: i64, deck_len: i64, is_round_active: bool) -> &Self {
        self.sessions.lock().unwrap().push_back(Ok(SessionInit {
            client_id: "c0ffee".to_string(),
            tokens,
            game_state: SessionGameState {
                deck_len,
                is_round_active,
                target_phase: None,
            },
            message: None,
            game_state_hint: None,
        }));
        self
    }

    pub fn session_error(&self, err: GatewayError) -> &Self {
        self.sessions.lock().unwrap().push_back(Err(err));
        self
    }

    /// Queues a `{current_tokens, game_state}` reply.
    pub fn reply(&self, endpoint: Endpoint, body: Value) -> &Self {
        let response: ActionResponse = serde_json::from_value(body).unwrap();
        self.push(endpoint, Ok(response))
    }

    /// Queues an HTTP error with a JSON body.
    pub fn fail(&self, endpoint: Endpoint, status: u16, body: Value) -> &Self {
        let data: ErrorBody = serde_json::from_value(body).unwrap();
        self.push(
            endpoint,
            Err(GatewayError::Http {
                endpoint,
                error: ApiError::new(status, "", data),
            }),
        )
    }

    fn push(&self, endpoint: Endpoint, result: GatewayResult<ActionResponse>) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .entry(endpoint)
            .or_default()
            .push_back(result);
        self
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.calls.lock().unwrap().iter().map(|(e, _)| *e).collect()
    }

    pub fn params(&self, endpoint: Endpoint) -> Vec<Params> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(e, _)| *e == endpoint)
            .map(|(_, p)| p.clone())
            .collect()
    }

    pub fn count(&self, endpoint: Endpoint) -> usize {
        self.endpoints().iter().filter(|e| **e == endpoint).count()
    }
}

#[async_trait]
impl GameApi for ScriptedApi {
    async fn initialize_session(&self) -> GatewayResult<SessionInit> {
        self.sessions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(GatewayError::Malformed {
                    endpoint: Endpoint::InitializeSession,
                    reason: "unscripted".to_string(),
                })
            })
    }

    async fn call(&self, endpoint: Endpoint, params: Params) -> GatewayResult<ActionResponse> {
        self.calls.lock().unwrap().push((endpoint, params));
        self.replies
            .lock()
            .unwrap()
            .get_mut(&endpoint)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(GatewayError::Malformed {
                    endpoint,
                    reason: "unscripted".to_string(),
                })
            })
    }
}

pub fn controller(api: &Arc<ScriptedApi>) -> Controller<Arc<ScriptedApi>> {
    Controller::new(api.clone(), ControllerConfig::immediate()).unwrap()
}

/// Drives automatic phases until the controller waits or parks.
pub async fn settle<A: GameApi>(controller: &mut Controller<A>) -> Vec<Phase> {
    let mut visited = Vec::new();
    while let Step::Advanced(phase) = controller.drive().await {
        visited.push(phase);
    }
    visited
}
