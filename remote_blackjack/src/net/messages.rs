//! Response schemas.
//!
//! Payloads are parsed into these types at the gateway boundary. Anything
//! that does not fit is rejected before it reaches the controller.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::game::{GameStatePatch, Tokens, phase::Phase, phase::deserialize_hint};

/// Request parameters, sent as a JSON object.
pub type Params = Map<String, Value>;

/// `{ "bet": amount }`
#[must_use]
pub fn bet_params(amount: Tokens) -> Params {
    let mut params = Params::new();
    params.insert("bet".to_string(), Value::from(amount));
    params
}

/// Reply to every game action: `{current_tokens, game_state}`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ActionResponse {
    pub current_tokens: Tokens,
    pub game_state: GameStatePatch,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_state_hint: Option<String>,
}

impl ActionResponse {
    /// Flattens the reply into one patch, with `tokens = current_tokens`.
    #[must_use]
    pub fn into_patch(self) -> GameStatePatch {
        GameStatePatch {
            tokens: Some(self.current_tokens),
            ..self.game_state
        }
    }
}

/// Parses a raw reply into a patch. Returns `None` when either key is
/// missing, `current_tokens` is not a number or `game_state` is not an
/// object.
#[must_use]
pub fn extract_game_state_data(response: &Value) -> Option<GameStatePatch> {
    let object = response.as_object()?;
    if !object.get("current_tokens").is_some_and(Value::is_number)
        || !object.get("game_state").is_some_and(Value::is_object)
    {
        return None;
    }
    serde_json::from_value::<ActionResponse>(response.clone())
        .ok()
        .map(ActionResponse::into_patch)
}

/// `game_state` part of the session bootstrap reply.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SessionGameState {
    pub deck_len: i64,
    pub is_round_active: bool,
    #[serde(default, deserialize_with = "deserialize_hint")]
    pub target_phase: Option<Phase>,
}

/// Reply to `initialize_session`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SessionInit {
    pub client_id: String,
    pub tokens: Tokens,
    pub game_state: SessionGameState,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub game_state_hint: Option<String>,
}
