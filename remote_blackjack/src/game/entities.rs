//! Game state mirrored from the server.
//!
//! The server is authoritative. These types only hold what it last reported,
//! plus the phase the client is currently in.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::phase::{Phase, deserialize_hint};

/// Token amounts as reported by the server.
pub type Tokens = i64;

/// Cards in a freshly built two-deck shoe.
pub const INITIAL_DECK_LEN: i64 = 104;

/// Outcome labels indexed by the server's `winner` / `hand_state` codes.
pub const OUTCOME_LABELS: [&str; 12] = [
    "",
    "BLACKJACK Player won!",
    "BlackJack push",
    "BlackJack Dealer won!",
    "Push",
    "Player lost",
    "Player won",
    "Dealer won",
    "twenty one",
    "bust",
    "under 21",
    "BlackJack",
];

/// Label for a `winner` or `hand_state` code; unknown codes have no label.
#[must_use]
pub fn outcome_label(code: i64) -> &'static str {
    usize::try_from(code)
        .ok()
        .and_then(|idx| OUTCOME_LABELS.get(idx).copied())
        .unwrap_or("")
}

/// The player's active hand.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct PlayerData {
    pub id: String,
    pub hand: Vec<String>,
    pub sum: i64,
    pub hand_state: i64,
    pub can_split: bool,
    pub stated: bool,
    pub bet: Tokens,
    pub has_hit: i64,
}

impl Default for PlayerData {
    fn default() -> Self {
        Self {
            id: "NONE".to_string(),
            hand: Vec::new(),
            sum: 0,
            hand_state: 0,
            can_split: false,
            stated: false,
            bet: 0,
            has_hit: 0,
        }
    }
}

impl PlayerData {
    /// Two cards totalling 21.
    #[must_use]
    pub fn is_natural_21(&self) -> bool {
        self.hand.len() == 2 && self.sum == 21
    }
}

/// Dealer hand with the hole card hidden.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct DealerMaskedData {
    pub hand: Vec<String>,
    pub sum: i64,
    pub can_insure: bool,
    pub nat_21: i64,
}

impl DealerMaskedData {
    /// The deal produced a natural that is settled without a player turn.
    #[must_use]
    pub fn settles_on_deal(&self) -> bool {
        matches!(self.nat_21, 1 | 2)
    }
}

/// Dealer hand after reveal.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct DealerUnmaskedData {
    pub hand: Vec<String>,
    pub sum: i64,
    pub hand_state: i64,
    pub natural_21: i64,
}

/// The authoritative snapshot the client renders from.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameStateData {
    pub phase: Phase,
    pub player: PlayerData,
    pub dealer_masked: DealerMaskedData,
    pub dealer_unmasked: DealerUnmaskedData,
    pub aces: bool,
    pub natural_21: i64,
    pub winner: i64,
    /// Queued split hands, in server order.
    pub players: Vec<PlayerData>,
    pub split_req: i64,
    pub deck_len: i64,
    pub tokens: Tokens,
    pub bet: Tokens,
    pub bet_list: Vec<Tokens>,
    pub is_round_active: bool,
    pub has_split: bool,
    pub has_rewards: bool,
    pub target_phase: Option<Phase>,
    pub pre_phase: Option<Phase>,
    /// Fields the server sent that the client has no slot for.
    pub extra: Map<String, Value>,
}

impl Default for GameStateData {
    fn default() -> Self {
        Self {
            phase: Phase::Loading,
            player: PlayerData::default(),
            dealer_masked: DealerMaskedData::default(),
            dealer_unmasked: DealerUnmaskedData::default(),
            aces: false,
            natural_21: 0,
            winner: 0,
            players: Vec::new(),
            split_req: 0,
            deck_len: INITIAL_DECK_LEN,
            tokens: 0,
            bet: 0,
            bet_list: Vec::new(),
            is_round_active: false,
            has_split: false,
            has_rewards: false,
            target_phase: None,
            pre_phase: None,
            extra: Map::new(),
        }
    }
}

impl GameStateData {
    /// Overwrites every field present in `patch`.
    ///
    /// Phase hints always take the patch's value, present or not: a hint
    /// belongs to the response that carried it.
    pub fn merge(&mut self, patch: GameStatePatch) {
        let GameStatePatch {
            player,
            dealer_masked,
            dealer_unmasked,
            aces,
            natural_21,
            winner,
            players,
            split_req,
            deck_len,
            tokens,
            bet,
            bet_list,
            is_round_active,
            has_split,
            has_rewards,
            target_phase,
            pre_phase,
            extra,
        } = patch;

        if let Some(player) = player {
            self.player = player;
        }
        if let Some(dealer_masked) = dealer_masked {
            self.dealer_masked = dealer_masked;
        }
        if let Some(dealer_unmasked) = dealer_unmasked {
            self.dealer_unmasked = dealer_unmasked;
        }
        if let Some(aces) = aces {
            self.aces = aces;
        }
        if let Some(natural_21) = natural_21 {
            self.natural_21 = natural_21;
        }
        if let Some(winner) = winner {
            self.winner = winner;
        }
        if let Some(players) = players {
            self.players = players;
        }
        if let Some(split_req) = split_req {
            self.split_req = split_req;
        }
        if let Some(deck_len) = deck_len {
            self.deck_len = deck_len;
        }
        if let Some(tokens) = tokens {
            self.tokens = tokens;
        }
        if let Some(bet) = bet {
            self.bet = bet;
        }
        if let Some(bet_list) = bet_list {
            self.bet_list = bet_list;
        }
        if let Some(is_round_active) = is_round_active {
            self.is_round_active = is_round_active;
        }
        if let Some(has_split) = has_split {
            self.has_split = has_split;
        }
        if let Some(has_rewards) = has_rewards {
            self.has_rewards = has_rewards;
        }
        self.target_phase = target_phase;
        self.pre_phase = pre_phase;
        self.extra.extend(extra);
    }

    /// A fresh round that keeps the balance and the shoe size.
    #[must_use]
    pub fn next_round(&self) -> Self {
        Self {
            phase: self.phase,
            tokens: self.tokens,
            deck_len: self.deck_len,
            bet: 0,
            ..Self::default()
        }
    }

    /// Split hand data is present: queued hands or pending split requests.
    #[must_use]
    pub fn has_split_shape(&self) -> bool {
        !self.players.is_empty() || self.split_req > 0
    }
}

/// Split hands arrive as a list or as an object keyed by hand id.
#[derive(Deserialize)]
#[serde(untagged)]
enum HandsWire {
    List(Vec<PlayerData>),
    Keyed(BTreeMap<String, PlayerData>),
}

fn deserialize_hands<'de, D>(deserializer: D) -> Result<Option<Vec<PlayerData>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<HandsWire> = Option::deserialize(deserializer)?;
    Ok(raw.map(|hands| match hands {
        HandsWire::List(list) => list,
        HandsWire::Keyed(keyed) => keyed
            .into_iter()
            .map(|(id, mut hand)| {
                if hand.id == PlayerData::default().id {
                    hand.id = id;
                }
                hand
            })
            .collect(),
    }))
}

/// Partial game state carried by one server response.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct GameStatePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<PlayerData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dealer_masked: Option<DealerMaskedData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dealer_unmasked: Option<DealerUnmaskedData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aces: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natural_21: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<i64>,
    #[serde(
        default,
        deserialize_with = "deserialize_hands",
        skip_serializing_if = "Option::is_none"
    )]
    pub players: Option<Vec<PlayerData>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_req: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deck_len: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Tokens>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bet: Option<Tokens>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bet_list: Option<Vec<Tokens>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_round_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_split: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_rewards: Option<bool>,
    #[serde(
        default,
        deserialize_with = "deserialize_hint",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_phase: Option<Phase>,
    #[serde(
        default,
        deserialize_with = "deserialize_hint",
        skip_serializing_if = "Option::is_none"
    )]
    pub pre_phase: Option<Phase>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GameStatePatch {
    /// Patch that only sets the balance and deck length.
    #[must_use]
    pub fn balance(tokens: Tokens, deck_len: i64) -> Self {
        Self {
            tokens: Some(tokens),
            deck_len: Some(deck_len),
            ..Self::default()
        }
    }

    /// Split shape as reported by this patch alone.
    #[must_use]
    pub fn has_split_shape(&self) -> bool {
        self.players.as_ref().is_some_and(|p| !p.is_empty()) || self.split_req.unwrap_or(0) > 0
    }
}
