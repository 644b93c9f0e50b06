//! Game data model: phases and the server-mirrored state.
//!
//! Nothing in here knows blackjack rules. Sums, outcomes and payouts are
//! whatever the server last reported.

pub mod entities;
pub mod phase;

pub use entities::{
    DealerMaskedData, DealerUnmaskedData, GameStateData, GameStatePatch, INITIAL_DECK_LEN,
    PlayerData, Tokens, outcome_label,
};
pub use phase::{Phase, PhaseKind, UnknownPhase};
