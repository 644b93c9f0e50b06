//! Client-side game phases.
//!
//! Exactly one phase is active at a time. A phase either waits for user
//! input or runs an automatic handler on entry.

use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Wire name the server uses for "no hint".
const NO_PHASE: &str = "NONE";

/// Error for a phase name the client does not know.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("unknown phase name '{0}'")]
pub struct UnknownPhase(pub String);

/// How a phase makes progress.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PhaseKind {
    /// Waits for a user action.
    Input,
    /// Runs its handler once on entry, then transitions on its own.
    Automatic,
}

/// A named state of the client-side game flow.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Loading,
    RecoveryDecision,
    Shuffling,
    Betting,
    InitGame,
    MainTurn,
    MainStand,
    MainStandRewardsTransit,
    SplitTurn,
    SplitStand,
    SplitStandDouble,
    #[serde(rename = "SPLIT_NAT21_TRANSIT")]
    SplitNat21Transit,
    SplitAceTransit,
    SplitFinish,
    SplitFinishOutcome,
    OutOfTokens,
    RestartGame,
    Error,
    Reloading,
}

impl Phase {
    /// Every phase, in flow order.
    pub const ALL: [Phase; 19] = [
        Phase::Loading,
        Phase::RecoveryDecision,
        Phase::Shuffling,
        Phase::Betting,
        Phase::InitGame,
        Phase::MainTurn,
        Phase::MainStand,
        Phase::MainStandRewardsTransit,
        Phase::SplitTurn,
        Phase::SplitStand,
        Phase::SplitStandDouble,
        Phase::SplitNat21Transit,
        Phase::SplitAceTransit,
        Phase::SplitFinish,
        Phase::SplitFinishOutcome,
        Phase::OutOfTokens,
        Phase::RestartGame,
        Phase::Error,
        Phase::Reloading,
    ];

    #[must_use]
    pub const fn kind(self) -> PhaseKind {
        match self {
            Phase::RecoveryDecision | Phase::Betting | Phase::MainTurn | Phase::SplitTurn => {
                PhaseKind::Input
            }
            _ => PhaseKind::Automatic,
        }
    }

    #[must_use]
    pub const fn is_automatic(self) -> bool {
        matches!(self.kind(), PhaseKind::Automatic)
    }

    /// Server wire name, e.g. `MAIN_TURN`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::Loading => "LOADING",
            Phase::RecoveryDecision => "RECOVERY_DECISION",
            Phase::Shuffling => "SHUFFLING",
            Phase::Betting => "BETTING",
            Phase::InitGame => "INIT_GAME",
            Phase::MainTurn => "MAIN_TURN",
            Phase::MainStand => "MAIN_STAND",
            Phase::MainStandRewardsTransit => "MAIN_STAND_REWARDS_TRANSIT",
            Phase::SplitTurn => "SPLIT_TURN",
            Phase::SplitStand => "SPLIT_STAND",
            Phase::SplitStandDouble => "SPLIT_STAND_DOUBLE",
            Phase::SplitNat21Transit => "SPLIT_NAT21_TRANSIT",
            Phase::SplitAceTransit => "SPLIT_ACE_TRANSIT",
            Phase::SplitFinish => "SPLIT_FINISH",
            Phase::SplitFinishOutcome => "SPLIT_FINISH_OUTCOME",
            Phase::OutOfTokens => "OUT_OF_TOKENS",
            Phase::RestartGame => "RESTART_GAME",
            Phase::Error => "ERROR",
            Phase::Reloading => "RELOADING",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = UnknownPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|phase| phase.as_str() == s)
            .ok_or_else(|| UnknownPhase(s.to_string()))
    }
}

/// Parses an optional phase hint where `"NONE"`, `null` and a missing key all
/// mean "no hint". Unknown names are errors.
pub fn deserialize_hint<'de, D>(deserializer: D) -> Result<Option<Phase>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some(NO_PHASE) | Some("") => Ok(None),
        Some(name) => name.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Hinted {
        #[serde(default, deserialize_with = "deserialize_hint")]
        target_phase: Option<Phase>,
    }

    #[test]
    fn wire_names_match_serde() {
        for phase in Phase::ALL {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{}\"", phase.as_str()));
            assert_eq!(phase.as_str().parse::<Phase>().unwrap(), phase);
        }
    }

    #[test]
    fn input_phases() {
        let inputs: Vec<Phase> = Phase::ALL
            .into_iter()
            .filter(|p| !p.is_automatic())
            .collect();
        assert_eq!(
            inputs,
            vec![
                Phase::RecoveryDecision,
                Phase::Betting,
                Phase::MainTurn,
                Phase::SplitTurn
            ]
        );
    }

    #[test]
    fn none_hint_is_absent() {
        let hinted: Hinted = serde_json::from_str(r#"{"target_phase":"NONE"}"#).unwrap();
        assert_eq!(hinted.target_phase, None);
        let hinted: Hinted = serde_json::from_str("{}").unwrap();
        assert_eq!(hinted.target_phase, None);
        let hinted: Hinted = serde_json::from_str(r#"{"target_phase":null}"#).unwrap();
        assert_eq!(hinted.target_phase, None);
    }

    #[test]
    fn unknown_hint_fails_loudly() {
        let err = serde_json::from_str::<Hinted>(r#"{"target_phase":"LOBBY"}"#).unwrap_err();
        assert!(err.to_string().contains("LOBBY"));
    }
}
