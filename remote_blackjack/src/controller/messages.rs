//! Controller actor message types.

use std::fmt;
use thiserror::Error;
use tokio::sync::oneshot;

use crate::game::{Phase, Tokens};

/// A user intent for the current phase.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    /// Resume an interrupted round
    Continue,
    /// Discard an interrupted round
    StartNew,
    PlaceBet(Tokens),
    RetakeBet,
    /// Close betting and deal
    StartGame,
    Hit,
    Stand,
    Double,
    Insurance,
    Split,
    SplitHit,
    SplitStand,
    SplitDouble,
}

impl Action {
    /// The only phase in which this action is accepted.
    #[must_use]
    pub const fn phase(self) -> Phase {
        match self {
            Action::Continue | Action::StartNew => Phase::RecoveryDecision,
            Action::PlaceBet(_) | Action::RetakeBet | Action::StartGame => Phase::Betting,
            Action::Hit | Action::Stand | Action::Double | Action::Insurance | Action::Split => {
                Phase::MainTurn
            }
            Action::SplitHit | Action::SplitStand | Action::SplitDouble => Phase::SplitTurn,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Continue => f.write_str("continue"),
            Action::StartNew => f.write_str("start new"),
            Action::PlaceBet(amount) => write!(f, "bet {amount}"),
            Action::RetakeBet => f.write_str("retake bet"),
            Action::StartGame => f.write_str("deal"),
            Action::Hit => f.write_str("hit"),
            Action::Stand => f.write_str("stand"),
            Action::Double => f.write_str("double"),
            Action::Insurance => f.write_str("insurance"),
            Action::Split => f.write_str("split"),
            Action::SplitHit => f.write_str("split hit"),
            Action::SplitStand => f.write_str("split stand"),
            Action::SplitDouble => f.write_str("split double"),
        }
    }
}

/// Result of one dispatched action.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The action ran; the controller is now in this phase
    Applied(Phase),

    /// Wrong phase or unmet precondition; nothing was sent
    Ignored,

    /// The server refused the action; the phase is unchanged
    Rejected(String),

    /// The action failed fatally; the controller moved to ERROR
    Failed(String),
}

impl Outcome {
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }
}

/// Result of driving one automatic phase.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Step {
    /// The handler ran and committed a transition
    Advanced(Phase),

    /// The current phase waits for the user
    AwaitingInput,

    /// The handler already ran for this entry and could not move on
    Parked,
}

/// Messages that can be sent to a `ControllerActor`
#[derive(Debug)]
pub enum ControllerMessage {
    Dispatch {
        action: Action,
        response: oneshot::Sender<Outcome>,
    },
}

/// Errors from `ControllerHandle::dispatch`
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum DispatchError {
    #[error("controller is busy")]
    Busy,
    #[error("controller is closed")]
    Closed,
}
