//! # Remote Blackjack
//!
//! Client-side game flow for a server-authoritative blackjack game.
//!
//! The server owns the cards, the balance and the rules. This library mirrors
//! what the server reports and drives the client through an explicit phase
//! graph: it decides which call to make next, when to pause for the player to
//! follow a reveal, and how to recover from failures.
//!
//! ## Architecture
//!
//! The round is a sequence of 19 phases. Four of them wait for the user:
//!
//! - **RecoveryDecision**: continue or discard an interrupted round
//! - **Betting**: place, retake and confirm bets
//! - **MainTurn**: hit, stand, double, insure or split
//! - **SplitTurn**: play the active split hand
//!
//! All others run automatically, usually one server call followed by a
//! pacing delay.
//!
//! ## Core Modules
//!
//! - [`game`]: Phases and the mirrored game state
//! - [`net`]: Gateway contract, endpoints, response schemas, errors
//! - [`controller`]: Phase graph, controller and its actor
//!
//! ## Example
//!
//! ```
//! use remote_blackjack::{Phase, PhaseGraph};
//!
//! let graph = PhaseGraph::standard();
//! assert!(graph.validate().is_ok());
//! assert!(graph.allows(Phase::MainStand, Phase::Betting));
//! ```

/// Client-side game flow: phase graph, controller and actor.
pub mod controller;
pub use controller::{
    Action, Controller, ControllerActor, ControllerConfig, ControllerHandle, GameView, Outcome,
    PhaseDelays, PhaseGraph,
};

/// Phases and game state mirrored from the server.
pub mod game;
pub use game::{GameStateData, GameStatePatch, Phase, PhaseKind, Tokens};

/// Gateway contract and wire types.
pub mod net;
pub use net::{
    api::GameApi,
    endpoint::Endpoint,
    errors::{ApiError, ErrorClass, GatewayError, GatewayResult},
    messages::{self, ActionResponse, Params, SessionInit, extract_game_state_data},
};
