//! Client-side game flow.
//!
//! This module implements:
//! - Controller: the single authority over phase and state
//! - PhaseGraph: the explicit table of legal transitions
//! - ControllerActor: runs the controller in a tokio task behind a handle
//!
//! ## Architecture
//!
//! The actor drives automatic phases until the controller rests in an input
//! phase, then waits for one action at a time. A shared flag on the handle
//! drops actions that arrive while a handler or pacing timer is running.
//!
//! ## Example
//!
//! ```ignore
//! use remote_blackjack::controller::{Controller, ControllerActor, ControllerConfig};
//!
//! let controller = Controller::new(api, ControllerConfig::from_env())?;
//! let (actor, handle) = ControllerActor::new(controller);
//! tokio::spawn(actor.run());
//!
//! handle.dispatch(Action::PlaceBet(50)).await?;
//! ```

pub mod actor;
pub mod config;
pub mod graph;
pub mod machine;
pub mod messages;

pub use actor::{ControllerActor, ControllerHandle};
pub use config::{ConfigError, ControllerConfig, PhaseDelays, parse_env_or};
pub use graph::{GraphError, PhaseGraph};
pub use machine::{Controller, ControllerError, GameView, RewardSnapshot};
pub use messages::{Action, DispatchError, Outcome, Step};
