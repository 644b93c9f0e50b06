//! Gateway contract between the controller and the game server.
//!
//! The HTTP implementation lives in the client crate. This module defines
//! what a call looks like, what comes back, and how failures are classified.

/// The `GameApi` trait implemented by gateways.
pub mod api;

/// Server endpoints.
pub mod endpoint;

/// Error types and their classification.
pub mod errors;

/// Response schemas and request parameters.
pub mod messages;
