//! Internal modules for the blackjack client.
//!
//! This library provides the HTTP gateway, identity storage, configuration,
//! command parsing and text rendering used by the rb_client binary.

pub mod api_client;
pub mod commands;
pub mod config;
pub mod identity;
pub mod render;
