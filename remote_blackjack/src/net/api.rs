//! The gateway contract the controller is written against.

use async_trait::async_trait;

use super::{
    endpoint::Endpoint,
    errors::GatewayResult,
    messages::{ActionResponse, Params, SessionInit},
};

/// Outbound access to the game server.
///
/// Implementations own session identity, idempotency keys and the single
/// retry on session expiry. Callers only see already-classified errors.
#[async_trait]
pub trait GameApi: Send + Sync {
    /// Bootstraps (or resumes) the server session for this client.
    async fn initialize_session(&self) -> GatewayResult<SessionInit>;

    /// Performs one game action.
    async fn call(&self, endpoint: Endpoint, params: Params) -> GatewayResult<ActionResponse>;
}

#[async_trait]
impl<T: GameApi + ?Sized> GameApi for std::sync::Arc<T> {
    async fn initialize_session(&self) -> GatewayResult<SessionInit> {
        (**self).initialize_session().await
    }

    async fn call(&self, endpoint: Endpoint, params: Params) -> GatewayResult<ActionResponse> {
        (**self).call(endpoint, params).await
    }
}
