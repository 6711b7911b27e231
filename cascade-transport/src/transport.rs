use async_trait::async_trait;
use cascade_core::{OperationDescriptor, TransportError, TransportResponse};
use std::time::Duration;

/// Factory for per-round sessions.
///
/// An executor opens exactly one session per round and drops it when the
/// round ends, whichever way it ends.
#[async_trait]
pub trait Transport: Send + Sync {
    type Session: TransportSession;

    async fn open(&self) -> Result<Self::Session, TransportError>;
}

/// Shared connection context for one round.
///
/// Sessions are used through `&self` by every dispatch of the round at once
/// and must not change their configuration while in use.
#[async_trait]
pub trait TransportSession: Send + Sync {
    async fn request(
        &self,
        operation: &OperationDescriptor,
    ) -> Result<TransportResponse, TransportError>;

    /// Budget applied to each request independently
    fn timeout(&self) -> Option<Duration>;
}

#[async_trait]
impl<T: Transport> Transport for std::sync::Arc<T> {
    type Session = T::Session;

    async fn open(&self) -> Result<Self::Session, TransportError> {
        (**self).open().await
    }
}
