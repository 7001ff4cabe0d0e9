use thiserror::Error;

use crate::world::{
    observer::ObserverError, registry::RegistryError, remote::ResolveError, wire::WireError,
};

/// Errors surfaced by a [`Synchronizer`](super::Synchronizer)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("Malformed wire data: {0}")]
    Wire(#[from] WireError),

    #[error("Registry inconsistency: {0}")]
    Registry(#[from] RegistryError),

    #[error("Observer error: {0}")]
    Observer(#[from] ObserverError),

    #[error("Reference resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    /// A root name can only be observed once at a time
    #[error("Root `{name}` is already observed")]
    RootAlreadyObserved { name: String },

    /// No root is observed under the name
    #[error("No root named `{name}` is observed")]
    RootNotFound { name: String },
}

impl SyncError {
    /// Protocol violations mean the peer sent something malformed or
    /// out of order. Everything else is a consistency problem that usually
    /// comes from the peer having torn something down already.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            SyncError::Wire(_) | SyncError::Observer(_) | SyncError::Resolve(_)
        )
    }
}
