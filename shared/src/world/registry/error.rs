use thiserror::Error;

use crate::{types::ContextId, world::wire::WireKind};

/// Registry consistency errors.
///
/// These usually mean the peer already tore something down (stale or
/// doubled identifiers), so callers log them and skip the operation unless
/// configured to be strict.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Only containers have identity
    #[error("Cannot register a {kind} value - only containers are tracked by identity")]
    NotTrackable { kind: WireKind },

    /// No binding record exists for the identifier
    #[error("No binding record for {context_id}")]
    MissingBinding { context_id: ContextId },

    /// The identifier or the value is already registered under something else
    #[error("Identifier conflict on {context_id}: {detail}")]
    IdentifierConflict {
        context_id: ContextId,
        detail: &'static str,
    },

    /// Attempted to retract an edge that was never recorded
    #[error("No {role} edge from {parent} to {child}")]
    EdgeNotFound {
        parent: ContextId,
        child: ContextId,
        role: String,
    },

    /// The edge already exists with a role of another container type
    #[error("Edge from {parent} to {child} cannot take a {role} role")]
    RoleMismatch {
        parent: ContextId,
        child: ContextId,
        role: String,
    },
}
