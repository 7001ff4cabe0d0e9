use thiserror::Error;

use crate::types::ContextId;

/// Errors raised by property and collection observers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObserverError {
    /// Attempted an invalid state transition
    #[error("{from_state} observer should never {operation}. (Cannot transition {from_state} -> {to_state})")]
    InvalidStateTransition {
        from_state: &'static str,
        to_state: &'static str,
        operation: &'static str,
    },

    /// A property observer was requested for an object the registry does not hold
    #[error("Cannot observe `{field}` on {owner} - owning object is not registered")]
    OwnerNotRegistered { owner: ContextId, field: String },
}
