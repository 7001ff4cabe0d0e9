use thiserror::Error;

use crate::types::ContextId;

/// Errors raised while resolving references in an incoming message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A reference names an identifier that neither this side nor the message knows
    #[error("Reference from {owner} to {ref_id} could not be resolved after the fix-up pass")]
    UnresolvedReference { owner: ContextId, ref_id: ContextId },
}
