mod error;
mod unresolved;

pub use error::ResolveError;
pub use unresolved::{PendingSlot, UnresolvedList, UnresolvedReference};
