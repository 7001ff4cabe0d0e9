mod binding;
mod child_reference;
mod error;
mod identity_registry;
mod reference_tracker;

pub use binding::BindingRecord;
pub use child_reference::{ChildReference, EdgeRole, Slot};
pub use error::RegistryError;
pub use identity_registry::{IdentityRegistry, Resolved};
