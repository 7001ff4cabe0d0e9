pub mod change_record;
pub mod mut_channel;

mod collection_observer;
mod error;
mod property_observer;
mod state;

pub use change_record::{ChangeRecord, Mutation};
pub use collection_observer::CollectionObserver;
pub use error::ObserverError;
pub use mut_channel::{MutChannel, Mutator, SuppressGuard};
pub use property_observer::PropertyObserver;
pub use state::ObserverState;
