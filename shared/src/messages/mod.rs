mod sync_message;

pub use sync_message::{
    ChangeKind, CollectionChange, CollectionChanged, SpliceBatch, SyncMessage,
};
