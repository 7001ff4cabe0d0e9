//! # Tandem Shared
//! Mirrors object graphs between a host and a guest context that share no
//! memory, over an ordered message channel.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod connection;
mod messages;
mod transport;
mod types;
mod world;

pub use connection::{
    connection_config::ConnectionConfig,
    decoder::Decoder,
    encoder::Encoder,
    error::{ConnectionError, DecoderError, EncoderError},
    sync_connection::SyncConnection,
};
pub use messages::{ChangeKind, CollectionChange, CollectionChanged, SpliceBatch, SyncMessage};
pub use transport::{error::TransportError, PacketReceiver, PacketSender};
pub use types::{ContextId, HostType};
pub use world::{
    observer::{
        ChangeRecord, CollectionObserver, MutChannel, Mutation, Mutator, ObserverError,
        ObserverState, PropertyObserver, SuppressGuard,
    },
    registry::{
        BindingRecord, ChildReference, EdgeRole, IdentityRegistry, RegistryError, Resolved, Slot,
    },
    remote::{PendingSlot, ResolveError, UnresolvedList, UnresolvedReference},
    sync::{SyncConfig, SyncError, Synchronizer},
    value::{
        ChangeHook, FieldMode, MappingRef, ObjectRef, ObjectSchema, SequenceRef, SetRef,
        TimeError, Timestamp, Value,
    },
    wire::{Scalar, WireError, WireKind, WireRecord, WireValue},
};
