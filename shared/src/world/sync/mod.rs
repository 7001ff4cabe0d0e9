//! # Graph Synchronizer – Overview
//!
//! **Mission Statement**
//! Keep a set of named object graphs on one peer (the *host*) mirrored on
//! another (the *guest*), including shared references, cycles and
//! collections, by exchanging incremental change messages over any
//! reliable, ordered transport.
//!
//! ## Architectural sketch
//! 1. **Observation**
//!    [`Synchronizer::observe_root`] walks a root, registers every container
//!    it meets in the [`IdentityRegistry`](crate::IdentityRegistry) and
//!    attaches a mutator bound to the synchronizer's channel. From then on
//!    every effective mutation is recorded as a `ChangeRecord`.
//! 2. **Publication**
//!    [`Synchronizer::flush`] drains recorded changes. Each property change,
//!    and each run of consecutive changes to one collection, becomes one
//!    [`SyncMessage`](crate::SyncMessage). Containers reached for the first
//!    time travel as full records. Containers the peer already knows travel
//!    as references (a record with a `contextId` and no value).
//! 3. **Application**
//!    [`Synchronizer::receive`] validates a message against the mirror, then
//!    applies it with local recording suppressed. References to containers
//!    defined later in the same message get a placeholder, swapped for the
//!    real container once the whole message has been materialized.
//!
//! ## Lifetime of a container
//! * Every parent/child relation is an edge in the registry, labelled with
//!   the role(s) the child plays: property, index, member, key or value.
//! * When an edge loses its last role the child becomes a teardown
//!   candidate. At the end of each pass the candidates that are no longer
//!   reachable from a root (cycles included) are unregistered on both sides.
//!
//! ## Reading map
//! | Module | Role |
//! |--------|------|
//! | [`synchronizer.rs`]     | public surface, flushing and receiving |
//! | [`observe.rs`]          | walking values, arming observers |
//! | [`property_sync.rs`]    | property changes in both directions |
//! | [`collection_sync.rs`]  | sequence, set and mapping changes |
//! | [`resolve.rs`]          | materializing records, forward references |
//! | [`validate.rs`]         | checks run before a message is applied |
//! | [`unobserve.rs`]        | reachability teardown |

mod collection_sync;
mod error;
mod observe;
mod pass;
mod property_sync;
mod resolve;
mod sync_config;
mod synchronizer;
mod unobserve;
mod validate;

pub use error::SyncError;
pub use sync_config::SyncConfig;
pub use synchronizer::Synchronizer;

#[cfg(test)]
mod tests;
