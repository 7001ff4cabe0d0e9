use thiserror::Error;

use crate::{types::ContextId, world::wire::WireKind};

/// Errors raised while reading records or change messages off the wire.
///
/// Every one of these is a protocol violation: the peer produced something
/// this side cannot apply without corrupting its mirror.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// A container record arrived without an identifier
    #[error("{kind} record for property `{property}` is missing its contextId")]
    MissingContextId { kind: WireKind, property: String },

    /// A property change did not name the object it belongs to
    #[error("property-changed record for `{property}` is missing its parentId")]
    MissingParentId { property: String },

    /// The payload does not fit the record's type tag
    #[error("{kind} record for property `{property}` carries an unexpected payload: {detail}")]
    UnexpectedPayload {
        kind: WireKind,
        property: String,
        detail: &'static str,
    },

    /// A timestamp record without a finite millisecond payload
    #[error("timestamp record for property `{property}` must carry a finite number of milliseconds")]
    InvalidTimestamp { property: String },

    /// Mapping entries must alternate key and value records
    #[error("mapping {context_id} has {count} child records, expected key/value pairs")]
    MalformedMapping { context_id: ContextId, count: usize },

    /// A record or message names a container of another type
    #[error("{context_id} is a {found}, expected a {expected}")]
    KindMismatch {
        context_id: ContextId,
        expected: WireKind,
        found: WireKind,
    },

    /// A collection change lacks a field its kind requires
    #[error("{change} change on {context_id} is missing `{field}`")]
    MissingChangeField {
        context_id: ContextId,
        change: &'static str,
        field: &'static str,
    },

    /// The change kind has no meaning for the target container
    #[error("{change} change is not supported on a {kind}")]
    UnsupportedChange { change: &'static str, kind: WireKind },

    /// A sequence batch reaches past the end of the mirrored sequence
    #[error("splice at {index} removing {removed_count} is out of bounds for {context_id} of length {len}")]
    SpliceOutOfBounds {
        context_id: ContextId,
        index: usize,
        removed_count: usize,
        len: usize,
    },
}
