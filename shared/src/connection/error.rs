use thiserror::Error;

use crate::{transport::error::TransportError, world::sync::SyncError};

/// Errors that can occur while encoding an outgoing message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncoderError {
    /// The message could not be serialized
    #[error("Failed to serialize {message_type} message: {reason}")]
    SerializationFailed {
        message_type: &'static str,
        reason: String,
    },

    /// The encoded message exceeds the configured payload limit
    #[error("Encoded {message_type} message is {payload_size} bytes, exceeding the limit of {max_payload_bytes}")]
    PayloadTooLarge {
        message_type: &'static str,
        payload_size: usize,
        max_payload_bytes: usize,
    },
}

/// Errors that can occur while decoding an incoming packet
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecoderError {
    /// Payload is not a well formed message (SECURITY: potentially malicious payload)
    #[error("Failed to decode payload of {payload_size} bytes (possible malformed or malicious data): {reason}")]
    MalformedPayload { payload_size: usize, reason: String },

    /// Payload exceeds the configured limit and was not parsed
    #[error("Payload of {payload_size} bytes exceeds the limit of {max_payload_bytes}")]
    PayloadTooLarge {
        payload_size: usize,
        max_payload_bytes: usize,
    },
}

/// General connection-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// Synchronizer error
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// Encoder error
    #[error("Encoder error: {0}")]
    Encoder(#[from] EncoderError),

    /// Decoder error
    #[error("Decoder error: {0}")]
    Decoder(#[from] DecoderError),

    /// Transport error
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}
