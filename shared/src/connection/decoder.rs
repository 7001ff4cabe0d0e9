use crate::{connection::error::DecoderError, messages::SyncMessage};

/// Parses incoming packets into messages
pub struct Decoder {
    max_payload_bytes: usize,
}

impl Decoder {
    pub fn new(max_payload_bytes: usize) -> Self {
        Self { max_payload_bytes }
    }

    /// Try to decode a payload. Oversize payloads are rejected before
    /// parsing.
    pub fn try_decode(&self, payload: &[u8]) -> Result<SyncMessage, DecoderError> {
        if payload.len() > self.max_payload_bytes {
            return Err(DecoderError::PayloadTooLarge {
                payload_size: payload.len(),
                max_payload_bytes: self.max_payload_bytes,
            });
        }
        serde_json::from_slice(payload).map_err(|error| DecoderError::MalformedPayload {
            payload_size: payload.len(),
            reason: error.to_string(),
        })
    }
}
