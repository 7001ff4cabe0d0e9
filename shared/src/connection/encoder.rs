use crate::{connection::error::EncoderError, messages::SyncMessage};

/// Serializes outgoing messages to JSON
pub struct Encoder {
    result: Vec<u8>,
    max_payload_bytes: usize,
}

impl Encoder {
    pub fn new(max_payload_bytes: usize) -> Self {
        Self {
            result: Vec::new(),
            max_payload_bytes,
        }
    }

    /// Try to encode a message, returning error if it cannot be serialized
    /// or does not fit in one packet
    pub fn try_encode(&mut self, message: &SyncMessage) -> Result<&[u8], EncoderError> {
        self.result.clear();
        serde_json::to_writer(&mut self.result, message).map_err(|error| {
            EncoderError::SerializationFailed {
                message_type: message.name(),
                reason: error.to_string(),
            }
        })?;

        if self.result.len() > self.max_payload_bytes {
            return Err(EncoderError::PayloadTooLarge {
                message_type: message.name(),
                payload_size: self.result.len(),
                max_payload_bytes: self.max_payload_bytes,
            });
        }
        Ok(&self.result)
    }
}
