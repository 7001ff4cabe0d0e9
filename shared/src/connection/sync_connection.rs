use log::warn;

use crate::{
    connection::{
        connection_config::ConnectionConfig, decoder::Decoder, encoder::Encoder,
        error::ConnectionError,
    },
    messages::SyncMessage,
    transport::{PacketReceiver, PacketSender},
    world::sync::Synchronizer,
};

/// A synchronizer wired to one message channel
pub struct SyncConnection {
    synchronizer: Synchronizer,
    encoder: Encoder,
    decoder: Decoder,
    sender: Box<dyn PacketSender>,
    receiver: Box<dyn PacketReceiver>,
}

impl SyncConnection {
    pub fn new(
        config: &ConnectionConfig,
        sender: Box<dyn PacketSender>,
        receiver: Box<dyn PacketReceiver>,
    ) -> Self {
        Self {
            synchronizer: Synchronizer::new(config.sync.clone()),
            encoder: Encoder::new(config.max_payload_bytes),
            decoder: Decoder::new(config.max_payload_bytes),
            sender,
            receiver,
        }
    }

    pub fn synchronizer(&self) -> &Synchronizer {
        &self.synchronizer
    }

    pub fn synchronizer_mut(&mut self) -> &mut Synchronizer {
        &mut self.synchronizer
    }

    /// Flushes local changes and sends every queued message, one packet per
    /// message. Returns the number of packets sent.
    ///
    /// A message that cannot be encoded or sent does not hold back the ones
    /// after it: every message is attempted and the first error is
    /// returned at the end, so the peer stays in step with this side's
    /// registry as far as possible.
    pub fn send_outgoing_packets(&mut self) -> Result<usize, ConnectionError> {
        let mut first_error: Option<ConnectionError> =
            self.synchronizer.flush().err().map(Into::into);

        let mut sent = 0;
        for message in self.synchronizer.take_outgoing() {
            match self.send_message(&message) {
                Ok(()) => sent += 1,
                Err(error) => {
                    warn!("Failed to send {}: {}", message.name(), error);
                    first_error.get_or_insert(error);
                }
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(sent),
        }
    }

    fn send_message(&mut self, message: &SyncMessage) -> Result<(), ConnectionError> {
        let payload = self.encoder.try_encode(message)?;
        self.sender.send(payload)?;
        Ok(())
    }

    /// Receives and applies every waiting packet. Returns the number of
    /// messages applied.
    ///
    /// Stops at the first packet that cannot be decoded or applied. Packets
    /// after it stay queued in the receiver.
    pub fn receive_incoming_packets(&mut self) -> Result<usize, ConnectionError> {
        let mut applied = 0;
        while let Some(payload) = self.receiver.receive()? {
            let message = match self.decoder.try_decode(payload) {
                Ok(message) => message,
                Err(error) => {
                    warn!("Dropping undecodable packet: {}", error);
                    return Err(error.into());
                }
            };
            self.synchronizer.receive(message)?;
            applied += 1;
        }
        Ok(applied)
    }
}
