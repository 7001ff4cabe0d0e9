pub mod error;

use error::TransportError;

/// Outgoing half of a message channel. Packets must reach the peer in the
/// order they were sent, and may be lost once the peer is torn down.
pub trait PacketSender {
    /// Sends one packet to the peer
    fn send(&self, payload: &[u8]) -> Result<(), TransportError>;
}

/// Incoming half of a message channel
pub trait PacketReceiver {
    /// Receives the next packet from the peer, if one is waiting
    fn receive(&mut self) -> Result<Option<&[u8]>, TransportError>;
}
