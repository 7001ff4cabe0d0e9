use thiserror::Error;

/// Errors raised by a [`PacketSender`](super::PacketSender) or
/// [`PacketReceiver`](super::PacketReceiver)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The packet could not be handed to the underlying channel
    #[error("Failed to send packet of {payload_size} bytes")]
    SendFailed { payload_size: usize },

    /// The other end of the channel is gone
    #[error("Transport channel is closed. The peer context may have been torn down")]
    ChannelClosed,
}
