use crate::types::HostType;

/// Behaviour of one [`Synchronizer`](super::Synchronizer)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncConfig {
    /// Which side of the channel this synchronizer runs on. Identifiers it
    /// mints carry this side's prefix.
    pub host_type: HostType,
    /// Return registry consistency errors instead of logging and skipping
    /// the offending message
    pub strict_registry: bool,
    /// Dump every message payload at debug level
    pub log_messages: bool,
}

impl SyncConfig {
    pub fn host() -> Self {
        Self::default()
    }

    pub fn guest() -> Self {
        Self {
            host_type: HostType::Guest,
            ..Self::default()
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            host_type: HostType::Host,
            strict_registry: false,
            log_messages: false,
        }
    }
}
