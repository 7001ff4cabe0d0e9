use crate::world::sync::SyncConfig;

/// Contains Config properties which will be used by a Connection
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Settings handed to the connection's synchronizer
    pub sync: SyncConfig,
    /// Largest packet the connection will send or accept, in bytes
    pub max_payload_bytes: usize,
}

impl ConnectionConfig {
    pub fn host() -> Self {
        Self::default()
    }

    pub fn guest() -> Self {
        Self {
            sync: SyncConfig::guest(),
            ..Self::default()
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            sync: SyncConfig::default(),
            max_payload_bytes: 1 << 20,
        }
    }
}
