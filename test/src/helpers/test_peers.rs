use tandem_shared::{ConnectionConfig, SyncConfig, SyncConnection, Synchronizer};

use crate::local_socket::{LocalLink, LocalSocketPair};

/// A host and a guest connection joined by an in-memory channel
pub struct TestPeers {
    pub host: SyncConnection,
    pub guest: SyncConnection,
    pub link: LocalLink,
}

impl TestPeers {
    /// Peers that return registry inconsistencies instead of skipping them
    pub fn new() -> Self {
        Self::with_configs(strict(ConnectionConfig::host()), strict(ConnectionConfig::guest()))
    }

    pub fn with_configs(host_config: ConnectionConfig, guest_config: ConnectionConfig) -> Self {
        let socket = LocalSocketPair::new();
        let link = socket.link();
        let LocalSocketPair {
            host_sender,
            host_receiver,
            guest_sender,
            guest_receiver,
            ..
        } = socket;

        Self {
            host: SyncConnection::new(&host_config, host_sender, host_receiver),
            guest: SyncConnection::new(&guest_config, guest_sender, guest_receiver),
            link,
        }
    }

    pub fn host(&mut self) -> &mut Synchronizer {
        self.host.synchronizer_mut()
    }

    pub fn guest(&mut self) -> &mut Synchronizer {
        self.guest.synchronizer_mut()
    }
}

impl Default for TestPeers {
    fn default() -> Self {
        Self::new()
    }
}

fn strict(config: ConnectionConfig) -> ConnectionConfig {
    ConnectionConfig {
        sync: SyncConfig {
            strict_registry: true,
            ..config.sync
        },
        ..config
    }
}
