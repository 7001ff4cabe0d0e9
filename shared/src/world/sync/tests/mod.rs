#![cfg(test)]


use crate::{
    messages::SyncMessage,
    world::{
        sync::{SyncConfig, Synchronizer},
        value::Value,
    },
};

fn host() -> Synchronizer {
    Synchronizer::new(SyncConfig {
        strict_registry: true,
        ..SyncConfig::host()
    })
}

fn guest() -> Synchronizer {
    Synchronizer::new(SyncConfig {
        strict_registry: true,
        ..SyncConfig::guest()
    })
}

/// Flushes `from` and delivers its messages to `to` through JSON
fn pump(from: &mut Synchronizer, to: &mut Synchronizer) -> Vec<SyncMessage> {
    from.flush().unwrap();
    let messages = from.take_outgoing();
    for message in &messages {
        let encoded = serde_json::to_string(message).unwrap();
        to.receive(serde_json::from_str(&encoded).unwrap()).unwrap();
    }
    messages
}

/// Host and guest registries hold the same identifiers with the same edges
fn assert_mirrored(host: &Synchronizer, guest: &Synchronizer) {
    let mut host_ids: Vec<_> = host.registry().ids().cloned().collect();
    let mut guest_ids: Vec<_> = guest.registry().ids().cloned().collect();
    host_ids.sort();
    guest_ids.sort();
    assert_eq!(host_ids, guest_ids);
    assert_eq!(host.registry().edges(), guest.registry().edges());
    assert_eq!(host.root_names(), guest.root_names());

    for name in host.root_names() {
        let (Some(host_root), Some(guest_root)) = (host.root(&name), guest.root(&name)) else {
            panic!("root `{}` missing on one side", name);
        };
        assert!(host_root.deep_eq(&guest_root), "root `{}` diverged", name);
    }
}

fn mirror_of(guest: &Synchronizer, host: &Synchronizer, value: &Value) -> Value {
    let id = host.id_of(value).unwrap();
    guest.registry().get_context_by_id(&id).cloned().unwrap()
}
