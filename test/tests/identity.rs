//! Cycles and shared references keep their identity across the channel

use tandem_shared::{Decoder, ObjectRef, SequenceRef, SyncMessage, Value};
use tandem_test::{assert_mirrored, exchange_packets, TestPeers};

#[test]
fn self_reference_mirrors() {
    let mut peers = TestPeers::new();
    let a = ObjectRef::new();
    a.set("self", a.clone());

    peers.host().observe_root("a", a).unwrap();
    exchange_packets(&mut peers).unwrap();

    let mirror = peers.guest().root("a").unwrap();
    let mirror_object = mirror.as_object().unwrap();
    assert_eq!(mirror_object.get("self"), mirror);
    assert_mirrored(peers.host.synchronizer(), peers.guest.synchronizer());
}

#[test]
fn two_object_cycle_mirrors() {
    let mut peers = TestPeers::new();
    let a = ObjectRef::new();
    let b = ObjectRef::new();
    a.set("next", b.clone());
    b.set("prev", a.clone());

    peers.host().observe_root("a", a).unwrap();
    exchange_packets(&mut peers).unwrap();

    let guest_a = peers.guest().root("a").unwrap();
    let guest_b = guest_a.as_object().unwrap().get("next");
    assert_eq!(guest_b.as_object().unwrap().get("prev"), guest_a);
    assert_mirrored(peers.host.synchronizer(), peers.guest.synchronizer());
}

#[test]
fn cycle_through_collections_mirrors() {
    let mut peers = TestPeers::new();
    let list = SequenceRef::new();
    let holder = ObjectRef::from_fields([("list", Value::from(list.clone()))]);
    list.push(holder.clone());
    list.push(list.clone());

    peers.host().observe_root("holder", holder).unwrap();
    exchange_packets(&mut peers).unwrap();

    let guest_holder = peers.guest().root("holder").unwrap();
    let guest_list = guest_holder.as_object().unwrap().get("list");
    let items = guest_list.as_sequence().unwrap().to_vec();
    assert_eq!(items, vec![guest_holder.clone(), guest_list.clone()]);
    assert_mirrored(peers.host.synchronizer(), peers.guest.synchronizer());
}

#[test]
fn shared_child_is_encoded_once() {
    let mut peers = TestPeers::new();
    let child = ObjectRef::from_fields([("name", "x")]);
    let root = ObjectRef::from_fields([
        ("left", Value::from(child.clone())),
        ("right", Value::from(child)),
    ]);

    peers.host().observe_root("root", root).unwrap();
    peers.host.send_outgoing_packets().unwrap();
    let packets = peers.link.take_to_guest();
    assert_eq!(packets.len(), 1);

    let message = Decoder::new(usize::MAX).try_decode(&packets[0]).unwrap();
    let SyncMessage::RootSnapshot { record, .. } = &message else {
        panic!("expected a root snapshot, got {}", message.name());
    };
    let full = record.child_metadata.iter().filter(|child| !child.is_stub()).count();
    let stubs = record.child_metadata.iter().filter(|child| child.is_stub()).count();
    assert_eq!((full, stubs), (1, 1));

    peers.link.inject_to_guest(&packets[0]);
    exchange_packets(&mut peers).unwrap();
    let mirror = peers.guest().root("root").unwrap();
    let mirror = mirror.as_object().unwrap();
    let left = mirror.get("left");
    assert!(left.as_object().unwrap().ptr_eq(mirror.get("right").as_object().unwrap()));
}
