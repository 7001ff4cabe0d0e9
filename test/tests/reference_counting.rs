//! Tracked values live exactly as long as something synchronized refers to
//! them

use tandem_shared::{
    Decoder, MappingRef, ObjectRef, Scalar, SequenceRef, SetRef, SyncMessage, Value, WireKind,
    WireValue,
};
use tandem_test::{assert_mirrored, exchange_packets, TestPeers};

fn sent_messages(peers: &mut TestPeers) -> Vec<SyncMessage> {
    peers.host.send_outgoing_packets().unwrap();
    let packets = peers.link.take_to_guest();
    let decoder = Decoder::new(usize::MAX);
    let messages = packets
        .iter()
        .map(|packet| decoder.try_decode(packet).unwrap())
        .collect();
    for packet in &packets {
        peers.link.inject_to_guest(packet);
    }
    exchange_packets(peers).unwrap();
    messages
}

#[test]
fn child_assignment_scenario() {
    let mut peers = TestPeers::new();
    let root = ObjectRef::from_fields([("title", "A")]);
    let root_id = peers.host().observe_root("root", root.clone()).unwrap();
    exchange_packets(&mut peers).unwrap();

    // a new child travels as a full record with a fresh identifier
    let child = ObjectRef::from_fields([("name", "x")]);
    root.set("child", child.clone());
    let messages = sent_messages(&mut peers);
    assert_eq!(messages.len(), 1);
    let SyncMessage::PropertyChanged(record) = &messages[0] else {
        panic!("expected a property change");
    };
    assert_eq!(record.kind, WireKind::StructuredObject);
    assert_eq!(record.parent_id.as_ref(), Some(&root_id));
    let child_id = record.context_id.clone().unwrap();
    assert_ne!(child_id, root_id);
    let name = record.children().iter().find(|field| field.property == "name").unwrap();
    assert_eq!(
        name.value,
        Some(WireValue::Scalar(Scalar::Text("x".to_string())))
    );

    // the same child again is only a reference
    root.set("child2", child.clone());
    let messages = sent_messages(&mut peers);
    let SyncMessage::PropertyChanged(record) = &messages[0] else {
        panic!("expected a property change");
    };
    assert_eq!(record.context_id.as_ref(), Some(&child_id));
    assert!(record.value.is_none());

    // child2 still holds it
    root.set("child", Value::Null);
    exchange_packets(&mut peers).unwrap();
    assert!(peers.host().registry().contains(&child_id));
    assert!(peers.guest().registry().contains(&child_id));
    assert!(peers.host().is_observed(&Value::from(child.clone())));

    root.set("child2", Value::Null);
    exchange_packets(&mut peers).unwrap();
    assert!(!peers.host().registry().contains(&child_id));
    assert!(!peers.guest().registry().contains(&child_id));
    assert!(!peers.host().is_observed(&Value::from(child)));
    assert_mirrored(peers.host.synchronizer(), peers.guest.synchronizer());
}

#[test]
fn value_shared_by_two_collections_survives_one_removal() {
    let mut peers = TestPeers::new();
    let shared = ObjectRef::from_fields([("n", 1)]);
    let list = SequenceRef::from_values(vec![Value::from(shared.clone())]);
    let set = SetRef::from_values(vec![Value::from(shared.clone())]);
    let root = ObjectRef::from_fields([
        ("list", Value::from(list.clone())),
        ("set", Value::from(set.clone())),
    ]);
    peers.host().observe_root("root", root).unwrap();
    exchange_packets(&mut peers).unwrap();
    let shared_value = Value::from(shared);

    list.clear();
    exchange_packets(&mut peers).unwrap();
    assert!(peers.host().is_observed(&shared_value));
    assert_mirrored(peers.host.synchronizer(), peers.guest.synchronizer());

    set.remove(&shared_value);
    exchange_packets(&mut peers).unwrap();
    assert!(!peers.host().is_observed(&shared_value));
    assert_mirrored(peers.host.synchronizer(), peers.guest.synchronizer());
}

#[test]
fn mapping_key_and_value_roles_are_counted_separately() {
    let mut peers = TestPeers::new();
    let both = SetRef::new();
    let mapping = MappingRef::new();
    mapping.insert(both.clone(), both.clone());
    mapping.insert("other", both.clone());
    peers.host().observe_root("map", mapping.clone()).unwrap();
    exchange_packets(&mut peers).unwrap();
    let both_value = Value::from(both);

    mapping.insert("other", 0);
    exchange_packets(&mut peers).unwrap();
    assert!(peers.host().is_observed(&both_value));

    mapping.insert(both_value.clone(), 1);
    exchange_packets(&mut peers).unwrap();
    assert!(peers.host().is_observed(&both_value));
    assert_mirrored(peers.host.synchronizer(), peers.guest.synchronizer());

    mapping.remove(&both_value);
    exchange_packets(&mut peers).unwrap();
    assert!(!peers.host().is_observed(&both_value));
    assert_mirrored(peers.host.synchronizer(), peers.guest.synchronizer());
}

#[test]
fn unreachable_cycle_is_freed() {
    let mut peers = TestPeers::new();
    let a = ObjectRef::new();
    let b = ObjectRef::new();
    a.set("next", b.clone());
    b.set("next", a.clone());
    let root = ObjectRef::from_fields([("ring", Value::from(a.clone()))]);
    peers.host().observe_root("root", root.clone()).unwrap();
    exchange_packets(&mut peers).unwrap();
    assert_eq!(peers.guest().registry().len(), 3);

    root.set("ring", Value::Null);
    exchange_packets(&mut peers).unwrap();

    assert_eq!(peers.host().registry().len(), 1);
    assert_eq!(peers.guest().registry().len(), 1);
    assert!(!peers.host().is_observed(&Value::from(b)));
}

#[test]
fn releasing_a_root_keeps_values_another_root_reaches() {
    let mut peers = TestPeers::new();
    let shared = SequenceRef::new();
    let first = ObjectRef::from_fields([("s", Value::from(shared.clone()))]);
    let second = ObjectRef::from_fields([("s", Value::from(shared.clone()))]);
    peers.host().observe_root("first", first).unwrap();
    peers.host().observe_root("second", second).unwrap();
    exchange_packets(&mut peers).unwrap();

    peers.host().release_root("first").unwrap();
    exchange_packets(&mut peers).unwrap();
    assert_eq!(peers.guest().root_names(), vec!["second".to_string()]);
    let mirror = peers.guest().root("second").unwrap();
    let mirror_shared = mirror.as_object().unwrap().get("s");
    assert!(peers.guest().is_observed(&mirror_shared));
    assert_mirrored(peers.host.synchronizer(), peers.guest.synchronizer());

    peers.host().release_root("second").unwrap();
    exchange_packets(&mut peers).unwrap();
    assert!(peers.guest().registry().is_empty());
    assert!(!peers.host().is_observed(&Value::from(shared)));
}
