//! Sets and mappings keep insertion order on both sides, including after
//! deletes addressed by identifier

use tandem_shared::{MappingRef, ObjectRef, SequenceRef, SetRef, Value};
use tandem_test::{assert_mirrored, exchange_packets, mirror_of, TestPeers};

#[test]
fn set_order_survives_delete_by_identifier() {
    let mut peers = TestPeers::new();
    let set = SetRef::new();
    peers.host().observe_root("set", set.clone()).unwrap();
    exchange_packets(&mut peers).unwrap();

    let first = ObjectRef::from_fields([("n", 1)]);
    let second = ObjectRef::from_fields([("n", 2)]);
    let third = ObjectRef::from_fields([("n", 3)]);
    set.insert(first.clone());
    set.insert(second.clone());
    set.insert(third.clone());
    exchange_packets(&mut peers).unwrap();

    set.remove(&Value::from(second));
    let fourth = ObjectRef::from_fields([("n", 4)]);
    set.insert(fourth.clone());
    exchange_packets(&mut peers).unwrap();

    let mirror = peers.guest().root("set").unwrap();
    let numbers: Vec<Value> = mirror
        .as_set()
        .unwrap()
        .to_vec()
        .iter()
        .map(|member| member.as_object().unwrap().get("n"))
        .collect();
    assert_eq!(numbers, vec![Value::from(1), Value::from(3), Value::from(4)]);
    assert_mirrored(peers.host.synchronizer(), peers.guest.synchronizer());
}

#[test]
fn mapping_order_survives_delete_by_identifier() {
    let mut peers = TestPeers::new();
    let mapping = MappingRef::new();
    peers.host().observe_root("map", mapping.clone()).unwrap();
    exchange_packets(&mut peers).unwrap();

    let keys: Vec<SequenceRef> = (0..4).map(|_| SequenceRef::new()).collect();
    for (index, key) in keys.iter().take(3).enumerate() {
        mapping.insert(key.clone(), index as i32);
    }
    exchange_packets(&mut peers).unwrap();

    mapping.remove(&Value::from(keys[1].clone()));
    mapping.insert(keys[3].clone(), 3);
    exchange_packets(&mut peers).unwrap();

    let mirror = peers.guest().root("map").unwrap();
    let values: Vec<Value> = mirror
        .as_mapping()
        .unwrap()
        .entries()
        .into_iter()
        .map(|(_, value)| value)
        .collect();
    assert_eq!(values, vec![Value::from(0), Value::from(2), Value::from(3)]);
    assert_mirrored(peers.host.synchronizer(), peers.guest.synchronizer());
}

#[test]
fn update_keeps_entry_position() {
    let mut peers = TestPeers::new();
    let mapping = MappingRef::from_entries(vec![
        (Value::from("a"), Value::from(1)),
        (Value::from("b"), Value::from(2)),
    ]);
    peers.host().observe_root("map", mapping.clone()).unwrap();
    exchange_packets(&mut peers).unwrap();

    mapping.insert("a", ObjectRef::new());
    exchange_packets(&mut peers).unwrap();

    let mirror = peers.guest().root("map").unwrap();
    assert_eq!(
        mirror.as_mapping().unwrap().keys(),
        vec![Value::from("a"), Value::from("b")]
    );
    assert_mirrored(peers.host.synchronizer(), peers.guest.synchronizer());
}

#[test]
fn sequence_edits_apply_in_order() {
    let mut peers = TestPeers::new();
    let list = SequenceRef::from_values((0..5i32).map(Value::from).collect());
    peers.host().observe_root("list", list.clone()).unwrap();
    exchange_packets(&mut peers).unwrap();

    list.remove(0);
    list.insert(2, "x");
    list.splice(1, 2, vec![Value::from("y"), Value::from("z"), Value::from(SetRef::new())]);
    list.pop();
    list.push(9);
    exchange_packets(&mut peers).unwrap();

    let mirror = peers.guest().root("list").unwrap();
    assert!(mirror.deep_eq(&Value::from(list)));
    assert_mirrored(peers.host.synchronizer(), peers.guest.synchronizer());
}

#[test]
fn guest_and_host_edit_different_collections() {
    let mut peers = TestPeers::new();
    let left = SequenceRef::new();
    let right = SetRef::new();
    let root = ObjectRef::from_fields([
        ("left", Value::from(left.clone())),
        ("right", Value::from(right.clone())),
    ]);
    peers.host().observe_root("root", root).unwrap();
    exchange_packets(&mut peers).unwrap();

    let guest_right = mirror_of(
        peers.host.synchronizer(),
        peers.guest.synchronizer(),
        &Value::from(right.clone()),
    );
    left.push("from host");
    guest_right.as_set().unwrap().insert("from guest");
    exchange_packets(&mut peers).unwrap();

    assert!(right.contains(&Value::from("from guest")));
    assert_mirrored(peers.host.synchronizer(), peers.guest.synchronizer());
}
