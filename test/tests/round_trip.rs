//! End-to-end round trips over an in-memory channel: a host observes a
//! graph, the guest rebuilds it, and later edits on either side converge.

use tandem_shared::{MappingRef, ObjectRef, SequenceRef, SetRef, Timestamp, Value};
use tandem_test::{assert_mirrored, exchange_packets, mirror_of, TestPeers};

fn init_logger() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

fn sample_graph() -> ObjectRef {
    let settings = MappingRef::from_entries(vec![
        (Value::from("theme"), Value::from("dark")),
        (Value::from(3), Value::from(true)),
        (Value::from("window"), Value::from(ObjectRef::from_fields([("w", 640), ("h", 480)]))),
    ]);
    let tags = SetRef::from_values(vec![Value::from("b"), Value::from("a"), Value::from(1.5)]);
    let rows = SequenceRef::from_values(vec![
        Value::from(SequenceRef::from_values(vec![Value::from(1), Value::Null])),
        Value::from(ObjectRef::from_fields([("label", "second")])),
        Value::from(Timestamp::from_millis(1_600_000_000_123)),
    ]);

    ObjectRef::from_fields([
        ("title", Value::from("document")),
        ("count", Value::from(42)),
        ("ratio", Value::from(-0.25)),
        ("draft", Value::from(false)),
        ("nothing", Value::Null),
        ("edited", Value::from(Timestamp::from_millis(0))),
        ("settings", Value::from(settings)),
        ("tags", Value::from(tags)),
        ("rows", Value::from(rows)),
    ])
}

#[test]
fn snapshot_round_trip_preserves_structure_and_order() {
    init_logger();
    let mut peers = TestPeers::new();
    let root = sample_graph();

    peers.host().observe_root("doc", root.clone()).unwrap();
    let delivered = exchange_packets(&mut peers).unwrap();

    assert_eq!(delivered, 1);
    let mirror = peers.guest().root("doc").unwrap();
    assert!(mirror.deep_eq(&Value::from(root)));

    let tags = mirror.as_object().unwrap().get("tags");
    assert_eq!(
        tags.as_set().unwrap().to_vec(),
        vec![Value::from("b"), Value::from("a"), Value::from(1.5)]
    );
    assert_mirrored(peers.host.synchronizer(), peers.guest.synchronizer());
}

#[test]
fn edits_on_both_sides_converge() {
    init_logger();
    let mut peers = TestPeers::new();
    let root = sample_graph();
    peers.host().observe_root("doc", root.clone()).unwrap();
    exchange_packets(&mut peers).unwrap();

    root.set("title", "renamed");
    let rows = root.get("rows");
    rows.as_sequence().unwrap().push(ObjectRef::from_fields([("label", "third")]));
    exchange_packets(&mut peers).unwrap();

    let guest_settings = mirror_of(
        peers.host.synchronizer(),
        peers.guest.synchronizer(),
        &root.get("settings"),
    );
    guest_settings.as_mapping().unwrap().insert("font", 12);
    guest_settings.as_mapping().unwrap().remove(&Value::from(3));
    exchange_packets(&mut peers).unwrap();

    let settings = root.get("settings");
    let keys = settings.as_mapping().unwrap().keys();
    assert_eq!(
        keys,
        vec![Value::from("theme"), Value::from("window"), Value::from("font")]
    );
    assert_mirrored(peers.host.synchronizer(), peers.guest.synchronizer());
}

#[test]
fn guest_root_reaches_host() {
    init_logger();
    let mut peers = TestPeers::new();
    let inbox = SequenceRef::from_values(vec![Value::from("hello")]);

    let id = peers.guest().observe_root("inbox", inbox.clone()).unwrap();
    exchange_packets(&mut peers).unwrap();

    assert!(id.as_str().starts_with("g-"));
    let mirror = peers.host().root("inbox").unwrap();
    assert_eq!(mirror.as_sequence().unwrap().to_vec(), vec![Value::from("hello")]);

    mirror.as_sequence().unwrap().push("reply");
    exchange_packets(&mut peers).unwrap();
    assert_eq!(inbox.len(), 2);
    assert_mirrored(peers.host.synchronizer(), peers.guest.synchronizer());
}

#[test]
fn non_finite_numbers_travel_as_null() {
    init_logger();
    let mut peers = TestPeers::new();
    let root = ObjectRef::from_fields([("x", f64::NAN)]);

    peers.host().observe_root("r", root).unwrap();
    exchange_packets(&mut peers).unwrap();

    let mirror = peers.guest().root("r").unwrap();
    assert_eq!(mirror.as_object().unwrap().get("x"), Value::Null);
}

#[test]
fn numbers_survive_bit_for_bit() {
    init_logger();
    let mut peers = TestPeers::new();
    let sent = -198497110.45504814_f64;
    let root = ObjectRef::from_fields([("n", sent)]);

    peers.host().observe_root("r", root).unwrap();
    exchange_packets(&mut peers).unwrap();

    let mirror = peers.guest().root("r").unwrap();
    let got = mirror.as_object().unwrap().get("n").as_f64().unwrap();
    assert_eq!(got.to_bits(), sent.to_bits(), "sent {} got {}", sent, got);
}
