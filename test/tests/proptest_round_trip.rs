/// PROPERTY-BASED TESTS: mirroring invariants
///
/// Uses proptest to verify, over random inputs, that:
/// 1. Any acyclic graph round-trips to a deep-equal mirror
/// 2. Registries on both sides hold the same identifiers and edges
/// 3. Random sequence edits converge
use proptest::prelude::*;
use tandem_shared::{MappingRef, ObjectRef, SequenceRef, SetRef, Timestamp, Value};
use tandem_test::{assert_mirrored, exchange_packets, TestPeers};

/// Plain description of a graph, turned into live values by `build`
#[derive(Clone, Debug)]
enum Node {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Time(i64),
    Sequence(Vec<Node>),
    Set(Vec<Node>),
    Mapping(Vec<(String, Node)>),
    Object(Vec<(String, Node)>),
}

fn build(node: &Node) -> Value {
    match node {
        Node::Null => Value::Null,
        Node::Bool(inner) => Value::from(*inner),
        Node::Number(inner) => Value::from(*inner),
        Node::Text(inner) => Value::from(inner.as_str()),
        Node::Time(millis) => Value::from(Timestamp::from_millis(*millis)),
        Node::Sequence(items) => Value::from(SequenceRef::from_values(items.iter().map(build).collect())),
        Node::Set(items) => Value::from(SetRef::from_values(items.iter().map(build).collect())),
        Node::Mapping(entries) => Value::from(MappingRef::from_entries(
            entries
                .iter()
                .map(|(key, value)| (Value::from(key.as_str()), build(value)))
                .collect(),
        )),
        Node::Object(fields) => Value::from(ObjectRef::from_fields(
            fields.iter().map(|(name, value)| (name.clone(), build(value))),
        )),
    }
}

fn leaf_strategy() -> impl Strategy<Value = Node> {
    prop_oneof![
        Just(Node::Null),
        any::<bool>().prop_map(Node::Bool),
        (-1.0e9f64..1.0e9).prop_map(Node::Number),
        "[a-z ]{0,8}".prop_map(Node::Text),
        (0i64..4_000_000_000_000).prop_map(Node::Time),
    ]
}

fn node_strategy() -> impl Strategy<Value = Node> {
    leaf_strategy().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Node::Sequence),
            prop::collection::vec(inner.clone(), 0..6).prop_map(Node::Set),
            prop::collection::vec(("[a-z]{1,4}", inner.clone()), 0..6).prop_map(Node::Mapping),
            prop::collection::vec(("[a-z]{1,6}", inner), 0..6).prop_map(Node::Object),
        ]
    })
}

fn root_strategy() -> impl Strategy<Value = Node> {
    prop::collection::vec(("[a-z]{1,6}", node_strategy()), 0..6).prop_map(Node::Object)
}

#[derive(Clone, Debug)]
enum Edit {
    Push(i32),
    Insert(usize, i32),
    Remove(usize),
    Replace(usize, bool),
    Nest(usize),
    Clear,
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        4 => any::<i32>().prop_map(Edit::Push),
        3 => (any::<usize>(), any::<i32>()).prop_map(|(at, value)| Edit::Insert(at, value)),
        3 => any::<usize>().prop_map(Edit::Remove),
        2 => (any::<usize>(), any::<bool>()).prop_map(|(at, value)| Edit::Replace(at, value)),
        1 => any::<usize>().prop_map(Edit::Nest),
        1 => Just(Edit::Clear),
    ]
}

fn apply_edit(list: &SequenceRef, edit: &Edit) {
    let len = list.len();
    match edit {
        Edit::Push(value) => list.push(*value),
        Edit::Insert(at, value) => list.insert(at % (len + 1), *value),
        Edit::Remove(at) if len > 0 => {
            list.remove(at % len);
        }
        Edit::Replace(at, value) if len > 0 => {
            list.set(at % len, *value);
        }
        Edit::Nest(at) => list.insert(at % (len + 1), SequenceRef::new()),
        Edit::Clear => {
            list.clear();
        }
        _ => {}
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Snapshot of any acyclic graph yields a deep-equal mirror
    #[test]
    fn prop_snapshot_round_trip(root in root_strategy()) {
        let mut peers = TestPeers::new();
        let original = build(&root);

        let observed = original.as_object().cloned().unwrap();
        peers.host().observe_root("root", observed).unwrap();
        exchange_packets(&mut peers).unwrap();

        let mirror = peers.guest().root("root").unwrap();
        prop_assert!(mirror.deep_eq(&original));
        assert_mirrored(peers.host.synchronizer(), peers.guest.synchronizer());
    }

    /// A graph attached after the snapshot arrives as a property change and
    /// leaves nothing behind once detached again
    #[test]
    fn prop_attach_then_detach(child in node_strategy()) {
        let mut peers = TestPeers::new();
        let root = ObjectRef::new();
        peers.host().observe_root("root", root.clone()).unwrap();
        exchange_packets(&mut peers).unwrap();

        root.set("child", build(&child));
        exchange_packets(&mut peers).unwrap();
        let mirror = peers.guest().root("root").unwrap();
        prop_assert!(mirror.deep_eq(&Value::from(root.clone())));

        root.set("child", Value::Null);
        exchange_packets(&mut peers).unwrap();
        prop_assert_eq!(peers.host().registry().len(), 1);
        prop_assert_eq!(peers.guest().registry().len(), 1);
    }

    /// Any script of sequence edits, sent in one or several flushes, converges
    #[test]
    fn prop_sequence_edits_converge(
        edits in prop::collection::vec(edit_strategy(), 0..24),
        flush_every in 1usize..8,
    ) {
        let mut peers = TestPeers::new();
        let list = SequenceRef::new();
        peers.host().observe_root("list", list.clone()).unwrap();
        exchange_packets(&mut peers).unwrap();

        for (step, edit) in edits.iter().enumerate() {
            apply_edit(&list, edit);
            if step % flush_every == 0 {
                exchange_packets(&mut peers).unwrap();
            }
        }
        exchange_packets(&mut peers).unwrap();

        let mirror = peers.guest().root("list").unwrap();
        prop_assert!(mirror.deep_eq(&Value::from(list)));
        assert_mirrored(peers.host.synchronizer(), peers.guest.synchronizer());
    }
}
