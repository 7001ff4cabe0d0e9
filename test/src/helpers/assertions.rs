use tandem_shared::{Synchronizer, Value};

/// Asserts that two synchronizers hold the same identifiers, edges and
/// roots, and that every root has deep-equal contents on both sides
pub fn assert_mirrored(a: &Synchronizer, b: &Synchronizer) {
    let mut a_ids: Vec<_> = a.registry().ids().cloned().collect();
    let mut b_ids: Vec<_> = b.registry().ids().cloned().collect();
    a_ids.sort();
    b_ids.sort();
    assert_eq!(a_ids, b_ids, "registries hold different identifiers");
    assert_eq!(
        a.registry().edges(),
        b.registry().edges(),
        "reference edges diverged"
    );
    assert_eq!(a.root_names(), b.root_names(), "root names diverged");

    for name in a.root_names() {
        match (a.root(&name), b.root(&name)) {
            (Some(a_root), Some(b_root)) => {
                assert!(a_root.deep_eq(&b_root), "root `{}` diverged", name)
            }
            _ => panic!("root `{}` is missing on one side", name),
        }
    }
}

/// The value `other` holds under the identifier `side` assigned to `value`
pub fn mirror_of(side: &Synchronizer, other: &Synchronizer, value: &Value) -> Value {
    let id = side
        .id_of(value)
        .unwrap_or_else(|| panic!("value is not registered"));
    other
        .registry()
        .get_context_by_id(&id)
        .cloned()
        .unwrap_or_else(|| panic!("{} has no mirror", id))
}
