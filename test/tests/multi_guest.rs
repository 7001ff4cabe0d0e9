//! One host object synchronized with two guests through two independent
//! connections. Each connection has its own registry and identifiers.

use tandem_shared::{ConnectionConfig, ObjectRef, SequenceRef, SyncConnection, Value};
use tandem_test::LocalSocketPair;

struct Link {
    host: SyncConnection,
    guest: SyncConnection,
}

impl Link {
    fn new() -> Self {
        let socket = LocalSocketPair::new();
        let LocalSocketPair {
            host_sender,
            host_receiver,
            guest_sender,
            guest_receiver,
            ..
        } = socket;
        Self {
            host: SyncConnection::new(&ConnectionConfig::host(), host_sender, host_receiver),
            guest: SyncConnection::new(&ConnectionConfig::guest(), guest_sender, guest_receiver),
        }
    }

    fn exchange(&mut self) {
        self.host.send_outgoing_packets().unwrap();
        self.guest.receive_incoming_packets().unwrap();
        self.guest.send_outgoing_packets().unwrap();
        self.host.receive_incoming_packets().unwrap();
    }

    fn guest_root(&self, name: &str) -> Value {
        self.guest.synchronizer().root(name).unwrap()
    }
}

fn exchange_all(links: &mut [Link]) {
    for _ in 0..3 {
        for link in links.iter_mut() {
            link.exchange();
        }
    }
}

#[test]
fn guest_edit_is_relayed_to_the_other_guest() {
    let root = ObjectRef::from_fields([("title", "shared")]);
    let mut links = [Link::new(), Link::new()];
    for link in links.iter_mut() {
        link.host
            .synchronizer_mut()
            .observe_root("doc", root.clone())
            .unwrap();
    }
    exchange_all(&mut links);

    let first_mirror = links[0].guest_root("doc");
    first_mirror.as_object().unwrap().set("title", "edited by first");
    first_mirror
        .as_object()
        .unwrap()
        .set("items", SequenceRef::from_values(vec![Value::from(1)]));
    exchange_all(&mut links);

    assert_eq!(root.get("title"), Value::from("edited by first"));
    let second_mirror = links[1].guest_root("doc");
    assert!(second_mirror.deep_eq(&Value::from(root.clone())));

    // nested edits on the relayed container travel as well
    let items = second_mirror.as_object().unwrap().get("items");
    items.as_sequence().unwrap().push(2);
    exchange_all(&mut links);

    assert!(first_mirror.deep_eq(&Value::from(root.clone())));
    assert_eq!(
        root.get("items").as_sequence().unwrap().to_vec(),
        vec![Value::from(1), Value::from(2)]
    );
}

#[test]
fn connections_do_not_share_identifiers() {
    let root = ObjectRef::from_fields([("child", Value::from(ObjectRef::new()))]);
    let mut links = [Link::new(), Link::new()];
    for link in links.iter_mut() {
        link.host
            .synchronizer_mut()
            .observe_root("doc", root.clone())
            .unwrap();
    }
    exchange_all(&mut links);

    let child = root.get("child");
    let first = links[0].host.synchronizer().id_of(&child).unwrap();
    let second = links[1].host.synchronizer().id_of(&child).unwrap();
    assert_ne!(first, second);

    links[0].host.synchronizer_mut().release_root("doc").unwrap();
    exchange_all(&mut links);

    assert!(links[0].guest.synchronizer().registry().is_empty());
    assert_eq!(links[1].guest.synchronizer().registry().len(), 2);
    assert!(links[1].host.synchronizer().is_observed(&child));
}
