/// In-memory channel implementation for E2E testing
/// Routes packets between a host and a guest connection without any I/O
use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::Rc,
};

use tandem_shared::{PacketReceiver, PacketSender, TransportError};

type Queue = Rc<RefCell<VecDeque<Vec<u8>>>>;

/// Pair of connected host and guest channel halves for E2E testing
pub struct LocalSocketPair {
    pub host_sender: Box<dyn PacketSender>,
    pub host_receiver: Box<dyn PacketReceiver>,
    pub guest_sender: Box<dyn PacketSender>,
    pub guest_receiver: Box<dyn PacketReceiver>,
    link: LocalLink,
}

impl LocalSocketPair {
    pub fn new() -> Self {
        let host_to_guest: Queue = Rc::new(RefCell::new(VecDeque::new()));
        let guest_to_host: Queue = Rc::new(RefCell::new(VecDeque::new()));
        let closed = Rc::new(Cell::new(false));

        Self {
            host_sender: Box::new(LocalSender {
                queue: host_to_guest.clone(),
                closed: closed.clone(),
            }),
            host_receiver: Box::new(LocalReceiver {
                queue: guest_to_host.clone(),
                closed: closed.clone(),
                last_payload: None,
            }),
            guest_sender: Box::new(LocalSender {
                queue: guest_to_host.clone(),
                closed: closed.clone(),
            }),
            guest_receiver: Box::new(LocalReceiver {
                queue: host_to_guest.clone(),
                closed: closed.clone(),
                last_payload: None,
            }),
            link: LocalLink {
                host_to_guest,
                guest_to_host,
                closed,
            },
        }
    }

    /// Handle that stays usable after the channel halves are moved out
    pub fn link(&self) -> LocalLink {
        self.link.clone()
    }
}

impl Default for LocalSocketPair {
    fn default() -> Self {
        Self::new()
    }
}

/// Test-side view of the queues: inject, drop or inspect packets in flight
#[derive(Clone)]
pub struct LocalLink {
    host_to_guest: Queue,
    guest_to_host: Queue,
    closed: Rc<Cell<bool>>,
}

impl LocalLink {
    pub fn packets_to_guest(&self) -> usize {
        self.host_to_guest.borrow().len()
    }

    pub fn packets_to_host(&self) -> usize {
        self.guest_to_host.borrow().len()
    }

    /// Queues a raw packet for the guest, bypassing the host's encoder
    pub fn inject_to_guest(&self, payload: &[u8]) {
        self.host_to_guest.borrow_mut().push_back(payload.to_vec());
    }

    /// Removes and returns every packet waiting for the guest
    pub fn take_to_guest(&self) -> Vec<Vec<u8>> {
        self.host_to_guest.borrow_mut().drain(..).collect()
    }

    /// Tears the channel down. Sends fail and queued packets are lost.
    pub fn close(&self) {
        self.closed.set(true);
        self.host_to_guest.borrow_mut().clear();
        self.guest_to_host.borrow_mut().clear();
    }
}

struct LocalSender {
    queue: Queue,
    closed: Rc<Cell<bool>>,
}

impl PacketSender for LocalSender {
    fn send(&self, payload: &[u8]) -> Result<(), TransportError> {
        if self.closed.get() {
            return Err(TransportError::ChannelClosed);
        }
        self.queue.borrow_mut().push_back(payload.to_vec());
        Ok(())
    }
}

struct LocalReceiver {
    queue: Queue,
    closed: Rc<Cell<bool>>,
    last_payload: Option<Box<[u8]>>,
}

impl PacketReceiver for LocalReceiver {
    fn receive(&mut self) -> Result<Option<&[u8]>, TransportError> {
        if self.closed.get() {
            return Err(TransportError::ChannelClosed);
        }
        let next = self.queue.borrow_mut().pop_front();
        match next {
            Some(packet) => {
                self.last_payload = Some(packet.into_boxed_slice());
                Ok(self.last_payload.as_deref())
            }
            None => Ok(None),
        }
    }
}
