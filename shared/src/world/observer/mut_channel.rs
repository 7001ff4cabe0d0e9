use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use crate::{
    types::ContextId,
    world::observer::change_record::{ChangeRecord, Mutation},
};

struct MutationLog {
    pending: VecDeque<Mutation>,
    suppressed: usize,
}

// MutChannel
/// Queue of observed mutations owned by one synchronizer.
///
/// Every handle the synchronizer observes carries a [`Mutator`] pointing
/// back into this channel. While a [`SuppressGuard`] is alive nothing is
/// recorded, which is how remote changes are applied without echoing.
#[derive(Clone)]
pub struct MutChannel {
    log: Rc<RefCell<MutationLog>>,
}

impl MutChannel {
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(MutationLog {
                pending: VecDeque::new(),
                suppressed: 0,
            })),
        }
    }

    pub fn new_mutator(&self, target: &ContextId) -> Mutator {
        Mutator {
            channel: self.clone(),
            target: target.clone(),
        }
    }

    pub fn suppress(&self) -> SuppressGuard {
        self.log.borrow_mut().suppressed += 1;
        SuppressGuard {
            log: self.log.clone(),
        }
    }

    pub fn is_suppressed(&self) -> bool {
        self.log.borrow().suppressed > 0
    }

    pub fn has_pending(&self) -> bool {
        !self.log.borrow().pending.is_empty()
    }

    pub fn drain(&self) -> Vec<Mutation> {
        self.log.borrow_mut().pending.drain(..).collect()
    }

    pub fn ptr_eq(&self, other: &MutChannel) -> bool {
        Rc::ptr_eq(&self.log, &other.log)
    }

    fn record(&self, target: &ContextId, record: ChangeRecord) {
        let mut log = self.log.borrow_mut();
        if log.suppressed > 0 {
            return;
        }
        log.pending.push_back(Mutation {
            target: target.clone(),
            record,
        });
    }
}

impl Default for MutChannel {
    fn default() -> Self {
        Self::new()
    }
}

// SuppressGuard
/// Re-enables recording on the channel when dropped
pub struct SuppressGuard {
    log: Rc<RefCell<MutationLog>>,
}

impl Drop for SuppressGuard {
    fn drop(&mut self) {
        let mut log = self.log.borrow_mut();
        log.suppressed = log.suppressed.saturating_sub(1);
    }
}

// Mutator
/// Attached to a live container; forwards its change records to one channel
/// under the container's identifier.
#[derive(Clone)]
pub struct Mutator {
    channel: MutChannel,
    target: ContextId,
}

impl Mutator {
    pub fn target(&self) -> &ContextId {
        &self.target
    }

    pub fn channel(&self) -> &MutChannel {
        &self.channel
    }

    pub fn record(&self, record: ChangeRecord) {
        self.channel.record(&self.target, record);
    }
}

/// The mutators attached to one handle, at most one per channel
#[derive(Clone, Default)]
pub(crate) struct MutatorSet {
    mutators: Vec<Mutator>,
}

impl MutatorSet {
    pub fn attach(&mut self, mutator: Mutator) {
        self.detach(&mutator.channel);
        self.mutators.push(mutator);
    }

    pub fn detach(&mut self, channel: &MutChannel) {
        self.mutators.retain(|mutator| !mutator.channel.ptr_eq(channel));
    }

    pub fn is_attached(&self, channel: &MutChannel) -> bool {
        self.mutators
            .iter()
            .any(|mutator| mutator.channel.ptr_eq(channel))
    }

    /// Cloned so the caller can release the handle borrow before recording
    pub fn snapshot(&self) -> Vec<Mutator> {
        self.mutators.clone()
    }
}

pub(crate) fn record_all(mutators: Vec<Mutator>, record: ChangeRecord) {
    let Some((last, rest)) = mutators.split_last() else {
        return;
    };
    for mutator in rest {
        mutator.record(record.clone());
    }
    last.record(record);
}
