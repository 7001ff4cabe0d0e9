use std::{cell::RefCell, fmt, rc::Rc};

use indexmap::IndexSet;

use crate::world::{
    observer::{
        change_record::ChangeRecord,
        mut_channel::{record_all, MutChannel, Mutator, MutatorSet},
    },
    value::Value,
};

struct SetData {
    members: IndexSet<Value>,
    mutators: MutatorSet,
}

/// Shared handle to an insertion-ordered set of unique values
#[derive(Clone)]
pub struct SetRef {
    inner: Rc<RefCell<SetData>>,
}

impl SetRef {
    pub fn new() -> Self {
        Self::from_values(Vec::new())
    }

    pub fn from_values(values: Vec<Value>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SetData {
                members: values.into_iter().collect(),
                mutators: MutatorSet::default(),
            })),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().members.is_empty()
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.inner.borrow().members.contains(value)
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.inner.borrow().members.iter().cloned().collect()
    }

    /// Returns false if the value was already a member
    pub fn insert(&self, value: impl Into<Value>) -> bool {
        let value = value.into();
        let mutators = {
            let mut data = self.inner.borrow_mut();
            if !data.members.insert(value.clone()) {
                return false;
            }
            data.mutators.snapshot()
        };
        record_all(mutators, ChangeRecord::SetAdd(value));
        true
    }

    /// Removes a member, keeping the relative order of the others
    pub fn remove(&self, value: &Value) -> bool {
        let (removed, mutators) = {
            let mut data = self.inner.borrow_mut();
            match data.members.shift_take(value) {
                Some(removed) => (removed, data.mutators.snapshot()),
                None => return false,
            }
        };
        record_all(mutators, ChangeRecord::SetDelete(removed));
        true
    }

    pub fn clear(&self) -> Vec<Value> {
        let (removed, mutators) = {
            let mut data = self.inner.borrow_mut();
            let removed: Vec<Value> = data.members.drain(..).collect();
            (removed, data.mutators.snapshot())
        };
        if !removed.is_empty() {
            record_all(mutators, ChangeRecord::SetClear(removed.clone()));
        }
        removed
    }

    /// Replaces the placeholder `token` with `value` without moving it: every
    /// member from the placeholder onward is drained and re-added.
    pub(crate) fn swap_placeholder(&self, token: &Value, value: Value) -> bool {
        let tail = {
            let data = self.inner.borrow();
            let Some(index) = data.members.get_index_of(token) else {
                return false;
            };
            data.members
                .iter()
                .skip(index + 1)
                .cloned()
                .collect::<Vec<_>>()
        };

        self.remove(token);
        for member in &tail {
            self.remove(member);
        }
        self.insert(value);
        for member in tail {
            self.insert(member);
        }
        true
    }

    pub(crate) fn attach_mutator(&self, mutator: Mutator) {
        self.inner.borrow_mut().mutators.attach(mutator);
    }

    pub(crate) fn detach_mutator(&self, channel: &MutChannel) {
        self.inner.borrow_mut().mutators.detach(channel);
    }

    pub(crate) fn is_attached(&self, channel: &MutChannel) -> bool {
        self.inner.borrow().mutators.is_attached(channel)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.inner) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &SetRef) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for SetRef {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetRef")
            .field("addr", &format_args!("{:#x}", self.addr()))
            .field("len", &self.len())
            .finish()
    }
}
