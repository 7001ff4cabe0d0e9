use std::{cell::RefCell, fmt, rc::Rc};

use crate::world::{
    observer::{
        change_record::ChangeRecord,
        mut_channel::{record_all, MutChannel, Mutator, MutatorSet},
    },
    value::Value,
};

struct SequenceData {
    items: Vec<Value>,
    mutators: MutatorSet,
}

/// Shared handle to an ordered sequence.
///
/// Every structural change is expressed as a splice so observers see one
/// record shape.
#[derive(Clone)]
pub struct SequenceRef {
    inner: Rc<RefCell<SequenceData>>,
}

impl SequenceRef {
    pub fn new() -> Self {
        Self::from_values(Vec::new())
    }

    pub fn from_values(items: Vec<Value>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SequenceData {
                items,
                mutators: MutatorSet::default(),
            })),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.inner.borrow().items.get(index).cloned()
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.inner.borrow().items.clone()
    }

    pub fn position(&self, value: &Value) -> Option<usize> {
        self.inner.borrow().items.iter().position(|item| item == value)
    }

    pub fn push(&self, value: impl Into<Value>) {
        let len = self.len();
        self.splice(len, 0, vec![value.into()]);
    }

    /// Inserts at `index`, clamped to the current length
    pub fn insert(&self, index: usize, value: impl Into<Value>) {
        self.splice(index, 0, vec![value.into()]);
    }

    pub fn remove(&self, index: usize) -> Option<Value> {
        if index >= self.len() {
            return None;
        }
        self.splice(index, 1, Vec::new()).pop()
    }

    pub fn pop(&self) -> Option<Value> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        self.splice(len - 1, 1, Vec::new()).pop()
    }

    /// Replaces the element at `index`, returning the previous one.
    /// Out of range indices leave the sequence untouched.
    pub fn set(&self, index: usize, value: impl Into<Value>) -> Option<Value> {
        let value = value.into();
        let current = self.get(index)?;
        if current == value {
            return Some(current);
        }
        self.splice(index, 1, vec![value]).pop()
    }

    pub fn clear(&self) -> Vec<Value> {
        let len = self.len();
        self.splice(0, len, Vec::new())
    }

    /// Removes `remove_count` elements at `index` and inserts `added` in
    /// their place. `index` and `remove_count` are clamped to the sequence.
    pub fn splice(&self, index: usize, remove_count: usize, added: Vec<Value>) -> Vec<Value> {
        let (removed, index, mutators) = {
            let mut data = self.inner.borrow_mut();
            let len = data.items.len();
            let index = index.min(len);
            let end = index + remove_count.min(len - index);
            let removed: Vec<Value> = data.items.splice(index..end, added.iter().cloned()).collect();
            (removed, index, data.mutators.snapshot())
        };

        if !removed.is_empty() || !added.is_empty() {
            record_all(
                mutators,
                ChangeRecord::Splice {
                    index,
                    removed: removed.clone(),
                    added,
                },
            );
        }

        removed
    }

    /// Puts `value` where the placeholder `token` sits, returning its index
    pub(crate) fn swap_placeholder(&self, token: &Value, value: Value) -> Option<usize> {
        let index = self.position(token)?;
        self.set(index, value);
        Some(index)
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

    pub fn ptr_eq(&self, other: &SequenceRef) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for SequenceRef {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SequenceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceRef")
            .field("addr", &format_args!("{:#x}", self.addr()))
            .field("len", &self.len())
            .finish()
    }
}
