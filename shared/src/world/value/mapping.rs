use std::{cell::RefCell, fmt, rc::Rc};

use indexmap::IndexMap;

use crate::world::{
    observer::{
        change_record::ChangeRecord,
        mut_channel::{record_all, MutChannel, Mutator, MutatorSet},
    },
    value::Value,
};

struct MappingData {
    entries: IndexMap<Value, Value>,
    mutators: MutatorSet,
}

/// Shared handle to an insertion-ordered key/value mapping. Keys may be any
/// value, including other containers (compared by identity).
#[derive(Clone)]
pub struct MappingRef {
    inner: Rc<RefCell<MappingData>>,
}

impl MappingRef {
    pub fn new() -> Self {
        Self::from_entries(Vec::new())
    }

    pub fn from_entries(entries: Vec<(Value, Value)>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(MappingData {
                entries: entries.into_iter().collect(),
                mutators: MutatorSet::default(),
            })),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    pub fn get(&self, key: &Value) -> Option<Value> {
        self.inner.borrow().entries.get(key).cloned()
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.inner.borrow().entries.contains_key(key)
    }

    pub fn keys(&self) -> Vec<Value> {
        self.inner.borrow().entries.keys().cloned().collect()
    }

    pub fn entries(&self) -> Vec<(Value, Value)> {
        self.inner
            .borrow()
            .entries
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Inserts or updates an entry, returning the previous value. Updating
    /// keeps the entry's position.
    pub fn insert(&self, key: impl Into<Value>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        let (old, mutators) = {
            let mut data = self.inner.borrow_mut();
            if data.entries.get(&key) == Some(&value) {
                return Some(value);
            }
            let old = data.entries.insert(key.clone(), value.clone());
            (old, data.mutators.snapshot())
        };

        let record = match &old {
            Some(old) => ChangeRecord::MapUpdate {
                key,
                old: old.clone(),
                new: value,
            },
            None => ChangeRecord::MapAdd { key, value },
        };
        record_all(mutators, record);
        old
    }

    /// Removes an entry, keeping the relative order of the others
    pub fn remove(&self, key: &Value) -> Option<Value> {
        let (key, old, mutators) = {
            let mut data = self.inner.borrow_mut();
            let (_, key, old) = data.entries.shift_remove_full(key)?;
            (key, old, data.mutators.snapshot())
        };
        record_all(
            mutators,
            ChangeRecord::MapDelete {
                key,
                old: old.clone(),
            },
        );
        Some(old)
    }

    pub fn clear(&self) -> Vec<(Value, Value)> {
        let (removed, mutators) = {
            let mut data = self.inner.borrow_mut();
            let removed: Vec<(Value, Value)> = data.entries.drain(..).collect();
            (removed, data.mutators.snapshot())
        };
        if !removed.is_empty() {
            record_all(mutators, ChangeRecord::MapClear(removed.clone()));
        }
        removed
    }

    /// Replaces the placeholder key `token` with `key`, keeping the entry in
    /// place by draining and re-adding every entry from it onward
    pub(crate) fn swap_placeholder_key(&self, token: &Value, key: Value) -> bool {
        let tail = {
            let data = self.inner.borrow();
            let Some(index) = data.entries.get_index_of(token) else {
                return false;
            };
            data.entries
                .iter()
                .skip(index)
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect::<Vec<_>>()
        };

        for (existing, _) in &tail {
            self.remove(existing);
        }
        for (existing, value) in tail {
            if existing == *token {
                self.insert(key.clone(), value);
            } else {
                self.insert(existing, value);
            }
        }
        true
    }

    /// Finds the entry whose value is the placeholder `token` and assigns
    /// `value` to it, returning the entry's key
    pub(crate) fn replace_placeholder_value(&self, token: &Value, value: Value) -> Option<Value> {
        let key = self
            .inner
            .borrow()
            .entries
            .iter()
            .find(|(_, existing)| *existing == token)
            .map(|(key, _)| key.clone())?;
        self.insert(key.clone(), value);
        Some(key)
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

    pub fn ptr_eq(&self, other: &MappingRef) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for MappingRef {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MappingRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingRef")
            .field("addr", &format_args!("{:#x}", self.addr()))
            .field("len", &self.len())
            .finish()
    }
}
