use crate::{
    types::ContextId,
    world::{
        registry::EdgeRole,
        value::{HookCall, MappingRef, ObjectRef, SequenceRef, SetRef, Value},
    },
};

/// Where a forward reference has to be written once its target exists
#[derive(Clone, Debug)]
pub enum PendingSlot {
    Property {
        object: ObjectRef,
        field: String,
        /// Field value before the placeholder went in
        previous: Value,
    },
    Element { sequence: SequenceRef },
    Member { set: SetRef },
    Key { mapping: MappingRef },
    Value { mapping: MappingRef },
}

/// "Once `ref_id` exists, put it where `placeholder` sits in `owner`"
#[derive(Clone, Debug)]
pub struct UnresolvedReference {
    pub owner: ContextId,
    pub ref_id: ContextId,
    pub placeholder: Value,
    pub slot: PendingSlot,
}

impl UnresolvedReference {
    /// Swaps the placeholder for `target`, returning the role under which
    /// `owner` now refers to it. `None` if the placeholder is gone, which
    /// happens when a later change in the same message removed it.
    ///
    /// Filling a property owes its hooks, which are pushed onto `hooks`.
    pub(crate) fn fill(&self, target: Value, hooks: &mut Vec<HookCall>) -> Option<EdgeRole> {
        match &self.slot {
            PendingSlot::Property {
                object,
                field,
                previous,
            } => {
                if object.get(field) != self.placeholder {
                    return None;
                }
                object.put_raw(field, target.clone());
                hooks.push(object.record_change(field, previous.clone(), target));
                Some(EdgeRole::Property(field.clone()))
            }
            PendingSlot::Element { sequence } => sequence
                .swap_placeholder(&self.placeholder, target)
                .map(EdgeRole::Index),
            PendingSlot::Member { set } => set
                .swap_placeholder(&self.placeholder, target)
                .then_some(EdgeRole::Member),
            PendingSlot::Key { mapping } => mapping
                .swap_placeholder_key(&self.placeholder, target)
                .then_some(EdgeRole::Key),
            PendingSlot::Value { mapping } => mapping
                .replace_placeholder_value(&self.placeholder, target)
                .map(|_| EdgeRole::Value),
        }
    }
}

/// Forward references collected during one synchronization pass
#[derive(Default)]
pub struct UnresolvedList {
    entries: Vec<UnresolvedReference>,
}

impl UnresolvedList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: UnresolvedReference) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn drain(&mut self) -> Vec<UnresolvedReference> {
        self.entries.drain(..).collect()
    }
}
