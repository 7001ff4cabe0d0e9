use crate::{types::ContextId, world::value::Value};

/// One structural mutation observed on a live container.
///
/// Records keep the values involved at the time of the mutation; the
/// synchronizer encodes whatever those values look like when it flushes.
#[derive(Clone, Debug, PartialEq)]
pub enum ChangeRecord {
    Property {
        field: String,
        old: Value,
        new: Value,
    },
    Splice {
        index: usize,
        removed: Vec<Value>,
        added: Vec<Value>,
    },
    SetAdd(Value),
    SetDelete(Value),
    SetClear(Vec<Value>),
    MapAdd {
        key: Value,
        value: Value,
    },
    MapUpdate {
        key: Value,
        old: Value,
        new: Value,
    },
    MapDelete {
        key: Value,
        old: Value,
    },
    MapClear(Vec<(Value, Value)>),
}

impl ChangeRecord {
    pub fn name(&self) -> &'static str {
        match self {
            ChangeRecord::Property { .. } => "property",
            ChangeRecord::Splice { .. } => "splice",
            ChangeRecord::SetAdd(_) => "set-add",
            ChangeRecord::SetDelete(_) => "set-delete",
            ChangeRecord::SetClear(_) => "set-clear",
            ChangeRecord::MapAdd { .. } => "mapping-add",
            ChangeRecord::MapUpdate { .. } => "mapping-update",
            ChangeRecord::MapDelete { .. } => "mapping-delete",
            ChangeRecord::MapClear(_) => "mapping-clear",
        }
    }

    pub fn is_splice(&self) -> bool {
        matches!(self, ChangeRecord::Splice { .. })
    }

    pub fn is_set_change(&self) -> bool {
        matches!(
            self,
            ChangeRecord::SetAdd(_) | ChangeRecord::SetDelete(_) | ChangeRecord::SetClear(_)
        )
    }

    pub fn is_mapping_change(&self) -> bool {
        matches!(
            self,
            ChangeRecord::MapAdd { .. }
                | ChangeRecord::MapUpdate { .. }
                | ChangeRecord::MapDelete { .. }
                | ChangeRecord::MapClear(_)
        )
    }

    /// Whether `other` can travel in the same collection message as `self`
    pub(crate) fn batches_with(&self, other: &ChangeRecord) -> bool {
        (self.is_splice() && other.is_splice())
            || (self.is_set_change() && other.is_set_change())
            || (self.is_mapping_change() && other.is_mapping_change())
    }
}

/// A change record addressed to the container it was observed on
#[derive(Clone, Debug, PartialEq)]
pub struct Mutation {
    pub target: ContextId,
    pub record: ChangeRecord,
}
