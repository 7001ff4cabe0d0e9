use std::{collections::BTreeSet, fmt};

/// How a parent refers to a child through one slot
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EdgeRole {
    /// Field of a structured object
    Property(String),
    /// Position in a sequence
    Index(usize),
    /// Member of a set
    Member,
    /// Key of a mapping entry
    Key,
    /// Value of a mapping entry
    Value,
}

impl fmt::Display for EdgeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeRole::Property(field) => write!(f, "property `{}`", field),
            EdgeRole::Index(index) => write!(f, "index {}", index),
            EdgeRole::Member => f.write_str("member"),
            EdgeRole::Key => f.write_str("key"),
            EdgeRole::Value => f.write_str("value"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    Property(String),
    Index(usize),
}

/// Metadata of one parent/child edge.
///
/// Objects and sequences count the slots holding the child, sets only need
/// the edge to exist, mappings track the key role and the number of entries
/// holding the child as a value. The edge is gone once this is empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChildReference {
    Slots(BTreeSet<Slot>),
    Member,
    Entry { as_key: bool, value_count: usize },
}

/// Why a role could not be added to or retracted from an edge
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RoleFault {
    Mismatch,
    NotFound,
}

impl ChildReference {
    pub fn for_role(role: &EdgeRole) -> Self {
        match role {
            EdgeRole::Property(_) | EdgeRole::Index(_) => ChildReference::Slots(BTreeSet::new()),
            EdgeRole::Member => ChildReference::Member,
            EdgeRole::Key | EdgeRole::Value => ChildReference::Entry {
                as_key: false,
                value_count: 0,
            },
        }
    }

    pub(crate) fn add(&mut self, role: &EdgeRole) -> Result<(), RoleFault> {
        match (self, role) {
            (ChildReference::Slots(slots), EdgeRole::Property(field)) => {
                slots.insert(Slot::Property(field.clone()));
            }
            (ChildReference::Slots(slots), EdgeRole::Index(index)) => {
                slots.insert(Slot::Index(*index));
            }
            (ChildReference::Member, EdgeRole::Member) => {}
            (ChildReference::Entry { as_key, .. }, EdgeRole::Key) => *as_key = true,
            (ChildReference::Entry { value_count, .. }, EdgeRole::Value) => *value_count += 1,
            _ => return Err(RoleFault::Mismatch),
        }
        Ok(())
    }

    /// Retracts one role, returning whether the edge is now empty
    pub(crate) fn retract(&mut self, role: &EdgeRole) -> Result<bool, RoleFault> {
        match (&mut *self, role) {
            (ChildReference::Slots(slots), EdgeRole::Property(field)) => {
                if !slots.remove(&Slot::Property(field.clone())) {
                    return Err(RoleFault::NotFound);
                }
            }
            (ChildReference::Slots(slots), EdgeRole::Index(index)) => {
                if !slots.remove(&Slot::Index(*index)) {
                    return Err(RoleFault::NotFound);
                }
            }
            (ChildReference::Member, EdgeRole::Member) => return Ok(true),
            (ChildReference::Entry { as_key, .. }, EdgeRole::Key) => {
                if !*as_key {
                    return Err(RoleFault::NotFound);
                }
                *as_key = false;
            }
            (ChildReference::Entry { value_count, .. }, EdgeRole::Value) => {
                if *value_count == 0 {
                    return Err(RoleFault::NotFound);
                }
                *value_count -= 1;
            }
            _ => return Err(RoleFault::Mismatch),
        }
        Ok(self.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ChildReference::Slots(slots) => slots.is_empty(),
            ChildReference::Member => false,
            ChildReference::Entry {
                as_key,
                value_count,
            } => !*as_key && *value_count == 0,
        }
    }

    pub fn slots(&self) -> Option<&BTreeSet<Slot>> {
        match self {
            ChildReference::Slots(slots) => Some(slots),
            _ => None,
        }
    }

    /// Moves sequence positions after a splice at `index` that removed
    /// `removed` elements and inserted `added`. Positions inside the removed
    /// range are dropped.
    pub(crate) fn shift_indices(&mut self, index: usize, removed: usize, added: usize) {
        let ChildReference::Slots(slots) = self else {
            return;
        };
        *slots = slots
            .iter()
            .filter_map(|slot| match slot {
                Slot::Index(position) if *position < index => Some(Slot::Index(*position)),
                Slot::Index(position) if *position < index + removed => None,
                Slot::Index(position) => Some(Slot::Index(*position - removed + added)),
                other => Some(other.clone()),
            })
            .collect();
    }
}
