use std::{
    collections::HashMap,
    hash::{Hash, Hasher},
    mem,
};

use uuid::Uuid;

use crate::world::{
    value::{MappingRef, ObjectRef, SequenceRef, SetRef, Timestamp},
    wire::WireKind,
};

const PLACEHOLDER_PREFIX: &str = "\u{0}tandem-pending:";

/// A node of a synchronizable graph.
///
/// Scalars and timestamps are plain values. The four container variants are
/// shared handles: cloning a `Value::Object` clones the handle, not the
/// object, and equality/hashing on containers is by identity.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Timestamp(Timestamp),
    Object(ObjectRef),
    Sequence(SequenceRef),
    Set(SetRef),
    Mapping(MappingRef),
}

impl Value {
    pub fn kind(&self) -> WireKind {
        match self {
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::Text(_) => WireKind::Scalar,
            Value::Timestamp(_) => WireKind::Timestamp,
            Value::Object(_) => WireKind::StructuredObject,
            Value::Sequence(_) => WireKind::Sequence,
            Value::Set(_) => WireKind::Set,
            Value::Mapping(_) => WireKind::Mapping,
        }
    }

    /// Containers are tracked by the registry, everything else travels by value
    pub fn is_tracked(&self) -> bool {
        self.kind().is_tracked()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Address of the shared allocation behind a container handle
    pub(crate) fn identity(&self) -> Option<usize> {
        match self {
            Value::Object(inner) => Some(inner.addr()),
            Value::Sequence(inner) => Some(inner.addr()),
            Value::Set(inner) => Some(inner.addr()),
            Value::Mapping(inner) => Some(inner.addr()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&SequenceRef> {
        match self {
            Value::Sequence(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&SetRef> {
        match self {
            Value::Set(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&MappingRef> {
        match self {
            Value::Mapping(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(number) => Some(*number),
            _ => None,
        }
    }

    /// A throwaway scalar that holds a slot open until a forward reference
    /// can be filled in. Never equal to any value an application produces.
    pub(crate) fn placeholder() -> Self {
        Value::Text(format!("{}{}", PLACEHOLDER_PREFIX, Uuid::new_v4().simple()))
    }

    #[cfg(test)]
    pub(crate) fn is_placeholder(&self) -> bool {
        matches!(self, Value::Text(text) if text.starts_with(PLACEHOLDER_PREFIX))
    }

    /// Structural comparison of two graphs.
    ///
    /// Containers are matched pairwise, so a cycle on one side must be the
    /// same cycle on the other. Sequences, sets and mappings compare in
    /// iteration order; objects compare their synchronized fields by name.
    pub fn deep_eq(&self, other: &Value) -> bool {
        deep_eq_inner(self, other, &mut Pairing::default())
    }
}

/// Container pairs matched so far, kept in both directions so two
/// distinct nodes on one side never match a single node on the other
#[derive(Default)]
struct Pairing {
    forward: HashMap<usize, usize>,
    backward: HashMap<usize, usize>,
}

impl Pairing {
    /// `None` when the pair is new, otherwise whether it agrees with the
    /// pairing already made
    fn check(&mut self, a: usize, b: usize) -> Option<bool> {
        match (self.forward.get(&a), self.backward.get(&b)) {
            (None, None) => {
                self.forward.insert(a, b);
                self.backward.insert(b, a);
                None
            }
            (Some(paired_b), Some(paired_a)) => Some(*paired_b == b && *paired_a == a),
            _ => Some(false),
        }
    }
}

fn deep_eq_inner(a: &Value, b: &Value, pairs: &mut Pairing) -> bool {
    if let (Some(a_addr), Some(b_addr)) = (a.identity(), b.identity()) {
        if mem::discriminant(a) != mem::discriminant(b) {
            return false;
        }
        if let Some(agrees) = pairs.check(a_addr, b_addr) {
            return agrees;
        }
    }

    match (a, b) {
        (Value::Object(a), Value::Object(b)) => {
            let a_fields = a.synced_fields();
            let b_fields = b.synced_fields();
            if a_fields.len() != b_fields.len() {
                return false;
            }
            a_fields.iter().all(|(name, a_value)| {
                b_fields
                    .iter()
                    .find(|(other, _)| other == name)
                    .is_some_and(|(_, b_value)| deep_eq_inner(a_value, b_value, pairs))
            })
        }
        (Value::Sequence(a), Value::Sequence(b)) => {
            deep_eq_list(&a.to_vec(), &b.to_vec(), pairs)
        }
        (Value::Set(a), Value::Set(b)) => deep_eq_list(&a.to_vec(), &b.to_vec(), pairs),
        (Value::Mapping(a), Value::Mapping(b)) => {
            let a_entries = a.entries();
            let b_entries = b.entries();
            a_entries.len() == b_entries.len()
                && a_entries.iter().zip(b_entries.iter()).all(|((ak, av), (bk, bv))| {
                    deep_eq_inner(ak, bk, pairs) && deep_eq_inner(av, bv, pairs)
                })
        }
        _ => a == b,
    }
}

fn deep_eq_list(a: &[Value], b: &[Value], pairs: &mut Pairing) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(a, b)| deep_eq_inner(a, b, pairs))
}

// NaN equals NaN and 0.0 equals -0.0, so numbers are usable as set members
fn number_bits(number: f64) -> u64 {
    if number == 0.0 {
        0
    } else if number.is_nan() {
        f64::NAN.to_bits()
    } else {
        number.to_bits()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => number_bits(*a) == number_bits(*b),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Sequence(a), Value::Sequence(b)) => a.ptr_eq(b),
            (Value::Set(a), Value::Set(b)) => a.ptr_eq(b),
            (Value::Mapping(a), Value::Mapping(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(inner) => inner.hash(state),
            Value::Number(inner) => number_bits(*inner).hash(state),
            Value::Text(inner) => inner.hash(state),
            Value::Timestamp(inner) => inner.hash(state),
            Value::Object(_) | Value::Sequence(_) | Value::Set(_) | Value::Mapping(_) => {
                self.identity().hash(state)
            }
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Timestamp> for Value {
    fn from(value: Timestamp) -> Self {
        Value::Timestamp(value)
    }
}

impl From<ObjectRef> for Value {
    fn from(value: ObjectRef) -> Self {
        Value::Object(value)
    }
}

impl From<SequenceRef> for Value {
    fn from(value: SequenceRef) -> Self {
        Value::Sequence(value)
    }
}

impl From<SetRef> for Value {
    fn from(value: SetRef) -> Self {
        Value::Set(value)
    }
}

impl From<MappingRef> for Value {
    fn from(value: MappingRef) -> Self {
        Value::Mapping(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}
