mod mapping;
mod object;
mod sequence;
mod set;
mod timestamp;
#[allow(clippy::module_inception)]
mod value;

pub use mapping::MappingRef;
pub(crate) use object::HookCall;
pub use object::{ChangeHook, FieldMode, ObjectRef, ObjectSchema};
pub use sequence::SequenceRef;
pub use set::SetRef;
pub use timestamp::{TimeError, Timestamp};
pub use value::Value;

use crate::world::observer::mut_channel::{MutChannel, Mutator};

impl Value {
    pub(crate) fn attach_mutator(&self, mutator: Mutator) {
        match self {
            Value::Object(inner) => inner.attach_mutator(mutator),
            Value::Sequence(inner) => inner.attach_mutator(mutator),
            Value::Set(inner) => inner.attach_mutator(mutator),
            Value::Mapping(inner) => inner.attach_mutator(mutator),
            _ => {}
        }
    }

    pub(crate) fn detach_mutator(&self, channel: &MutChannel) {
        match self {
            Value::Object(inner) => inner.detach_mutator(channel),
            Value::Sequence(inner) => inner.detach_mutator(channel),
            Value::Set(inner) => inner.detach_mutator(channel),
            Value::Mapping(inner) => inner.detach_mutator(channel),
            _ => {}
        }
    }

    pub(crate) fn is_attached(&self, channel: &MutChannel) -> bool {
        match self {
            Value::Object(inner) => inner.is_attached(channel),
            Value::Sequence(inner) => inner.is_attached(channel),
            Value::Set(inner) => inner.is_attached(channel),
            Value::Mapping(inner) => inner.is_attached(channel),
            _ => false,
        }
    }
}
