use log::debug;

use crate::{
    types::ContextId,
    world::{
        registry::{EdgeRole, RegistryError},
        remote::{PendingSlot, ResolveError, UnresolvedReference},
        sync::{error::SyncError, pass::SyncPass, synchronizer::Synchronizer},
        value::{MappingRef, ObjectRef, SequenceRef, SetRef, Value},
        wire::{WireError, WireKind, WireRecord},
    },
};

/// What an incoming record stands for
#[derive(Clone, Debug)]
pub(super) enum Resolution {
    Ready(Value),
    /// Reference to a container that has not arrived yet
    Pending(ContextId),
}

impl Synchronizer {
    /// Turns an incoming record into a value, materializing and registering
    /// the containers it introduces. `parent` is the edge through which the
    /// record was reached.
    pub(super) fn resolve_record(
        &mut self,
        pass: &mut SyncPass,
        record: &WireRecord,
        parent: Option<(&ContextId, &EdgeRole)>,
    ) -> Result<Resolution, SyncError> {
        if !record.kind.is_tracked() {
            return Ok(Resolution::Ready(record.to_plain_value()?));
        }
        let Some(id) = record.context_id.clone() else {
            return Err(WireError::MissingContextId {
                kind: record.kind,
                property: record.property.clone(),
            }
            .into());
        };

        if let Some(existing) = self.registry.get_context_by_id(&id).cloned() {
            if existing.kind() != record.kind {
                return Err(WireError::KindMismatch {
                    context_id: id,
                    expected: record.kind,
                    found: existing.kind(),
                }
                .into());
            }
            self.registry.resolve_id(&existing, Some(id), parent)?;
            return Ok(Resolution::Ready(existing));
        }
        if record.is_stub() {
            return Ok(Resolution::Pending(id));
        }

        let value = empty_container(record)?;
        self.registry.resolve_id(&value, Some(id.clone()), parent)?;
        pass.created.push(id.clone());

        match &value {
            Value::Object(object) => self.fill_object(pass, &id, object, record)?,
            Value::Sequence(sequence) => self.fill_sequence(pass, &id, sequence, record)?,
            Value::Set(set) => self.fill_set(pass, &id, set, record)?,
            Value::Mapping(mapping) => self.fill_mapping(pass, &id, mapping, record)?,
            _ => {}
        }
        Ok(Resolution::Ready(value))
    }

    /// Writes every forward reference of the pass, then arms the containers
    /// the pass created
    pub(super) fn complete_pass(&mut self, pass: &mut SyncPass) -> Result<(), SyncError> {
        self.fix_unresolved(pass)?;

        for id in pass.created.clone() {
            let Some(value) = self.registry.get_context_by_id(&id).cloned() else {
                continue;
            };
            self.arm(&id, &value)?;
        }
        Ok(())
    }

    fn fix_unresolved(&mut self, pass: &mut SyncPass) -> Result<(), SyncError> {
        for entry in pass.unresolved.drain() {
            let Some(target) = self.registry.get_context_by_id(&entry.ref_id).cloned() else {
                return Err(ResolveError::UnresolvedReference {
                    owner: entry.owner,
                    ref_id: entry.ref_id,
                }
                .into());
            };
            match entry.fill(target, &mut pass.hooks) {
                Some(role) => self.registry.add_edge(&entry.owner, &entry.ref_id, &role)?,
                None => debug!(
                    "Reference from {} to {} was overwritten before it resolved",
                    entry.owner, entry.ref_id
                ),
            }
        }
        Ok(())
    }

    fn fill_object(
        &mut self,
        pass: &mut SyncPass,
        id: &ContextId,
        object: &ObjectRef,
        record: &WireRecord,
    ) -> Result<(), SyncError> {
        for child in record.all_children() {
            let field = child.property.clone();
            let role = EdgeRole::Property(field.clone());
            match self.resolve_record(pass, child, Some((id, &role)))? {
                Resolution::Ready(value) => {
                    object.put_raw(&field, value);
                }
                Resolution::Pending(ref_id) => {
                    let placeholder = Value::placeholder();
                    object.put_raw(&field, placeholder.clone());
                    pass.unresolved.push(UnresolvedReference {
                        owner: id.clone(),
                        ref_id,
                        placeholder,
                        slot: PendingSlot::Property {
                            object: object.clone(),
                            field,
                            previous: Value::Null,
                        },
                    });
                }
            }
        }
        Ok(())
    }

    fn fill_sequence(
        &mut self,
        pass: &mut SyncPass,
        id: &ContextId,
        sequence: &SequenceRef,
        record: &WireRecord,
    ) -> Result<(), SyncError> {
        for (index, child) in record.children().iter().enumerate() {
            let role = EdgeRole::Index(index);
            let resolution = self.resolve_record(pass, child, Some((id, &role)))?;
            let item = pending_or_ready(pass, id, resolution, || PendingSlot::Element {
                sequence: sequence.clone(),
            });
            sequence.push(item);
        }
        Ok(())
    }

    fn fill_set(
        &mut self,
        pass: &mut SyncPass,
        id: &ContextId,
        set: &SetRef,
        record: &WireRecord,
    ) -> Result<(), SyncError> {
        for child in record.children() {
            let resolution = self.resolve_record(pass, child, Some((id, &EdgeRole::Member)))?;
            let member = pending_or_ready(pass, id, resolution, || PendingSlot::Member {
                set: set.clone(),
            });
            set.insert(member);
        }
        Ok(())
    }

    fn fill_mapping(
        &mut self,
        pass: &mut SyncPass,
        id: &ContextId,
        mapping: &MappingRef,
        record: &WireRecord,
    ) -> Result<(), SyncError> {
        for pair in record.children().chunks(2) {
            let [key, value] = pair else {
                return Err(WireError::MalformedMapping {
                    context_id: id.clone(),
                    count: record.children().len(),
                }
                .into());
            };
            self.insert_entry(pass, id, mapping, key, value)?;
        }
        Ok(())
    }

    /// Resolves and inserts one mapping entry, replacing the value of an
    /// existing key
    pub(super) fn insert_entry(
        &mut self,
        pass: &mut SyncPass,
        id: &ContextId,
        mapping: &MappingRef,
        key: &WireRecord,
        value: &WireRecord,
    ) -> Result<(), SyncError> {
        let resolution = self.resolve_record(pass, key, Some((id, &EdgeRole::Key)))?;
        let key = pending_or_ready(pass, id, resolution, || PendingSlot::Key {
            mapping: mapping.clone(),
        });
        if let Some(old) = mapping.get(&key) {
            self.retract_child(pass, id, &old, &EdgeRole::Value)?;
        }

        let resolution = self.resolve_record(pass, value, Some((id, &EdgeRole::Value)))?;
        let value = pending_or_ready(pass, id, resolution, || PendingSlot::Value {
            mapping: mapping.clone(),
        });
        mapping.insert(key, value);
        Ok(())
    }

    /// Registered container for an identifier carried by a change
    pub(super) fn registered(&self, id: &ContextId) -> Result<Value, SyncError> {
        self.registry.get_context_by_id(id).cloned().ok_or_else(|| {
            RegistryError::MissingBinding {
                context_id: id.clone(),
            }
            .into()
        })
    }
}

/// The resolved value, or a placeholder queued for the fix-up pass
pub(super) fn pending_or_ready(
    pass: &mut SyncPass,
    owner: &ContextId,
    resolution: Resolution,
    slot: impl FnOnce() -> PendingSlot,
) -> Value {
    match resolution {
        Resolution::Ready(value) => value,
        Resolution::Pending(ref_id) => {
            let placeholder = Value::placeholder();
            pass.unresolved.push(UnresolvedReference {
                owner: owner.clone(),
                ref_id,
                placeholder: placeholder.clone(),
                slot: slot(),
            });
            placeholder
        }
    }
}

fn empty_container(record: &WireRecord) -> Result<Value, WireError> {
    match record.kind {
        WireKind::StructuredObject => Ok(ObjectRef::new().into()),
        WireKind::Sequence => Ok(SequenceRef::new().into()),
        WireKind::Set => Ok(SetRef::new().into()),
        WireKind::Mapping => Ok(MappingRef::new().into()),
        kind => Err(WireError::UnexpectedPayload {
            kind,
            property: record.property.clone(),
            detail: "expected a container",
        }),
    }
}
