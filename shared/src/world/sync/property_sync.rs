use crate::{
    messages::SyncMessage,
    types::ContextId,
    world::{
        registry::{EdgeRole, RegistryError},
        remote::{PendingSlot, UnresolvedReference},
        sync::{
            error::SyncError,
            observe::ObserverStep,
            pass::SyncPass,
            resolve::Resolution,
            synchronizer::Synchronizer,
        },
        value::{ObjectRef, Value},
        wire::{WireError, WireKind, WireRecord},
    },
};

impl Synchronizer {
    /// Encodes one assignment to a synchronized field
    pub(super) fn publish_property(
        &mut self,
        pass: &mut SyncPass,
        owner: &ContextId,
        field: String,
        old: Value,
        new: Value,
    ) -> Result<SyncMessage, SyncError> {
        self.step_property(owner, &field, ObserverStep::Publish)?;
        let result = self.encode_property(pass, owner, &field, &old, &new);
        let record = self.settle_property(owner, &field, result)?;
        Ok(SyncMessage::PropertyChanged(record))
    }

    fn encode_property(
        &mut self,
        pass: &mut SyncPass,
        owner: &ContextId,
        field: &str,
        old: &Value,
        new: &Value,
    ) -> Result<WireRecord, SyncError> {
        let role = EdgeRole::Property(field.to_string());
        self.retract_child(pass, owner, old, &role)?;
        self.observe_value(pass, field, Some((owner, &role)), new)
    }

    /// Applies a property-changed record to the mirrored object
    pub(super) fn apply_property(
        &mut self,
        pass: &mut SyncPass,
        record: &WireRecord,
    ) -> Result<(), SyncError> {
        let owner = record
            .parent_id
            .clone()
            .ok_or_else(|| WireError::MissingParentId {
                property: record.property.clone(),
            })?;
        let object = self.target_object(&owner)?;
        let field = record.property.clone();

        self.step_property(&owner, &field, ObserverStep::Apply)?;
        let result = self.assign_property(pass, &owner, &object, &field, record);
        self.settle_property(&owner, &field, result)
    }

    fn assign_property(
        &mut self,
        pass: &mut SyncPass,
        owner: &ContextId,
        object: &ObjectRef,
        field: &str,
        record: &WireRecord,
    ) -> Result<(), SyncError> {
        let role = EdgeRole::Property(field.to_string());
        let old = object.get(field);
        self.retract_child(pass, owner, &old, &role)?;

        match self.resolve_record(pass, record, Some((owner, &role)))? {
            Resolution::Ready(value) => {
                if let Some(call) = object.assign(field, value) {
                    pass.hooks.push(call);
                }
            }
            Resolution::Pending(ref_id) => {
                // hooks run once the reference is filled in
                let placeholder = Value::placeholder();
                object.put_raw(field, placeholder.clone());
                pass.unresolved.push(UnresolvedReference {
                    owner: owner.clone(),
                    ref_id,
                    placeholder,
                    slot: PendingSlot::Property {
                        object: object.clone(),
                        field: field.to_string(),
                        previous: old,
                    },
                });
            }
        }
        Ok(())
    }

    fn target_object(&self, id: &ContextId) -> Result<ObjectRef, SyncError> {
        let value = self
            .registry
            .get_context_by_id(id)
            .ok_or_else(|| RegistryError::MissingBinding {
                context_id: id.clone(),
            })?;
        value.as_object().cloned().ok_or_else(|| {
            WireError::KindMismatch {
                context_id: id.clone(),
                expected: WireKind::StructuredObject,
                found: value.kind(),
            }
            .into()
        })
    }
}
