use log::trace;

use crate::{
    types::ContextId,
    world::{
        observer::{CollectionObserver, ObserverError, PropertyObserver},
        registry::{EdgeRole, RegistryError},
        sync::{error::SyncError, pass::SyncPass, synchronizer::Synchronizer},
        value::Value,
        wire::WireRecord,
    },
};

/// Which half of an observer's cycle to run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum ObserverStep {
    Publish,
    Apply,
    Settle,
}

impl Synchronizer {
    /// Encodes `value` for the wire, registering and arming every container
    /// met for the first time. Containers that were already registered are
    /// sent as references.
    pub(super) fn observe_value(
        &mut self,
        pass: &mut SyncPass,
        property: &str,
        parent: Option<(&ContextId, &EdgeRole)>,
        value: &Value,
    ) -> Result<WireRecord, SyncError> {
        let parent_id = parent.map(|(id, _)| id.clone());
        match value {
            Value::Timestamp(timestamp) => {
                return Ok(WireRecord::timestamp(property, parent_id, *timestamp));
            }
            value if !value.is_tracked() => {
                return Ok(WireRecord::scalar(property, parent_id, value));
            }
            _ => {}
        }

        let resolved = self.registry.resolve_id(value, None, parent)?;
        let id = resolved.id;
        if !resolved.newly_registered {
            return Ok(WireRecord::stub(property, value.kind(), id, parent_id));
        }

        pass.seen.insert(id.clone());
        self.arm(&id, value)?;
        trace!("Walking new {} {}", value.kind(), id);

        let record = match value {
            Value::Object(object) => {
                let mut inline = Vec::new();
                let mut complex = Vec::new();
                for (field, child) in object.synced_fields() {
                    let role = EdgeRole::Property(field.clone());
                    let record = self.observe_value(pass, &field, Some((&id, &role)), &child)?;
                    if child.is_tracked() {
                        complex.push(record);
                    } else {
                        inline.push(record);
                    }
                }
                WireRecord::object(property, id, parent_id, inline, complex)
            }
            Value::Sequence(sequence) => {
                let mut children = Vec::with_capacity(sequence.len());
                for (index, item) in sequence.to_vec().into_iter().enumerate() {
                    let role = EdgeRole::Index(index);
                    children.push(self.observe_value(
                        pass,
                        &index.to_string(),
                        Some((&id, &role)),
                        &item,
                    )?);
                }
                WireRecord::collection(property, value.kind(), id, parent_id, children)
            }
            Value::Set(set) => {
                let mut children = Vec::with_capacity(set.len());
                for member in set.to_vec() {
                    children.push(self.observe_value(
                        pass,
                        "",
                        Some((&id, &EdgeRole::Member)),
                        &member,
                    )?);
                }
                WireRecord::collection(property, value.kind(), id, parent_id, children)
            }
            Value::Mapping(mapping) => {
                let mut children = Vec::with_capacity(mapping.len() * 2);
                for (key, item) in mapping.entries() {
                    children.push(self.observe_value(pass, "key", Some((&id, &EdgeRole::Key)), &key)?);
                    children.push(self.observe_value(
                        pass,
                        "value",
                        Some((&id, &EdgeRole::Value)),
                        &item,
                    )?);
                }
                WireRecord::collection(property, value.kind(), id, parent_id, children)
            }
            other => WireRecord::scalar(property, parent_id, other),
        };
        Ok(record)
    }

    /// Starts recording mutations of a registered value. Arming twice is a
    /// no-op.
    pub(super) fn arm(&mut self, id: &ContextId, value: &Value) -> Result<(), SyncError> {
        match value {
            Value::Object(object) => {
                for (field, _) in object.synced_fields() {
                    self.property_observer(id, &field)?;
                }
            }
            _ => {
                self.collection_observer(id, value)?;
            }
        }
        self.registry.try_binding_mut(id)?.set_observed();
        value.attach_mutator(self.channel.new_mutator(id));
        Ok(())
    }

    /// Runs one step of the observer watching `field` on `owner`
    pub(super) fn step_property(
        &mut self,
        owner: &ContextId,
        field: &str,
        step: ObserverStep,
    ) -> Result<(), SyncError> {
        let observer = self.property_observer(owner, field)?;
        match step {
            ObserverStep::Publish => observer.try_begin_publish()?,
            ObserverStep::Apply => observer.try_begin_apply()?,
            ObserverStep::Settle => observer.try_settle()?,
        }
        Ok(())
    }

    /// Runs one step of the observer watching the collection `id`
    pub(super) fn step_collection(
        &mut self,
        id: &ContextId,
        value: &Value,
        step: ObserverStep,
    ) -> Result<(), SyncError> {
        let observer = self.collection_observer(id, value)?;
        match step {
            ObserverStep::Publish => observer.try_begin_publish()?,
            ObserverStep::Apply => observer.try_begin_apply()?,
            ObserverStep::Settle => observer.try_settle()?,
        }
        Ok(())
    }

    /// Settles an observer after `result`, keeping the first error
    pub(super) fn settle_property<T>(
        &mut self,
        owner: &ContextId,
        field: &str,
        result: Result<T, SyncError>,
    ) -> Result<T, SyncError> {
        let settled = self.step_property(owner, field, ObserverStep::Settle);
        let value = result?;
        settled?;
        Ok(value)
    }

    pub(super) fn settle_collection<T>(
        &mut self,
        id: &ContextId,
        value: &Value,
        result: Result<T, SyncError>,
    ) -> Result<T, SyncError> {
        let settled = self.step_collection(id, value, ObserverStep::Settle);
        let output = result?;
        settled?;
        Ok(output)
    }

    /// Removes one edge from `parent` to `child` if `child` is a registered
    /// container, making it a teardown candidate
    pub(super) fn retract_child(
        &mut self,
        pass: &mut SyncPass,
        parent: &ContextId,
        child: &Value,
        role: &EdgeRole,
    ) -> Result<(), SyncError> {
        let Some(child_id) = self.registry.get_id_by_context(child).cloned() else {
            return Ok(());
        };
        self.registry.remove_edge(parent, &child_id, role)?;
        pass.retracted.push(child_id);
        Ok(())
    }

    // Fetches the observer, creating and arming it for fields that appeared
    // after the object was first walked
    fn property_observer(
        &mut self,
        owner: &ContextId,
        field: &str,
    ) -> Result<&mut PropertyObserver, SyncError> {
        let Some(binding) = self.registry.binding_mut(owner) else {
            return Err(ObserverError::OwnerNotRegistered {
                owner: owner.clone(),
                field: field.to_string(),
            }
            .into());
        };
        if binding.property_observer(field).is_none() {
            binding
                .add_property_observer(PropertyObserver::new(owner, field))
                .try_arm()?;
        }
        binding.property_observer_mut(field).ok_or_else(|| {
            ObserverError::OwnerNotRegistered {
                owner: owner.clone(),
                field: field.to_string(),
            }
            .into()
        })
    }

    fn collection_observer(
        &mut self,
        id: &ContextId,
        value: &Value,
    ) -> Result<&mut CollectionObserver, SyncError> {
        let binding = self.registry.try_binding_mut(id)?;
        if binding.collection_observer().is_none() {
            binding
                .set_collection_observer(CollectionObserver::new(id, value.kind()))
                .try_arm()?;
        }
        binding.collection_observer_mut().ok_or_else(|| {
            RegistryError::MissingBinding {
                context_id: id.clone(),
            }
            .into()
        })
    }
}
