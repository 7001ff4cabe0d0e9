use log::warn;

use crate::{
    messages::{ChangeKind, CollectionChange, CollectionChanged, SpliceBatch, SyncMessage},
    types::ContextId,
    world::{
        observer::ChangeRecord,
        registry::EdgeRole,
        remote::PendingSlot,
        sync::{
            error::SyncError,
            observe::ObserverStep,
            pass::SyncPass,
            resolve::pending_or_ready,
            synchronizer::Synchronizer,
        },
        value::{MappingRef, SequenceRef, SetRef, Value},
        wire::{WireError, WireKind, WireRecord},
    },
};

// Outgoing
impl Synchronizer {
    pub(super) fn publish_sequence(
        &mut self,
        pass: &mut SyncPass,
        target: &ContextId,
        records: Vec<ChangeRecord>,
    ) -> Result<SyncMessage, SyncError> {
        let value = self.target_collection(target, WireKind::Sequence)?;
        self.step_collection(target, &value, ObserverStep::Publish)?;
        let result = self.encode_splices(pass, target, records);
        let batches = self.settle_collection(target, &value, result)?;
        Ok(SyncMessage::SequenceChanged {
            context_id: target.clone(),
            batches,
        })
    }

    fn encode_splices(
        &mut self,
        pass: &mut SyncPass,
        target: &ContextId,
        records: Vec<ChangeRecord>,
    ) -> Result<Vec<SpliceBatch>, SyncError> {
        let mut batches = Vec::with_capacity(records.len());
        for record in records {
            let (index, removed, added) = match record {
                ChangeRecord::Splice {
                    index,
                    removed,
                    added,
                } => (index, removed, added),
                other => {
                    warn!("Ignoring {} change on sequence {}", other.name(), target);
                    continue;
                }
            };

            let dropped =
                self.registry
                    .shift_sequence_slots(target, index, removed.len(), added.len())?;
            pass.retracted.extend(dropped);

            let mut added_records = Vec::with_capacity(added.len());
            for (offset, item) in added.iter().enumerate() {
                let position = index + offset;
                let role = EdgeRole::Index(position);
                added_records.push(self.observe_value(
                    pass,
                    &position.to_string(),
                    Some((target, &role)),
                    item,
                )?);
            }
            batches.push(SpliceBatch {
                index,
                removed_count: removed.len(),
                added_records,
            });
        }
        Ok(batches)
    }

    pub(super) fn publish_set(
        &mut self,
        pass: &mut SyncPass,
        target: &ContextId,
        records: Vec<ChangeRecord>,
    ) -> Result<SyncMessage, SyncError> {
        let value = self.target_collection(target, WireKind::Set)?;
        self.step_collection(target, &value, ObserverStep::Publish)?;
        let result = self.encode_set_changes(pass, target, records);
        let changes = self.settle_collection(target, &value, result)?;
        Ok(SyncMessage::SetChanged(CollectionChanged {
            context_id: target.clone(),
            changes,
        }))
    }

    fn encode_set_changes(
        &mut self,
        pass: &mut SyncPass,
        target: &ContextId,
        records: Vec<ChangeRecord>,
    ) -> Result<Vec<CollectionChange>, SyncError> {
        let mut changes = Vec::with_capacity(records.len());
        for record in records {
            match record {
                ChangeRecord::SetAdd(member) => {
                    let mut change = CollectionChange::new(ChangeKind::Add);
                    change.value =
                        Some(self.observe_value(pass, "", Some((target, &EdgeRole::Member)), &member)?);
                    changes.push(change);
                }
                ChangeRecord::SetDelete(member) => {
                    let mut change = CollectionChange::new(ChangeKind::Delete);
                    if member.is_tracked() {
                        let Some(id) = self.id_of(&member) else {
                            warn!("Skipping delete of unregistered member from set {}", target);
                            continue;
                        };
                        self.retract_child(pass, target, &member, &EdgeRole::Member)?;
                        change.value_id = Some(id);
                    } else {
                        change.value = Some(self.observe_value(pass, "", None, &member)?);
                    }
                    changes.push(change);
                }
                ChangeRecord::SetClear(members) => {
                    for member in &members {
                        self.retract_child(pass, target, member, &EdgeRole::Member)?;
                    }
                    changes.push(CollectionChange::new(ChangeKind::Clear));
                }
                other => warn!("Ignoring {} change on set {}", other.name(), target),
            }
        }
        Ok(changes)
    }

    pub(super) fn publish_mapping(
        &mut self,
        pass: &mut SyncPass,
        target: &ContextId,
        records: Vec<ChangeRecord>,
    ) -> Result<SyncMessage, SyncError> {
        let value = self.target_collection(target, WireKind::Mapping)?;
        self.step_collection(target, &value, ObserverStep::Publish)?;
        let result = self.encode_mapping_changes(pass, target, records);
        let changes = self.settle_collection(target, &value, result)?;
        Ok(SyncMessage::MappingChanged(CollectionChanged {
            context_id: target.clone(),
            changes,
        }))
    }

    fn encode_mapping_changes(
        &mut self,
        pass: &mut SyncPass,
        target: &ContextId,
        records: Vec<ChangeRecord>,
    ) -> Result<Vec<CollectionChange>, SyncError> {
        let mut changes = Vec::with_capacity(records.len());
        for record in records {
            match record {
                ChangeRecord::MapAdd { key, value } => {
                    let mut change = CollectionChange::new(ChangeKind::Add);
                    change.key =
                        Some(self.observe_value(pass, "key", Some((target, &EdgeRole::Key)), &key)?);
                    change.value = Some(self.observe_value(
                        pass,
                        "value",
                        Some((target, &EdgeRole::Value)),
                        &value,
                    )?);
                    changes.push(change);
                }
                ChangeRecord::MapUpdate { key, old, new } => {
                    let mut change = CollectionChange::new(ChangeKind::Update);
                    if !self.address_key(pass, &mut change, &key)? {
                        warn!("Skipping update of unregistered key in mapping {}", target);
                        continue;
                    }
                    self.retract_child(pass, target, &old, &EdgeRole::Value)?;
                    change.value = Some(self.observe_value(
                        pass,
                        "value",
                        Some((target, &EdgeRole::Value)),
                        &new,
                    )?);
                    changes.push(change);
                }
                ChangeRecord::MapDelete { key, old } => {
                    let mut change = CollectionChange::new(ChangeKind::Delete);
                    if !self.address_key(pass, &mut change, &key)? {
                        warn!("Skipping delete of unregistered key in mapping {}", target);
                        continue;
                    }
                    self.retract_child(pass, target, &key, &EdgeRole::Key)?;
                    self.retract_child(pass, target, &old, &EdgeRole::Value)?;
                    changes.push(change);
                }
                ChangeRecord::MapClear(entries) => {
                    for (key, value) in &entries {
                        self.retract_child(pass, target, key, &EdgeRole::Key)?;
                        self.retract_child(pass, target, value, &EdgeRole::Value)?;
                    }
                    changes.push(CollectionChange::new(ChangeKind::Clear));
                }
                other => warn!("Ignoring {} change on mapping {}", other.name(), target),
            }
        }
        Ok(changes)
    }

    // Tracked keys travel by identifier, scalar keys by value. False if the
    // key is a container that is no longer registered.
    fn address_key(
        &mut self,
        pass: &mut SyncPass,
        change: &mut CollectionChange,
        key: &Value,
    ) -> Result<bool, SyncError> {
        if !key.is_tracked() {
            change.key = Some(self.observe_value(pass, "key", None, key)?);
            return Ok(true);
        }
        match self.id_of(key) {
            Some(id) => {
                change.key_id = Some(id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn target_collection(&self, id: &ContextId, expected: WireKind) -> Result<Value, SyncError> {
        let value = self.registered(id)?;
        if value.kind() != expected {
            return Err(WireError::KindMismatch {
                context_id: id.clone(),
                expected,
                found: value.kind(),
            }
            .into());
        }
        Ok(value)
    }
}

// Incoming
impl Synchronizer {
    pub(super) fn apply_sequence(
        &mut self,
        pass: &mut SyncPass,
        target: &ContextId,
        batches: &[SpliceBatch],
    ) -> Result<(), SyncError> {
        let value = self.target_collection(target, WireKind::Sequence)?;
        let Some(sequence) = value.as_sequence().cloned() else {
            return Ok(());
        };
        self.step_collection(target, &value, ObserverStep::Apply)?;
        let result = self.apply_splices(pass, target, &sequence, batches);
        self.settle_collection(target, &value, result)
    }

    fn apply_splices(
        &mut self,
        pass: &mut SyncPass,
        target: &ContextId,
        sequence: &SequenceRef,
        batches: &[SpliceBatch],
    ) -> Result<(), SyncError> {
        for batch in batches {
            let dropped = self.registry.shift_sequence_slots(
                target,
                batch.index,
                batch.removed_count,
                batch.added_records.len(),
            )?;
            pass.retracted.extend(dropped);

            let mut added = Vec::with_capacity(batch.added_records.len());
            for (offset, record) in batch.added_records.iter().enumerate() {
                let role = EdgeRole::Index(batch.index + offset);
                let resolution = self.resolve_record(pass, record, Some((target, &role)))?;
                added.push(pending_or_ready(pass, target, resolution, || {
                    PendingSlot::Element {
                        sequence: sequence.clone(),
                    }
                }));
            }
            sequence.splice(batch.index, batch.removed_count, added);
        }
        Ok(())
    }

    pub(super) fn apply_set(
        &mut self,
        pass: &mut SyncPass,
        changed: &CollectionChanged,
    ) -> Result<(), SyncError> {
        let target = &changed.context_id;
        let value = self.target_collection(target, WireKind::Set)?;
        let Some(set) = value.as_set().cloned() else {
            return Ok(());
        };
        self.step_collection(target, &value, ObserverStep::Apply)?;
        let result = self.apply_set_changes(pass, target, &set, &changed.changes);
        self.settle_collection(target, &value, result)
    }

    fn apply_set_changes(
        &mut self,
        pass: &mut SyncPass,
        target: &ContextId,
        set: &SetRef,
        changes: &[CollectionChange],
    ) -> Result<(), SyncError> {
        for change in changes {
            match change.kind {
                ChangeKind::Add => {
                    let record = required(target, change, change.value.as_ref(), "value")?;
                    let resolution =
                        self.resolve_record(pass, record, Some((target, &EdgeRole::Member)))?;
                    let member = pending_or_ready(pass, target, resolution, || PendingSlot::Member {
                        set: set.clone(),
                    });
                    set.insert(member);
                }
                ChangeKind::Delete => {
                    let member = match (&change.value_id, &change.value) {
                        (Some(id), _) => {
                            let member = self.registered(id)?;
                            self.retract_child(pass, target, &member, &EdgeRole::Member)?;
                            member
                        }
                        (None, Some(record)) => record.to_plain_value()?,
                        (None, None) => {
                            return Err(WireError::MissingChangeField {
                                context_id: target.clone(),
                                change: change.kind.name(),
                                field: "value",
                            }
                            .into());
                        }
                    };
                    set.remove(&member);
                }
                ChangeKind::Clear => {
                    for member in set.to_vec() {
                        self.retract_child(pass, target, &member, &EdgeRole::Member)?;
                    }
                    set.clear();
                }
                ChangeKind::Update => {
                    return Err(WireError::UnsupportedChange {
                        change: change.kind.name(),
                        kind: WireKind::Set,
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    pub(super) fn apply_mapping(
        &mut self,
        pass: &mut SyncPass,
        changed: &CollectionChanged,
    ) -> Result<(), SyncError> {
        let target = &changed.context_id;
        let value = self.target_collection(target, WireKind::Mapping)?;
        let Some(mapping) = value.as_mapping().cloned() else {
            return Ok(());
        };
        self.step_collection(target, &value, ObserverStep::Apply)?;
        let result = self.apply_mapping_changes(pass, target, &mapping, &changed.changes);
        self.settle_collection(target, &value, result)
    }

    fn apply_mapping_changes(
        &mut self,
        pass: &mut SyncPass,
        target: &ContextId,
        mapping: &MappingRef,
        changes: &[CollectionChange],
    ) -> Result<(), SyncError> {
        for change in changes {
            match change.kind {
                ChangeKind::Add => {
                    let key = required(target, change, change.key.as_ref(), "key")?;
                    let value = required(target, change, change.value.as_ref(), "value")?;
                    self.insert_entry(pass, target, mapping, key, value)?;
                }
                ChangeKind::Update => {
                    let key = self.addressed_key(target, change)?;
                    if let Some(old) = mapping.get(&key) {
                        self.retract_child(pass, target, &old, &EdgeRole::Value)?;
                    }
                    let record = required(target, change, change.value.as_ref(), "value")?;
                    let resolution =
                        self.resolve_record(pass, record, Some((target, &EdgeRole::Value)))?;
                    let value = pending_or_ready(pass, target, resolution, || PendingSlot::Value {
                        mapping: mapping.clone(),
                    });
                    mapping.insert(key, value);
                }
                ChangeKind::Delete => {
                    let key = self.addressed_key(target, change)?;
                    if let Some(old) = mapping.remove(&key) {
                        self.retract_child(pass, target, &key, &EdgeRole::Key)?;
                        self.retract_child(pass, target, &old, &EdgeRole::Value)?;
                    }
                }
                ChangeKind::Clear => {
                    for (key, value) in mapping.clear() {
                        self.retract_child(pass, target, &key, &EdgeRole::Key)?;
                        self.retract_child(pass, target, &value, &EdgeRole::Value)?;
                    }
                }
            }
        }
        Ok(())
    }

    // The existing key a change refers to
    fn addressed_key(&self, target: &ContextId, change: &CollectionChange) -> Result<Value, SyncError> {
        if let Some(id) = &change.key_id {
            return self.registered(id);
        }
        let record = required(target, change, change.key.as_ref(), "key")?;
        match &record.context_id {
            Some(id) if record.kind.is_tracked() => self.registered(id),
            _ => Ok(record.to_plain_value()?),
        }
    }
}

fn required<'a>(
    target: &ContextId,
    change: &CollectionChange,
    record: Option<&'a WireRecord>,
    field: &'static str,
) -> Result<&'a WireRecord, WireError> {
    record.ok_or_else(|| WireError::MissingChangeField {
        context_id: target.clone(),
        change: change.kind.name(),
        field,
    })
}
