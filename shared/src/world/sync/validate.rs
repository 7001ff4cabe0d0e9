use std::collections::HashMap;

use crate::{
    messages::{ChangeKind, CollectionChange, CollectionChanged, SyncMessage},
    types::ContextId,
    world::{
        registry::RegistryError,
        remote::ResolveError,
        sync::{error::SyncError, synchronizer::Synchronizer},
        value::Value,
        wire::{WireError, WireKind, WireRecord},
    },
};

impl Synchronizer {
    /// Checks an incoming message against the mirror before any of it is
    /// applied: targets exist and have the right kind, records are well
    /// formed, and every reference resolves within the message.
    pub(super) fn validate_message(&self, message: &SyncMessage) -> Result<(), SyncError> {
        let owner = match message {
            SyncMessage::RootSnapshot { name, record } => {
                if self.roots.contains_key(name) {
                    return Err(SyncError::RootAlreadyObserved { name: name.clone() });
                }
                if !record.kind.is_tracked() {
                    return Err(WireError::UnexpectedPayload {
                        kind: record.kind,
                        property: record.property.clone(),
                        detail: "roots must be containers",
                    }
                    .into());
                }
                None
            }
            SyncMessage::RootReleased { name } => {
                if !self.roots.contains_key(name) {
                    return Err(SyncError::RootNotFound { name: name.clone() });
                }
                None
            }
            SyncMessage::PropertyChanged(record) => {
                let Some(owner) = &record.parent_id else {
                    return Err(WireError::MissingParentId {
                        property: record.property.clone(),
                    }
                    .into());
                };
                self.expect_target(owner, WireKind::StructuredObject)?;
                Some(owner)
            }
            SyncMessage::SequenceChanged {
                context_id,
                batches,
            } => {
                let value = self.expect_target(context_id, WireKind::Sequence)?;
                let mut len = value.as_sequence().map(|sequence| sequence.len()).unwrap_or(0);
                for batch in batches {
                    if batch.index > len || batch.index + batch.removed_count > len {
                        return Err(WireError::SpliceOutOfBounds {
                            context_id: context_id.clone(),
                            index: batch.index,
                            removed_count: batch.removed_count,
                            len,
                        }
                        .into());
                    }
                    len = len - batch.removed_count + batch.added_records.len();
                }
                Some(context_id)
            }
            SyncMessage::SetChanged(changed) => {
                self.expect_target(&changed.context_id, WireKind::Set)?;
                for change in &changed.changes {
                    self.validate_set_change(changed, change)?;
                }
                Some(&changed.context_id)
            }
            SyncMessage::MappingChanged(changed) => {
                self.expect_target(&changed.context_id, WireKind::Mapping)?;
                for change in &changed.changes {
                    self.validate_mapping_change(changed, change)?;
                }
                Some(&changed.context_id)
            }
        };

        let records = message.records();
        for record in &records {
            record.validate()?;
        }
        self.validate_references(owner, &records)
    }

    fn expect_target(&self, id: &ContextId, expected: WireKind) -> Result<Value, SyncError> {
        let value = self
            .registry
            .get_context_by_id(id)
            .cloned()
            .ok_or_else(|| RegistryError::MissingBinding {
                context_id: id.clone(),
            })?;
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

    fn validate_set_change(
        &self,
        changed: &CollectionChanged,
        change: &CollectionChange,
    ) -> Result<(), SyncError> {
        match change.kind {
            ChangeKind::Add => missing(changed, change, change.value.is_none(), "value"),
            ChangeKind::Delete => {
                missing(
                    changed,
                    change,
                    change.value.is_none() && change.value_id.is_none(),
                    "value",
                )?;
                self.expect_known(change.value_id.as_ref())
            }
            ChangeKind::Clear => Ok(()),
            ChangeKind::Update => Err(WireError::UnsupportedChange {
                change: change.kind.name(),
                kind: WireKind::Set,
            }
            .into()),
        }
    }

    fn validate_mapping_change(
        &self,
        changed: &CollectionChanged,
        change: &CollectionChange,
    ) -> Result<(), SyncError> {
        match change.kind {
            ChangeKind::Add => {
                missing(changed, change, change.key.is_none(), "key")?;
                missing(changed, change, change.value.is_none(), "value")
            }
            ChangeKind::Update => {
                missing(
                    changed,
                    change,
                    change.key.is_none() && change.key_id.is_none(),
                    "key",
                )?;
                missing(changed, change, change.value.is_none(), "value")?;
                self.expect_known(change.key_id.as_ref())
            }
            ChangeKind::Delete => {
                missing(
                    changed,
                    change,
                    change.key.is_none() && change.key_id.is_none(),
                    "key",
                )?;
                self.expect_known(change.key_id.as_ref())
            }
            ChangeKind::Clear => Ok(()),
        }
    }

    fn expect_known(&self, id: Option<&ContextId>) -> Result<(), SyncError> {
        match id {
            Some(id) if !self.registry.contains(id) => Err(RegistryError::MissingBinding {
                context_id: id.clone(),
            }
            .into()),
            _ => Ok(()),
        }
    }

    // Every reference must point at a container the mirror holds or one the
    // message itself introduces, and agree with its kind
    fn validate_references(
        &self,
        owner: Option<&ContextId>,
        records: &[&WireRecord],
    ) -> Result<(), SyncError> {
        let mut introduced: HashMap<&ContextId, WireKind> = HashMap::new();
        let mut references: Vec<&WireRecord> = Vec::new();
        for record in records {
            collect_records(record, &mut introduced, &mut references);
        }

        for (id, kind) in &introduced {
            self.expect_kind(id, *kind)?;
        }
        for reference in references {
            let Some(id) = &reference.context_id else {
                continue;
            };
            if self.registry.contains(id) {
                self.expect_kind(id, reference.kind)?;
                continue;
            }
            match introduced.get(id) {
                Some(kind) if *kind == reference.kind => {}
                Some(kind) => {
                    return Err(WireError::KindMismatch {
                        context_id: id.clone(),
                        expected: reference.kind,
                        found: *kind,
                    }
                    .into());
                }
                None => {
                    let owner = reference.parent_id.as_ref().or(owner).unwrap_or(id);
                    return Err(ResolveError::UnresolvedReference {
                        owner: owner.clone(),
                        ref_id: id.clone(),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    fn expect_kind(&self, id: &ContextId, expected: WireKind) -> Result<(), SyncError> {
        match self.registry.get_context_by_id(id) {
            Some(value) if value.kind() != expected => Err(WireError::KindMismatch {
                context_id: id.clone(),
                expected,
                found: value.kind(),
            }
            .into()),
            _ => Ok(()),
        }
    }
}

fn collect_records<'a>(
    record: &'a WireRecord,
    introduced: &mut HashMap<&'a ContextId, WireKind>,
    references: &mut Vec<&'a WireRecord>,
) {
    if record.is_stub() {
        references.push(record);
    } else if let (true, Some(id)) = (record.kind.is_tracked(), &record.context_id) {
        introduced.insert(id, record.kind);
    }
    for child in record.all_children() {
        collect_records(child, introduced, references);
    }
}

fn missing(
    changed: &CollectionChanged,
    change: &CollectionChange,
    absent: bool,
    field: &'static str,
) -> Result<(), SyncError> {
    if absent {
        return Err(WireError::MissingChangeField {
            context_id: changed.context_id.clone(),
            change: change.kind.name(),
            field,
        }
        .into());
    }
    Ok(())
}
