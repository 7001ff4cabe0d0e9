use serde::{Deserialize, Serialize};

use crate::{types::ContextId, world::wire::WireRecord};

/// Kind of one set or mapping change
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Add,
    Delete,
    Clear,
    Update,
}

impl ChangeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ChangeKind::Add => "add",
            ChangeKind::Delete => "delete",
            ChangeKind::Clear => "clear",
            ChangeKind::Update => "update",
        }
    }
}

/// One structural change to a set or mapping.
///
/// Sets use `value` (add, or delete of a scalar member) and `value_id`
/// (delete of a tracked member). Mappings use `key`/`value` for add and
/// update, and `key` or `key_id` to address the entry on delete.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionChange {
    pub kind: ChangeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<WireRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<WireRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_id: Option<ContextId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<ContextId>,
}

impl CollectionChange {
    pub fn new(kind: ChangeKind) -> Self {
        Self {
            kind,
            key: None,
            value: None,
            value_id: None,
            key_id: None,
        }
    }

    pub fn records(&self) -> impl Iterator<Item = &WireRecord> {
        self.key.iter().chain(self.value.iter())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionChanged {
    pub context_id: ContextId,
    pub changes: Vec<CollectionChange>,
}

/// One splice on a sequence: remove `removed_count` at `index`, then insert
/// `added_records` there
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpliceBatch {
    pub index: usize,
    pub removed_count: usize,
    #[serde(default)]
    pub added_records: Vec<WireRecord>,
}

/// Everything that travels between two synchronizers
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum SyncMessage {
    RootSnapshot {
        name: String,
        record: WireRecord,
    },
    RootReleased {
        name: String,
    },
    PropertyChanged(WireRecord),
    #[serde(rename_all = "camelCase")]
    SequenceChanged {
        context_id: ContextId,
        batches: Vec<SpliceBatch>,
    },
    SetChanged(CollectionChanged),
    MappingChanged(CollectionChanged),
}

impl SyncMessage {
    pub fn name(&self) -> &'static str {
        match self {
            SyncMessage::RootSnapshot { .. } => "root-snapshot",
            SyncMessage::RootReleased { .. } => "root-released",
            SyncMessage::PropertyChanged(_) => "property-changed",
            SyncMessage::SequenceChanged { .. } => "sequence-changed",
            SyncMessage::SetChanged(_) => "set-changed",
            SyncMessage::MappingChanged(_) => "mapping-changed",
        }
    }

    /// Every top-level wire record the message carries
    pub fn records(&self) -> Vec<&WireRecord> {
        match self {
            SyncMessage::RootSnapshot { record, .. } => vec![record],
            SyncMessage::RootReleased { .. } => Vec::new(),
            SyncMessage::PropertyChanged(record) => vec![record],
            SyncMessage::SequenceChanged { batches, .. } => batches
                .iter()
                .flat_map(|batch| batch.added_records.iter())
                .collect(),
            SyncMessage::SetChanged(changed) | SyncMessage::MappingChanged(changed) => changed
                .changes
                .iter()
                .flat_map(CollectionChange::records)
                .collect(),
        }
    }
}
