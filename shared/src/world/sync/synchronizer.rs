use std::collections::{HashMap, VecDeque};

use log::{debug, info, trace, warn};

use crate::{
    messages::SyncMessage,
    types::ContextId,
    world::{
        observer::{ChangeRecord, MutChannel, Mutation},
        registry::{IdentityRegistry, RegistryError},
        remote::ResolveError,
        sync::{
            error::SyncError, pass::SyncPass, resolve::Resolution, sync_config::SyncConfig,
        },
        value::Value,
        wire::WireRecord,
    },
};

/// Keeps the graphs reachable from a set of named roots synchronized with
/// one peer.
///
/// Local mutations are recorded as they happen and turned into messages by
/// [`flush`](Self::flush). Incoming messages are validated, then applied
/// with local recording suppressed. Each message produced or received is
/// one pass: teardown of whatever became unreachable runs at the end of
/// every pass on both sides, so the two registries stay identical.
pub struct Synchronizer {
    pub(super) config: SyncConfig,
    pub(super) registry: IdentityRegistry,
    pub(super) channel: MutChannel,
    pub(super) roots: HashMap<String, ContextId>,
    outgoing: VecDeque<SyncMessage>,
}

impl Synchronizer {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            registry: IdentityRegistry::new(config.host_type),
            channel: MutChannel::new(),
            roots: HashMap::new(),
            outgoing: VecDeque::new(),
            config,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    pub fn id_of(&self, value: &Value) -> Option<ContextId> {
        self.registry.get_id_by_context(value).cloned()
    }

    /// Whether `value` is registered and its mutations are being recorded
    pub fn is_observed(&self, value: &Value) -> bool {
        self.registry
            .get_id_by_context(value)
            .and_then(|id| self.registry.binding(id))
            .is_some_and(|binding| binding.is_observed())
            && value.is_attached(&self.channel)
    }

    pub fn root(&self, name: &str) -> Option<Value> {
        let id = self.roots.get(name)?;
        self.registry.get_context_by_id(id).cloned()
    }

    pub fn root_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.roots.keys().cloned().collect();
        names.sort();
        names
    }

    /// Starts synchronizing `value` under `name`, queueing its snapshot
    pub fn observe_root(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<ContextId, SyncError> {
        let name = name.into();
        let value = value.into();
        if self.roots.contains_key(&name) {
            return Err(SyncError::RootAlreadyObserved { name });
        }
        if !value.is_tracked() {
            return Err(RegistryError::NotTrackable { kind: value.kind() }.into());
        }

        // changes made before this call travel first
        self.flush()?;

        let mut pass = SyncPass::new();
        let observed = self.observe_value(&mut pass, "", None, &value).and_then(|record| {
            let id = self.registry.resolve_id(&value, None, None)?.id;
            self.registry.try_binding_mut(&id)?.set_root(true);
            self.roots.insert(name.clone(), id.clone());
            Ok((id, record))
        });
        let finished = self.finish_pass(&mut pass);
        let (id, record) = observed?;
        finished?;

        info!("Observing root `{}` as {}", name, id);
        self.queue(SyncMessage::RootSnapshot { name, record });
        Ok(id)
    }

    /// Stops synchronizing the root `name`. Everything only reachable from
    /// it is torn down here and on the peer.
    pub fn release_root(&mut self, name: &str) -> Result<(), SyncError> {
        self.flush()?;

        let mut pass = SyncPass::new();
        self.unmark_root(&mut pass, name)?;
        self.finish_pass(&mut pass)?;

        info!("Released root `{}`", name);
        self.queue(SyncMessage::RootReleased {
            name: name.to_string(),
        });
        Ok(())
    }

    /// Turns recorded mutations into outgoing messages.
    ///
    /// Consecutive collection changes on the same container travel in one
    /// message. If publishing one change fails the rest are still
    /// published and the first error is returned.
    pub fn flush(&mut self) -> Result<(), SyncError> {
        let mut first_error = None;
        let mut mutations = self.channel.drain().into_iter().peekable();

        while let Some(Mutation { target, record }) = mutations.next() {
            let mut records = vec![record];
            if !matches!(records[0], ChangeRecord::Property { .. }) {
                while let Some(next) = mutations.peek() {
                    if next.target != target || !records[0].batches_with(&next.record) {
                        break;
                    }
                    if let Some(next) = mutations.next() {
                        records.push(next.record);
                    }
                }
            }

            let result = self.publish(&target, records);
            if let Err(error) = self.tolerate(result) {
                warn!("Failed to publish change on {}: {}", target, error);
                first_error.get_or_insert(error);
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    pub fn take_outgoing(&mut self) -> Vec<SyncMessage> {
        self.outgoing.drain(..).collect()
    }

    pub fn has_outgoing(&self) -> bool {
        !self.outgoing.is_empty()
    }

    /// Whether local mutations are waiting for [`flush`](Self::flush)
    pub fn has_pending_changes(&self) -> bool {
        self.channel.has_pending()
    }

    /// Applies one message from the peer.
    ///
    /// The message is validated before anything is touched, so a rejected
    /// message leaves the mirror as it was.
    pub fn receive(&mut self, message: SyncMessage) -> Result<(), SyncError> {
        self.log_message("Received", &message);
        let result = self.receive_message(message);
        self.tolerate(result)
    }

    fn receive_message(&mut self, message: SyncMessage) -> Result<(), SyncError> {
        self.validate_message(&message)?;

        let mut pass = SyncPass::new();
        let result = {
            let _suppressed = self.channel.suppress();
            let applied = self
                .apply_message(&mut pass, message)
                .and_then(|()| self.complete_pass(&mut pass));
            let finished = self.finish_pass(&mut pass);
            applied.and(finished)
        };

        // writes made by hooks are local changes and get published
        for call in pass.hooks.drain(..) {
            call.run();
        }
        result
    }

    fn apply_message(&mut self, pass: &mut SyncPass, message: SyncMessage) -> Result<(), SyncError> {
        match message {
            SyncMessage::RootSnapshot { name, record } => self.apply_root_snapshot(pass, name, &record),
            SyncMessage::RootReleased { name } => {
                self.unmark_root(pass, &name)?;
                info!("Peer released root `{}`", name);
                Ok(())
            }
            SyncMessage::PropertyChanged(record) => self.apply_property(pass, &record),
            SyncMessage::SequenceChanged {
                context_id,
                batches,
            } => self.apply_sequence(pass, &context_id, &batches),
            SyncMessage::SetChanged(changed) => self.apply_set(pass, &changed),
            SyncMessage::MappingChanged(changed) => self.apply_mapping(pass, &changed),
        }
    }

    fn apply_root_snapshot(
        &mut self,
        pass: &mut SyncPass,
        name: String,
        record: &WireRecord,
    ) -> Result<(), SyncError> {
        let id = match self.resolve_record(pass, record, None)? {
            Resolution::Ready(value) => self.id_of(&value).ok_or(RegistryError::NotTrackable {
                kind: value.kind(),
            })?,
            Resolution::Pending(ref_id) => {
                return Err(ResolveError::UnresolvedReference {
                    owner: ref_id.clone(),
                    ref_id,
                }
                .into());
            }
        };
        self.registry.try_binding_mut(&id)?.set_root(true);
        info!("Peer observes root `{}` as {}", name, id);
        self.roots.insert(name, id);
        Ok(())
    }

    fn publish(&mut self, target: &ContextId, records: Vec<ChangeRecord>) -> Result<(), SyncError> {
        let Some(value) = self.registry.get_context_by_id(target).cloned() else {
            debug!(
                "Dropping {} change for {}, no longer observed",
                records[0].name(),
                target
            );
            return Ok(());
        };

        let mut pass = SyncPass::new();
        let published = self.publish_records(&mut pass, target, &value, records);
        let finished = self.finish_pass(&mut pass);
        if let Some(message) = published? {
            self.log_message("Sending", &message);
            self.queue(message);
        }
        finished
    }

    fn publish_records(
        &mut self,
        pass: &mut SyncPass,
        target: &ContextId,
        value: &Value,
        records: Vec<ChangeRecord>,
    ) -> Result<Option<SyncMessage>, SyncError> {
        let mut records = records.into_iter();
        let Some(first) = records.next() else {
            return Ok(None);
        };

        match (value, first) {
            (Value::Object(_), ChangeRecord::Property { field, old, new }) => self
                .publish_property(pass, target, field, old, new)
                .map(Some),
            (Value::Sequence(_), first @ ChangeRecord::Splice { .. }) => self
                .publish_sequence(pass, target, std::iter::once(first).chain(records).collect())
                .map(Some),
            (Value::Set(_), first) if first.is_set_change() => self
                .publish_set(pass, target, std::iter::once(first).chain(records).collect())
                .map(Some),
            (Value::Mapping(_), first) if first.is_mapping_change() => self
                .publish_mapping(pass, target, std::iter::once(first).chain(records).collect())
                .map(Some),
            (_, first) => {
                warn!(
                    "Ignoring {} change recorded on {} {}",
                    first.name(),
                    value.kind(),
                    target
                );
                Ok(None)
            }
        }
    }

    fn unmark_root(&mut self, pass: &mut SyncPass, name: &str) -> Result<(), SyncError> {
        let id = self
            .roots
            .remove(name)
            .ok_or_else(|| SyncError::RootNotFound {
                name: name.to_string(),
            })?;
        if !self.roots.values().any(|other| *other == id) {
            self.registry.try_binding_mut(&id)?.set_root(false);
        }
        pass.retracted.push(id);
        Ok(())
    }

    fn queue(&mut self, message: SyncMessage) {
        self.outgoing.push_back(message);
    }

    /// Consistency errors are logged and swallowed unless configured strict
    pub(super) fn tolerate(&self, result: Result<(), SyncError>) -> Result<(), SyncError> {
        match result {
            Err(error) if !error.is_protocol_violation() && !self.config.strict_registry => {
                warn!("Skipping message: {}", error);
                Ok(())
            }
            other => other,
        }
    }

    fn log_message(&self, direction: &str, message: &SyncMessage) {
        if !self.config.log_messages {
            trace!("{} {}", direction, message.name());
            return;
        }
        match serde_json::to_string(message) {
            Ok(payload) => debug!("{} {}: {}", direction, message.name(), payload),
            Err(error) => debug!("{} {} (unprintable: {})", direction, message.name(), error),
        }
    }
}
