use std::collections::HashMap;

use crate::{
    types::{ContextId, HostType},
    world::{
        registry::{binding::BindingRecord, child_reference::EdgeRole, error::RegistryError},
        value::Value,
    },
};

/// Outcome of [`IdentityRegistry::resolve_id`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolved {
    pub id: ContextId,
    /// True when the value was not registered before this call
    pub newly_registered: bool,
}

/// Bidirectional map between live containers and their identifiers.
///
/// The registry holds one handle per registered value, so a registered
/// value's allocation (and therefore its identity) stays stable until it
/// is unregistered.
pub struct IdentityRegistry {
    host_type: HostType,
    values: HashMap<ContextId, Value>,
    ids: HashMap<usize, ContextId>,
    bindings: HashMap<ContextId, BindingRecord>,
}

impl IdentityRegistry {
    pub fn new(host_type: HostType) -> Self {
        Self {
            host_type,
            values: HashMap::new(),
            ids: HashMap::new(),
            bindings: HashMap::new(),
        }
    }

    pub fn host_type(&self) -> HostType {
        self.host_type
    }

    /// Returns the identifier of `value`, registering it first if needed.
    ///
    /// `id` is used for a new registration (a generated one otherwise) and
    /// must agree with an existing one. `parent` records the edge through
    /// which `value` was reached.
    pub fn resolve_id(
        &mut self,
        value: &Value,
        id: Option<ContextId>,
        parent: Option<(&ContextId, &EdgeRole)>,
    ) -> Result<Resolved, RegistryError> {
        let Some(addr) = value.identity() else {
            return Err(RegistryError::NotTrackable { kind: value.kind() });
        };

        let resolved = match self.ids.get(&addr) {
            Some(existing) => {
                if id.as_ref().is_some_and(|requested| requested != existing) {
                    return Err(RegistryError::IdentifierConflict {
                        context_id: existing.clone(),
                        detail: "value is already registered under another identifier",
                    });
                }
                Resolved {
                    id: existing.clone(),
                    newly_registered: false,
                }
            }
            None => {
                let id = id.unwrap_or_else(|| ContextId::generate(self.host_type));
                if self.values.contains_key(&id) {
                    return Err(RegistryError::IdentifierConflict {
                        context_id: id,
                        detail: "identifier is already bound to another value",
                    });
                }
                self.ids.insert(addr, id.clone());
                self.values.insert(id.clone(), value.clone());
                self.bindings.insert(id.clone(), BindingRecord::new(value.kind()));
                Resolved {
                    id,
                    newly_registered: true,
                }
            }
        };

        if let Some((parent_id, role)) = parent {
            self.add_edge(parent_id, &resolved.id, role)?;
        }

        Ok(resolved)
    }

    pub fn get_context_by_id(&self, id: &ContextId) -> Option<&Value> {
        self.values.get(id)
    }

    pub fn get_id_by_context(&self, value: &Value) -> Option<&ContextId> {
        self.ids.get(&value.identity()?)
    }

    pub fn contains(&self, id: &ContextId) -> bool {
        self.values.contains_key(id)
    }

    pub fn binding(&self, id: &ContextId) -> Option<&BindingRecord> {
        self.bindings.get(id)
    }

    pub fn binding_mut(&mut self, id: &ContextId) -> Option<&mut BindingRecord> {
        self.bindings.get_mut(id)
    }

    pub fn try_binding(&self, id: &ContextId) -> Result<&BindingRecord, RegistryError> {
        self.bindings
            .get(id)
            .ok_or_else(|| RegistryError::MissingBinding {
                context_id: id.clone(),
            })
    }

    pub fn try_binding_mut(&mut self, id: &ContextId) -> Result<&mut BindingRecord, RegistryError> {
        self.bindings
            .get_mut(id)
            .ok_or_else(|| RegistryError::MissingBinding {
                context_id: id.clone(),
            })
    }

    pub fn ids(&self) -> impl Iterator<Item = &ContextId> {
        self.values.keys()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Drops the value and its binding, along with every edge touching it
    pub fn unregister(&mut self, id: &ContextId) -> Result<(Value, BindingRecord), RegistryError> {
        let binding = self
            .bindings
            .remove(id)
            .ok_or_else(|| RegistryError::MissingBinding {
                context_id: id.clone(),
            })?;
        let value = self
            .values
            .remove(id)
            .ok_or_else(|| RegistryError::MissingBinding {
                context_id: id.clone(),
            })?;
        if let Some(addr) = value.identity() {
            self.ids.remove(&addr);
        }

        for parent in binding.parents.keys() {
            if let Some(parent_binding) = self.bindings.get_mut(parent) {
                parent_binding.children.remove(id);
            }
        }
        for child in binding.children.keys() {
            if let Some(child_binding) = self.bindings.get_mut(child) {
                child_binding.parents.remove(id);
            }
        }

        Ok((value, binding))
    }

    /// Empties the registry, returning every value it held
    pub fn clear(&mut self) -> Vec<Value> {
        self.ids.clear();
        self.bindings.clear();
        self.values.drain().map(|(_, value)| value).collect()
    }
}
