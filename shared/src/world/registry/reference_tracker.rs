use std::collections::{HashMap, HashSet, VecDeque};

use crate::{
    types::ContextId,
    world::registry::{
        child_reference::{ChildReference, EdgeRole, RoleFault},
        error::RegistryError,
        identity_registry::IdentityRegistry,
    },
};

// Edge bookkeeping. Both sides of an edge (the parent's `children` entry and
// the child's `parents` entry) hold the same ChildReference and are always
// written together.
impl IdentityRegistry {
    pub fn add_edge(
        &mut self,
        parent: &ContextId,
        child: &ContextId,
        role: &EdgeRole,
    ) -> Result<(), RegistryError> {
        self.try_binding(child)?;
        let mut reference = self
            .try_binding(parent)?
            .children
            .get(child)
            .cloned()
            .unwrap_or_else(|| ChildReference::for_role(role));

        reference.add(role).map_err(|fault| edge_error(fault, parent, child, role))?;
        self.write_edge(parent, child, Some(reference))
    }

    /// Retracts one role from an edge. Returns true if that removed the edge.
    pub fn remove_edge(
        &mut self,
        parent: &ContextId,
        child: &ContextId,
        role: &EdgeRole,
    ) -> Result<bool, RegistryError> {
        let Some(mut reference) = self.try_binding(parent)?.children.get(child).cloned() else {
            return Err(edge_error(RoleFault::NotFound, parent, child, role));
        };

        let emptied = reference
            .retract(role)
            .map_err(|fault| edge_error(fault, parent, child, role))?;
        self.write_edge(parent, child, (!emptied).then_some(reference))?;
        Ok(emptied)
    }

    /// Removes an edge whatever roles it carries
    pub fn drop_edge(&mut self, parent: &ContextId, child: &ContextId) -> Result<(), RegistryError> {
        self.write_edge(parent, child, None)
    }

    pub fn has_edge(&self, parent: &ContextId, child: &ContextId) -> bool {
        self.binding(parent)
            .is_some_and(|binding| binding.children.contains_key(child))
    }

    /// Whether anything other than the value itself refers to it
    pub fn has_parents(&self, id: &ContextId) -> bool {
        self.binding(id)
            .is_some_and(|binding| binding.parents.keys().any(|parent| parent != id))
    }

    /// Re-numbers the index slots of a sequence's children after a splice,
    /// returning the children that are no longer referenced by it
    pub fn shift_sequence_slots(
        &mut self,
        sequence: &ContextId,
        index: usize,
        removed: usize,
        added: usize,
    ) -> Result<Vec<ContextId>, RegistryError> {
        let children: Vec<(ContextId, ChildReference)> = self
            .try_binding(sequence)?
            .children
            .iter()
            .map(|(child, reference)| (child.clone(), reference.clone()))
            .collect();

        let mut dropped = Vec::new();
        for (child, mut reference) in children {
            reference.shift_indices(index, removed, added);
            if reference.is_empty() {
                self.write_edge(sequence, &child, None)?;
                dropped.push(child);
            } else {
                self.write_edge(sequence, &child, Some(reference))?;
            }
        }
        Ok(dropped)
    }

    /// Splits `candidates` and everything reachable from them into live and
    /// garbage identifiers, returning the garbage.
    ///
    /// A node of that closure is alive if it is a root, if some parent
    /// outside the closure refers to it, or if a live node of the closure
    /// refers to it. Anything else (including cycles) is unreachable.
    pub fn collect_unreachable(&self, candidates: &[ContextId]) -> Vec<ContextId> {
        let mut seen: HashSet<ContextId> = HashSet::new();
        let mut order: Vec<ContextId> = Vec::new();
        let mut queue: VecDeque<ContextId> = VecDeque::new();

        for candidate in candidates {
            if self.contains(candidate) && seen.insert(candidate.clone()) {
                queue.push_back(candidate.clone());
            }
        }
        while let Some(id) = queue.pop_front() {
            order.push(id.clone());
            let Some(binding) = self.binding(&id) else {
                continue;
            };
            for child in binding.children.keys() {
                if self.contains(child) && seen.insert(child.clone()) {
                    queue.push_back(child.clone());
                }
            }
        }

        let mut alive: HashSet<ContextId> = HashSet::new();
        let mut queue: VecDeque<ContextId> = order
            .iter()
            .filter(|id| {
                self.binding(id).is_some_and(|binding| {
                    binding.is_root() || binding.parents.keys().any(|parent| !seen.contains(parent))
                })
            })
            .cloned()
            .collect();
        while let Some(id) = queue.pop_front() {
            if !alive.insert(id.clone()) {
                continue;
            }
            if let Some(binding) = self.binding(&id) {
                for child in binding.children.keys() {
                    if seen.contains(child) && !alive.contains(child) {
                        queue.push_back(child.clone());
                    }
                }
            }
        }

        order.into_iter().filter(|id| !alive.contains(id)).collect()
    }

    /// Every edge of the registry as `parent -> child -> reference`
    pub fn edges(&self) -> HashMap<ContextId, HashMap<ContextId, ChildReference>> {
        self.ids()
            .filter_map(|id| {
                self.binding(id)
                    .map(|binding| (id.clone(), binding.children.clone()))
            })
            .collect()
    }

    fn write_edge(
        &mut self,
        parent: &ContextId,
        child: &ContextId,
        reference: Option<ChildReference>,
    ) -> Result<(), RegistryError> {
        self.try_binding(child)?;
        let parent_binding = self.try_binding_mut(parent)?;
        match &reference {
            Some(reference) => {
                parent_binding.children.insert(child.clone(), reference.clone());
            }
            None => {
                parent_binding.children.remove(child);
            }
        }

        let child_binding = self.try_binding_mut(child)?;
        match reference {
            Some(reference) => {
                child_binding.parents.insert(parent.clone(), reference);
            }
            None => {
                child_binding.parents.remove(parent);
            }
        }
        Ok(())
    }
}

fn edge_error(fault: RoleFault, parent: &ContextId, child: &ContextId, role: &EdgeRole) -> RegistryError {
    match fault {
        RoleFault::Mismatch => RegistryError::RoleMismatch {
            parent: parent.clone(),
            child: child.clone(),
            role: role.to_string(),
        },
        RoleFault::NotFound => RegistryError::EdgeNotFound {
            parent: parent.clone(),
            child: child.clone(),
            role: role.to_string(),
        },
    }
}
