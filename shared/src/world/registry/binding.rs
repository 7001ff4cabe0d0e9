use std::collections::HashMap;

use crate::{
    types::ContextId,
    world::{
        observer::{CollectionObserver, PropertyObserver},
        registry::child_reference::ChildReference,
        wire::WireKind,
    },
};

/// Per-identifier bookkeeping held by the registry
#[derive(Clone, Debug)]
pub struct BindingRecord {
    kind: WireKind,
    root: bool,
    observed: bool,
    property_observers: Vec<PropertyObserver>,
    collection_observer: Option<CollectionObserver>,
    pub(crate) parents: HashMap<ContextId, ChildReference>,
    pub(crate) children: HashMap<ContextId, ChildReference>,
}

impl BindingRecord {
    pub fn new(kind: WireKind) -> Self {
        Self {
            kind,
            root: false,
            observed: false,
            property_observers: Vec::new(),
            collection_observer: None,
            parents: HashMap::new(),
            children: HashMap::new(),
        }
    }

    pub fn kind(&self) -> WireKind {
        self.kind
    }

    pub fn is_root(&self) -> bool {
        self.root
    }

    pub(crate) fn set_root(&mut self, root: bool) {
        self.root = root;
    }

    pub fn parents(&self) -> &HashMap<ContextId, ChildReference> {
        &self.parents
    }

    pub fn children(&self) -> &HashMap<ContextId, ChildReference> {
        &self.children
    }

    pub fn property_observers(&self) -> &[PropertyObserver] {
        &self.property_observers
    }

    pub fn property_observer(&self, field: &str) -> Option<&PropertyObserver> {
        self.property_observers
            .iter()
            .find(|observer| observer.field() == field)
    }

    pub fn property_observer_mut(&mut self, field: &str) -> Option<&mut PropertyObserver> {
        self.property_observers
            .iter_mut()
            .find(|observer| observer.field() == field)
    }

    pub(crate) fn add_property_observer(&mut self, observer: PropertyObserver) -> &mut PropertyObserver {
        let index = match self
            .property_observers
            .iter()
            .position(|existing| existing.field() == observer.field())
        {
            Some(index) => {
                self.property_observers[index] = observer;
                index
            }
            None => {
                self.property_observers.push(observer);
                self.property_observers.len() - 1
            }
        };
        &mut self.property_observers[index]
    }

    pub fn collection_observer(&self) -> Option<&CollectionObserver> {
        self.collection_observer.as_ref()
    }

    pub fn collection_observer_mut(&mut self) -> Option<&mut CollectionObserver> {
        self.collection_observer.as_mut()
    }

    pub(crate) fn set_collection_observer(&mut self, observer: CollectionObserver) -> &mut CollectionObserver {
        self.collection_observer.insert(observer)
    }

    /// Whether the value's mutations are being recorded
    pub fn is_observed(&self) -> bool {
        self.observed
    }

    pub(crate) fn set_observed(&mut self) {
        self.observed = true;
    }

    pub(crate) fn release_observers(&mut self) {
        self.observed = false;
        for observer in &mut self.property_observers {
            observer.release();
        }
        if let Some(observer) = &mut self.collection_observer {
            observer.release();
        }
    }
}
