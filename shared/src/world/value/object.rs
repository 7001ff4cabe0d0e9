use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

use indexmap::IndexMap;

use crate::world::{
    observer::{
        change_record::ChangeRecord,
        mut_channel::{record_all, MutChannel, Mutator, MutatorSet},
    },
    value::Value,
};

/// Whether a declared field travels to the other side
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldMode {
    Synced,
    /// Never observed or encoded, e.g. caches and internal bookkeeping
    Local,
}

/// Statically declared field manifest for one object type.
///
/// Objects built without a schema synchronize every field they hold. Objects
/// built with one synchronize only the fields declared [`FieldMode::Synced`];
/// undeclared fields are treated as local.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectSchema {
    name: String,
    fields: Vec<(String, FieldMode)>,
}

impl ObjectSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn synced(mut self, field: impl Into<String>) -> Self {
        self.declare(field.into(), FieldMode::Synced);
        self
    }

    pub fn local(mut self, field: impl Into<String>) -> Self {
        self.declare(field.into(), FieldMode::Local);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self, field: &str) -> Option<FieldMode> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, mode)| *mode)
    }

    pub fn is_synced(&self, field: &str) -> bool {
        self.mode(field) == Some(FieldMode::Synced)
    }

    fn declare(&mut self, field: String, mode: FieldMode) {
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => *existing = mode,
            None => self.fields.push((field, mode)),
        }
    }
}

pub type ChangeHook = Rc<dyn Fn(&Value, &Value)>;

/// Hooks owed for one assignment, run later with [`HookCall::run`]
pub(crate) struct HookCall {
    hooks: Vec<ChangeHook>,
    new: Value,
    old: Value,
}

impl HookCall {
    pub fn run(self) {
        for hook in self.hooks {
            hook(&self.new, &self.old);
        }
    }
}

struct ObjectData {
    schema: Option<Rc<ObjectSchema>>,
    fields: IndexMap<String, Value>,
    hooks: HashMap<String, Vec<ChangeHook>>,
    mutators: MutatorSet,
}

impl ObjectData {
    fn is_synced(&self, field: &str) -> bool {
        match &self.schema {
            Some(schema) => schema.is_synced(field),
            None => true,
        }
    }
}

/// Shared handle to a structured object: named fields holding values
#[derive(Clone)]
pub struct ObjectRef {
    inner: Rc<RefCell<ObjectData>>,
}

impl ObjectRef {
    pub fn new() -> Self {
        Self::build(None)
    }

    pub fn with_schema(schema: ObjectSchema) -> Self {
        Self::build(Some(Rc::new(schema)))
    }

    pub fn from_fields<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let object = Self::new();
        {
            let mut data = object.inner.borrow_mut();
            for (name, value) in fields {
                data.fields.insert(name.into(), value.into());
            }
        }
        object
    }

    fn build(schema: Option<Rc<ObjectSchema>>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObjectData {
                schema,
                fields: IndexMap::new(),
                hooks: HashMap::new(),
                mutators: MutatorSet::default(),
            })),
        }
    }

    pub fn schema_name(&self) -> Option<String> {
        self.inner
            .borrow()
            .schema
            .as_ref()
            .map(|schema| schema.name().to_string())
    }

    /// Value of `field`, `Value::Null` when unset
    pub fn get(&self, field: &str) -> Value {
        self.inner
            .borrow()
            .fields
            .get(field)
            .cloned()
            .unwrap_or(Value::Null)
    }

    pub fn has(&self, field: &str) -> bool {
        self.inner.borrow().fields.contains_key(field)
    }

    pub fn is_synced(&self, field: &str) -> bool {
        self.inner.borrow().is_synced(field)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().fields.is_empty()
    }

    /// Every field, in assignment order
    pub fn fields(&self) -> Vec<(String, Value)> {
        self.inner
            .borrow()
            .fields
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Fields that travel to the other side, in assignment order
    pub fn synced_fields(&self) -> Vec<(String, Value)> {
        let data = self.inner.borrow();
        data.fields
            .iter()
            .filter(|(name, _)| data.is_synced(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Assigns `field`, returning the previous value.
    ///
    /// Assigning a value equal to the current one is a no-op. Otherwise
    /// attached mutators record the change (synced fields only) and the
    /// field's hooks run with `(new, old)`.
    pub fn set(&self, field: impl Into<String>, value: impl Into<Value>) -> Value {
        let field = field.into();
        let value = value.into();
        let old = self.get(&field);
        if let Some(call) = self.assign(&field, value) {
            call.run();
        }
        old
    }

    /// Like [`set`](Self::set), but hands back the hooks instead of running
    /// them. `None` when the assignment changed nothing.
    pub(crate) fn assign(&self, field: &str, value: Value) -> Option<HookCall> {
        let old = self.get(field);
        if old == value {
            return None;
        }
        self.inner
            .borrow_mut()
            .fields
            .insert(field.to_string(), value.clone());
        Some(self.record_change(field, old, value))
    }

    /// Registers a callback for changes to `field`, local or remote
    pub fn on_change(&self, field: impl Into<String>, hook: impl Fn(&Value, &Value) + 'static) {
        self.inner
            .borrow_mut()
            .hooks
            .entry(field.into())
            .or_default()
            .push(Rc::new(hook));
    }

    /// Writes without recording or running hooks
    pub(crate) fn put_raw(&self, field: &str, value: Value) -> Value {
        self.inner
            .borrow_mut()
            .fields
            .insert(field.to_string(), value)
            .unwrap_or(Value::Null)
    }

    /// Records `old -> new` for `field` as if it had just been assigned,
    /// returning the hooks owed for it
    pub(crate) fn record_change(&self, field: &str, old: Value, new: Value) -> HookCall {
        let (mutators, hooks) = {
            let data = self.inner.borrow();
            let mutators = if data.is_synced(field) {
                data.mutators.snapshot()
            } else {
                Vec::new()
            };
            let hooks = data.hooks.get(field).cloned().unwrap_or_default();
            (mutators, hooks)
        };

        record_all(
            mutators,
            ChangeRecord::Property {
                field: field.to_string(),
                old: old.clone(),
                new: new.clone(),
            },
        );

        HookCall { hooks, new, old }
    }

    pub(crate) fn attach_mutator(&self, mutator: Mutator) {
        self.inner.borrow_mut().mutators.attach(mutator);
    }

    pub(crate) fn detach_mutator(&self, channel: &MutChannel) {
        self.inner.borrow_mut().mutators.detach(channel);
    }

    pub(crate) fn is_attached(&self, channel: &MutChannel) -> bool {
        self.inner.borrow().mutators.is_attached(channel)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.inner) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for ObjectRef {
    fn default() -> Self {
        Self::new()
    }
}

// Shallow: fields may point back at this object
impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.inner.borrow();
        f.debug_struct("ObjectRef")
            .field("addr", &format_args!("{:#x}", self.addr()))
            .field("fields", &data.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}
