use crate::{
    types::ContextId,
    world::observer::{error::ObserverError, state::ObserverState},
};

/// Watches one synchronized field of one registered object
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyObserver {
    owner: ContextId,
    field: String,
    state: ObserverState,
}

impl PropertyObserver {
    pub fn new(owner: &ContextId, field: &str) -> Self {
        Self {
            owner: owner.clone(),
            field: field.to_string(),
            state: ObserverState::Idle,
        }
    }

    pub fn owner(&self) -> &ContextId {
        &self.owner
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn state(&self) -> ObserverState {
        self.state
    }

    pub fn is_observing(&self) -> bool {
        self.state != ObserverState::Idle
    }

    pub fn try_arm(&mut self) -> Result<(), ObserverError> {
        self.state.try_arm()
    }

    pub fn try_begin_publish(&mut self) -> Result<(), ObserverError> {
        self.state.try_begin_publish()
    }

    pub fn try_begin_apply(&mut self) -> Result<(), ObserverError> {
        self.state.try_begin_apply()
    }

    /// Back to `Observing` once a publish or apply is done, whether or not
    /// it succeeded
    pub fn try_settle(&mut self) -> Result<(), ObserverError> {
        self.state.try_settle()
    }

    pub fn release(&mut self) {
        self.state.release();
    }
}
