use crate::{
    types::ContextId,
    world::{
        observer::{error::ObserverError, state::ObserverState},
        wire::WireKind,
    },
};

/// Watches the structure of one registered sequence, set or mapping
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectionObserver {
    target: ContextId,
    kind: WireKind,
    state: ObserverState,
}

impl CollectionObserver {
    pub fn new(target: &ContextId, kind: WireKind) -> Self {
        Self {
            target: target.clone(),
            kind,
            state: ObserverState::Idle,
        }
    }

    pub fn target(&self) -> &ContextId {
        &self.target
    }

    pub fn kind(&self) -> WireKind {
        self.kind
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
