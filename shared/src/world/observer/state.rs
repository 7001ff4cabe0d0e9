use crate::world::observer::error::ObserverError;

/// Lifecycle of one observer.
///
/// `Idle -> Observing`, then either `Observing -> Publishing -> Observing`
/// for a local change or `Observing -> Applying -> Observing` for a remote
/// one. Releasing returns to `Idle` from anywhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObserverState {
    Idle,
    Observing,
    Publishing,
    Applying,
}

impl ObserverState {
    pub fn name(&self) -> &'static str {
        match self {
            ObserverState::Idle => "Idle",
            ObserverState::Observing => "Observing",
            ObserverState::Publishing => "Publishing",
            ObserverState::Applying => "Applying",
        }
    }

    pub(crate) fn try_transition(
        &mut self,
        from: &[ObserverState],
        to: ObserverState,
        operation: &'static str,
    ) -> Result<(), ObserverError> {
        if !from.contains(self) {
            return Err(ObserverError::InvalidStateTransition {
                from_state: self.name(),
                to_state: to.name(),
                operation,
            });
        }
        *self = to;
        Ok(())
    }

    pub(crate) fn try_arm(&mut self) -> Result<(), ObserverError> {
        self.try_transition(&[ObserverState::Idle], ObserverState::Observing, "arm")
    }

    pub(crate) fn try_begin_publish(&mut self) -> Result<(), ObserverError> {
        self.try_transition(
            &[ObserverState::Observing],
            ObserverState::Publishing,
            "publish a local change",
        )
    }

    pub(crate) fn try_begin_apply(&mut self) -> Result<(), ObserverError> {
        self.try_transition(
            &[ObserverState::Observing],
            ObserverState::Applying,
            "apply a remote change",
        )
    }

    pub(crate) fn try_settle(&mut self) -> Result<(), ObserverError> {
        self.try_transition(
            &[ObserverState::Publishing, ObserverState::Applying],
            ObserverState::Observing,
            "settle",
        )
    }

    pub(crate) fn release(&mut self) {
        *self = ObserverState::Idle;
    }
}
