use std::collections::HashSet;

use crate::{
    types::ContextId,
    world::{remote::UnresolvedList, value::HookCall},
};

/// State scoped to one synchronization pass, i.e. one message produced or
/// one message received
#[derive(Default)]
pub(crate) struct SyncPass {
    /// Containers walked for the first time during this pass
    pub seen: HashSet<ContextId>,
    /// Containers materialized from incoming records, armed once the pass
    /// has resolved all references
    pub created: Vec<ContextId>,
    pub unresolved: UnresolvedList,
    /// Children that lost an edge during this pass
    pub retracted: Vec<ContextId>,
    /// Hooks owed by remote assignments, run once recording resumes
    pub hooks: Vec<HookCall>,
}

impl SyncPass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything whose reachability may have changed
    pub fn teardown_candidates(&mut self) -> Vec<ContextId> {
        let mut candidates: Vec<ContextId> = self.retracted.drain(..).collect();
        candidates.extend(self.created.drain(..));
        candidates.extend(self.seen.drain());
        candidates
    }
}
