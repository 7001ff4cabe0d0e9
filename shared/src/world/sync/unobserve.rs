use log::{debug, info};

use crate::world::sync::{error::SyncError, pass::SyncPass, synchronizer::Synchronizer};

impl Synchronizer {
    /// Tears down every container the pass left unreachable from the roots.
    /// Runs after every produced and every received message, so both peers
    /// drop the same identifiers at the same point in the stream.
    pub(super) fn finish_pass(&mut self, pass: &mut SyncPass) -> Result<(), SyncError> {
        let candidates = pass.teardown_candidates();
        if candidates.is_empty() {
            return Ok(());
        }

        for id in self.registry.collect_unreachable(&candidates) {
            let (value, mut binding) = self.registry.unregister(&id)?;
            binding.release_observers();
            value.detach_mutator(&self.channel);
            debug!("Stopped observing {} {}", binding.kind(), id);
        }
        Ok(())
    }

    /// Forgets every root and registered container. Pending local changes
    /// are discarded.
    pub fn teardown_all(&mut self) {
        let released = self.registry.clear();
        for value in &released {
            value.detach_mutator(&self.channel);
        }
        self.roots.clear();
        self.channel.drain();
        info!("Tore down {} observed containers", released.len());
    }
}
