use anyhow::{anyhow, Result};
use log::info;
use radarcore::protocol::LinkSnapshot;
use std::sync::{Arc, RwLock};

/// Shared, read-only target snapshot for rendering, network and safety
/// collaborators. They poll it at their own cadence.
pub struct SnapshotBridge {
    state: Arc<RwLock<LinkSnapshot>>,
}

impl SnapshotBridge {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(LinkSnapshot::default())),
        }
    }

    /// Handle for a collaborator; it should only ever take read locks.
    pub fn handle(&self) -> Arc<RwLock<LinkSnapshot>> {
        self.state.clone()
    }

    pub fn publish(&self, snapshot: &LinkSnapshot) -> Result<()> {
        let mut guard = self
            .state
            .write()
            .map_err(|_| anyhow!("snapshot lock poisoned"))?;
        *guard = snapshot.clone();
        Ok(())
    }

    pub fn publish_status(&self, message: &str) {
        info!("[BRIDGE] {}", message);
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> Result<LinkSnapshot> {
        self.state
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| anyhow!("snapshot lock poisoned"))
    }
}

impl Default for SnapshotBridge {
    fn default() -> Self {
        Self::new()
    }
}
