use std::sync::Arc;

use crate::error::error_message;
use crate::services::AnchorStore;

/// Pushes the window's first id to the anchor store and reads it back on
/// cold start. Every call goes straight to the store.
#[derive(Clone)]
pub struct AnchorBridge {
    store: Arc<dyn AnchorStore>,
}

impl AnchorBridge {
    pub fn new(store: Arc<dyn AnchorStore>) -> Self {
        Self { store }
    }

    /// Persist the current first id. Store failures are logged, never raised.
    pub fn on_window_changed(&self, first_id: Option<i64>) {
        log::trace!("saving anchor {:?}", first_id);
        if let Err(e) = self.store.save_first_post_id(first_id) {
            log::warn!("Failed to save first post id: {}", error_message(&e));
        }
    }

    /// Anchor to resume from when the window is empty
    pub fn saved_first_post_id(&self) -> Option<i64> {
        match self.store.saved_first_post_id() {
            Ok(id) => id,
            Err(e) => {
                log::warn!("Failed to read first post id: {}", error_message(&e));
                None
            }
        }
    }
}

/// In-memory anchor store
#[derive(Debug, Default)]
pub struct MemoryAnchorStore {
    value: std::sync::Mutex<Option<i64>>,
}

impl MemoryAnchorStore {
    pub fn new(initial: Option<i64>) -> Self {
        Self {
            value: std::sync::Mutex::new(initial),
        }
    }
}

impl AnchorStore for MemoryAnchorStore {
    fn saved_first_post_id(&self) -> anyhow::Result<Option<i64>> {
        self.value
            .lock()
            .map(|v| *v)
            .map_err(|_| anyhow::anyhow!("anchor store lock poisoned"))
    }

    fn save_first_post_id(&self, id: Option<i64>) -> anyhow::Result<()> {
        let mut value = self
            .value
            .lock()
            .map_err(|_| anyhow::anyhow!("anchor store lock poisoned"))?;
        *value = id;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    struct BrokenStore;

    impl AnchorStore for BrokenStore {
        fn saved_first_post_id(&self) -> anyhow::Result<Option<i64>> {
            bail!("disk on fire")
        }

        fn save_first_post_id(&self, _id: Option<i64>) -> anyhow::Result<()> {
            bail!("disk on fire")
        }
    }

    #[test]
    fn test_bridge_round_trip() {
        let store = Arc::new(MemoryAnchorStore::default());
        let bridge = AnchorBridge::new(store.clone());

        assert_eq!(bridge.saved_first_post_id(), None);
        bridge.on_window_changed(Some(4100));
        assert_eq!(bridge.saved_first_post_id(), Some(4100));
        assert_eq!(store.saved_first_post_id().unwrap(), Some(4100));
    }

    #[test]
    fn test_store_failures_are_swallowed() {
        let bridge = AnchorBridge::new(Arc::new(BrokenStore));
        bridge.on_window_changed(Some(1));
        assert_eq!(bridge.saved_first_post_id(), None);
    }
}
