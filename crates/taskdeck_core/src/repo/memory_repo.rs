//! In-memory state repository for tests and ephemeral sessions.

use super::state_repo::{RepoError, RepoResult, StateRepository, StorageKey};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Shared in-memory record map.
///
/// Clones share the same records, so a test can keep one handle while the
/// persistence writer owns another, then rehydrate a fresh context from it.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateRepository {
    records: Arc<Mutex<BTreeMap<StorageKey, String>>>,
}

impl MemoryStateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the stored record for `key`.
    pub fn snapshot(&self, key: StorageKey) -> Option<String> {
        self.records
            .lock()
            .ok()
            .and_then(|records| records.get(&key).cloned())
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StateRepository for MemoryStateRepository {
    fn load_record(&self, key: StorageKey) -> RepoResult<Option<String>> {
        let records = self
            .records
            .lock()
            .map_err(|_| RepoError::Unavailable("memory records lock poisoned"))?;
        Ok(records.get(&key).cloned())
    }

    fn save_record(&mut self, key: StorageKey, value: &str) -> RepoResult<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| RepoError::Unavailable("memory records lock poisoned"))?;
        records.insert(key, value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryStateRepository;
    use crate::repo::state_repo::{StateRepository, StorageKey};

    #[test]
    fn clones_share_records() {
        let observer = MemoryStateRepository::new();
        let mut writer = observer.clone();
        writer.save_record(StorageKey::Theme, "true").unwrap();

        assert_eq!(observer.snapshot(StorageKey::Theme).as_deref(), Some("true"));
        assert_eq!(observer.len(), 1);
    }
}
