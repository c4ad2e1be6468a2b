// Keyed storage for image records.
// Handlers only see the `ImageStore` trait; the process uses `MemoryImageStore`,
// which keeps everything in memory for the lifetime of the process.

use crate::models::{ImagePatch, ImageRecord};
use std::collections::HashMap;
use std::fmt;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug)]
pub enum StoreError {
    // A writer panicked while holding the lock.
    LockPoisoned,
    // An insert collided with an existing id.
    DuplicateId(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::LockPoisoned => write!(f, "image store lock is poisoned"),
            StoreError::DuplicateId(id) => write!(f, "image with ID {} already exists", id),
        }
    }
}

impl std::error::Error for StoreError {}

/// Storage backend for image records.
///
/// Every mutation is atomic with respect to other calls on the same store:
/// `update` applies the patch and refreshes the timestamp in one step, and
/// `delete` hands back the removed record so only one caller can observe it.
pub trait ImageStore: Send + Sync {
    fn insert(&self, record: ImageRecord) -> Result<(), StoreError>;

    fn get(&self, id: &str) -> Result<Option<ImageRecord>, StoreError>;

    /// Returns every record, oldest first.
    fn list(&self) -> Result<Vec<ImageRecord>, StoreError>;

    /// Applies `patch` to the record with `id`, returning the updated record.
    fn update(&self, id: &str, patch: ImagePatch) -> Result<Option<ImageRecord>, StoreError>;

    /// Removes the record with `id`, returning it if it existed.
    fn delete(&self, id: &str) -> Result<Option<ImageRecord>, StoreError>;
}

#[derive(Default)]
pub struct MemoryImageStore {
    records: RwLock<HashMap<String, ImageRecord>>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, ImageRecord>>, StoreError> {
        self.records.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, ImageRecord>>, StoreError> {
        self.records.write().map_err(|_| StoreError::LockPoisoned)
    }
}

impl ImageStore for MemoryImageStore {
    fn insert(&self, record: ImageRecord) -> Result<(), StoreError> {
        let mut records = self.write()?;
        if records.contains_key(&record.id) {
            return Err(StoreError::DuplicateId(record.id));
        }
        records.insert(record.id.clone(), record);
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<ImageRecord>, StoreError> {
        Ok(self.read()?.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<ImageRecord>, StoreError> {
        let mut records: Vec<ImageRecord> = self.read()?.values().cloned().collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    fn update(&self, id: &str, patch: ImagePatch) -> Result<Option<ImageRecord>, StoreError> {
        let mut records = self.write()?;
        Ok(records.get_mut(id).map(|record| {
            record.apply(patch);
            record.clone()
        }))
    }

    fn delete(&self, id: &str) -> Result<Option<ImageRecord>, StoreError> {
        Ok(self.write()?.remove(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn record(id: &str) -> ImageRecord {
        ImageRecord::new(
            id.to_string(),
            format!("title {}", id),
            format!("description {}", id),
            format!("{}.png", id),
            format!("/uploads/{}.png", id),
        )
    }

    #[test]
    fn test_empty_store_lists_nothing() {
        let store = MemoryImageStore::new();
        assert!(store.list().unwrap().is_empty());
        assert!(store.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_insert_then_get() {
        let store = MemoryImageStore::new();
        store.insert(record("a")).unwrap();

        let found = store.get("a").unwrap().unwrap();
        assert_eq!(found.title, "title a");
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let store = MemoryImageStore::new();
        store.insert(record("a")).unwrap();

        let err = store.insert(record("a")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(id) if id == "a"));
    }

    #[test]
    fn test_update_missing_leaves_store_untouched() {
        let store = MemoryImageStore::new();
        store.insert(record("a")).unwrap();
        let before = store.list().unwrap();

        let patch = ImagePatch {
            title: Some("x".to_string()),
            description: None,
        };
        assert!(store.update("missing", patch).unwrap().is_none());
        assert_eq!(store.list().unwrap(), before);
    }

    #[test]
    fn test_update_applies_patch() {
        let store = MemoryImageStore::new();
        store.insert(record("a")).unwrap();
        let before = store.get("a").unwrap().unwrap();

        let patch = ImagePatch {
            title: Some("new".to_string()),
            description: None,
        };
        let updated = store.update("a", patch).unwrap().unwrap();
        assert_eq!(updated.title, "new");
        assert_eq!(updated.description, before.description);
        assert!(updated.updated_at > before.updated_at);
        assert_eq!(store.get("a").unwrap().unwrap(), updated);
    }

    #[test]
    fn test_delete_returns_removed_record_once() {
        let store = MemoryImageStore::new();
        store.insert(record("a")).unwrap();

        assert_eq!(store.delete("a").unwrap().unwrap().id, "a");
        assert!(store.delete("a").unwrap().is_none());
        assert!(store.get("a").unwrap().is_none());
    }

    #[test]
    fn test_concurrent_inserts_are_all_kept() {
        let store = Arc::new(MemoryImageStore::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || store.insert(record(&format!("id-{}", i))).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.list().unwrap().len(), 16);
    }
}
