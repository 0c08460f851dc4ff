//! Durable per-origin key/value storage
//!
//! The engine only needs string get/set. Browser builds back this with
//! `localStorage`; tests and tools use [`MemoryStorage`].

mod error;

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

pub use error::StorageError;

/// String-keyed storage with literal string values.
pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for Rc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }
}

/// In-memory storage. Clones share the same entries.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    items: Rc<RefCell<BTreeMap<String, String>>>,
    available: Rc<Cell<bool>>,
    writable: Rc<Cell<bool>>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self {
            items: Rc::default(),
            available: Rc::new(Cell::new(true)),
            writable: Rc::new(Cell::new(true)),
        }
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage pre-populated with entries
    pub fn with_items<'a>(items: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let storage = Self::new();
        storage.items.borrow_mut().extend(
            items
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );
        storage
    }

    /// Simulate storage being blocked entirely
    pub fn set_available(&self, available: bool) {
        self.available.set(available);
    }

    /// Simulate a full quota: reads still work, writes fail
    pub fn set_writable(&self, writable: bool) {
        self.writable.set(writable);
    }

    /// Read an entry without going through the availability check
    pub fn peek(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        if !self.available.get() {
            return Err(StorageError::Unavailable);
        }
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if !self.available.get() {
            return Err(StorageError::Unavailable);
        }
        if !self.writable.get() {
            return Err(StorageError::Write {
                key: key.to_string(),
                reason: "QuotaExceededError".to_string(),
            });
        }
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_entries() {
        let storage = MemoryStorage::new();
        let other = storage.clone();
        storage.set_item("wallColor", "#111111").unwrap();
        assert_eq!(other.get_item("wallColor").unwrap().as_deref(), Some("#111111"));
    }

    #[test]
    fn unavailable_storage_errors() {
        let storage = MemoryStorage::with_items([("frameWidth", "8")]);
        storage.set_available(false);
        assert!(matches!(storage.get_item("frameWidth"), Err(StorageError::Unavailable)));
        assert!(storage.set_item("frameWidth", "9").is_err());
        assert_eq!(storage.peek("frameWidth").as_deref(), Some("8"));
    }

    #[test]
    fn full_quota_still_reads() {
        let storage = MemoryStorage::with_items([("frameWidth", "8")]);
        storage.set_writable(false);
        assert_eq!(storage.get_item("frameWidth").unwrap().as_deref(), Some("8"));
        assert!(matches!(
            storage.set_item("frameWidth", "9"),
            Err(StorageError::Write { .. })
        ));
        assert_eq!(storage.peek("frameWidth").as_deref(), Some("8"));
    }
}
