use std::collections::HashMap;
use std::sync::Mutex;

use crate::{BlobStore, StoreError};

/// Process-local blob store. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.lock().expect("memory blob store mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.map
            .lock()
            .expect("memory blob store mutex poisoned")
            .clear();
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let map = self.map.lock().expect("memory blob store mutex poisoned");
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self.map.lock().expect("memory blob store mutex poisoned");
        map.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut map = self.map.lock().expect("memory blob store mutex poisoned");
        map.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let map = self.map.lock().expect("memory blob store mutex poisoned");
        Ok(map.keys().cloned().collect())
    }
}
