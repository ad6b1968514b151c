//! In-memory object storage for tests and dry runs.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::Result;
use crate::storage::ObjectStore;

/// Object storage backed by a map of keys to bytes.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store text under a key.
    pub fn insert(&self, key: &str, text: &str) {
        self.objects().insert(key.to_string(), text.as_bytes().to_vec());
    }

    /// Stored text under a key, if any.
    pub fn get_text(&self, key: &str) -> Option<String> {
        self.objects()
            .get(key)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    fn objects(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.objects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ObjectStore for MemoryStorage {
    async fn read_bytes_optional(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.objects().get(key).cloned())
    }

    async fn write_bytes(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> Result<()> {
        self.objects().insert(key.to_string(), bytes);
        Ok(())
    }

    fn location(&self, key: &str) -> String {
        format!("memory://{key}")
    }
}
