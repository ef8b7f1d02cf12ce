//! Cache en mémoire

use crate::{ApiCache, CachedResponse, Result};
use std::collections::HashMap;
use std::sync::RwLock;

/// Cache d'API en mémoire (perdu à l'arrêt du processus)
#[derive(Debug, Default)]
pub struct InMemoryApiCache {
    entries: RwLock<HashMap<String, CachedResponse>>,
}

impl InMemoryApiCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ApiCache for InMemoryApiCache {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get_entry(&self, key: &str) -> Result<Option<CachedResponse>> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    fn put_entry(&self, entry: CachedResponse) -> Result<()> {
        self.entries
            .write()
            .unwrap()
            .insert(entry.key.clone(), entry);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().unwrap().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries.write().unwrap().clear();
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.entries.read().unwrap().len())
    }
}
