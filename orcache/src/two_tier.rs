//! Cache à deux niveaux : mémoire devant stockage persistant

use crate::{ApiCache, CachedResponse, Result};

/// Combine un cache rapide (`front`) et un cache persistant (`back`)
///
/// - Lecture : `front` puis `back` ; un succès sur `back` est recopié dans
///   `front` avec son horodatage d'origine.
/// - Écriture, suppression et vidage s'appliquent aux deux niveaux.
/// - La purge des entrées expirées se fait sur le niveau persistant, via
///   [`back`](Self::back).
#[derive(Debug)]
pub struct TwoTierApiCache<F, B> {
    front: F,
    back: B,
}

impl<F: ApiCache, B: ApiCache> TwoTierApiCache<F, B> {
    pub fn new(front: F, back: B) -> Self {
        Self { front, back }
    }

    pub fn front(&self) -> &F {
        &self.front
    }

    pub fn back(&self) -> &B {
        &self.back
    }
}

impl<F: ApiCache, B: ApiCache> ApiCache for TwoTierApiCache<F, B> {
    fn name(&self) -> &'static str {
        "two-tier"
    }

    fn get_entry(&self, key: &str) -> Result<Option<CachedResponse>> {
        if let Some(entry) = self.front.get_entry(key)? {
            return Ok(Some(entry));
        }

        match self.back.get_entry(key)? {
            Some(entry) => {
                tracing::debug!(
                    key,
                    from = self.back.name(),
                    to = self.front.name(),
                    "Promoting API cache entry"
                );
                self.front.put_entry(entry.clone())?;
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    fn put_entry(&self, entry: CachedResponse) -> Result<()> {
        self.back.put_entry(entry.clone())?;
        self.front.put_entry(entry)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.front.remove(key)?;
        self.back.remove(key)
    }

    fn clear(&self) -> Result<()> {
        self.front.clear()?;
        self.back.clear()
    }

    /// Le niveau persistant fait foi
    fn len(&self) -> Result<usize> {
        self.back.len()
    }
}
