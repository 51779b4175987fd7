use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::name::CacheKey;

/// Tracks which cache keys are being populated in this process.
///
/// At most one [`PopulationClaim`] exists per key. Requests that lose the
/// race still stream from origin but do not write, so two first requests for
/// the same video never interleave chunk writes.
#[derive(Clone, Default)]
pub struct PopulationRegistry {
    active: Arc<DashMap<CacheKey, ()>>,
}

impl PopulationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the right to populate `key`, or `None` if another request holds it.
    pub fn try_claim(&self, key: &CacheKey) -> Option<PopulationClaim> {
        match self.active.entry(key.clone()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(());
                Some(PopulationClaim {
                    key: key.clone(),
                    active: Arc::clone(&self.active),
                })
            }
        }
    }

    pub fn is_populating(&self, key: &CacheKey) -> bool {
        self.active.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// Exclusive right to populate one key. Released on drop.
pub struct PopulationClaim {
    key: CacheKey,
    active: Arc<DashMap<CacheKey, ()>>,
}

impl PopulationClaim {
    pub fn key(&self) -> &CacheKey {
        &self.key
    }
}

impl Drop for PopulationClaim {
    fn drop(&mut self) {
        self.active.remove(&self.key);
    }
}
