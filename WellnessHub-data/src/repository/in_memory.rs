use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::models::wearable::{ProfileUpdateRecord, WearableProfileRecord};
use super::errors::RepositoryError;

/// In-memory storage for wearable profiles.
///
/// Merges run while the map lock is held, so two updates for the same user
/// never interleave.
#[derive(Debug, Clone)]
pub struct InMemoryStorage {
    profiles: Arc<Mutex<HashMap<String, WearableProfileRecord>>>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self {
            profiles: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Get a profile by user id
    pub fn get(&self, user_id: &str) -> Result<Option<WearableProfileRecord>, RepositoryError> {
        let store = self.profiles.lock()?;
        Ok(store.get(user_id).cloned())
    }

    /// Merge an update into the stored profile, creating it if needed
    pub fn upsert(&self, update: &ProfileUpdateRecord) -> Result<WearableProfileRecord, RepositoryError> {
        let mut store = self.profiles.lock()?;
        let profile = store
            .entry(update.user_id.clone())
            .or_insert_with(|| WearableProfileRecord::empty(&update.user_id));
        profile.apply(update);
        Ok(profile.clone())
    }

    /// All user ids with a stored profile, sorted
    pub fn list_user_ids(&self) -> Result<Vec<String>, RepositoryError> {
        let store = self.profiles.lock()?;
        let mut ids: Vec<String> = store.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
