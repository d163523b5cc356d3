use crate::SecurityError;
use std::collections::BTreeMap;
use std::sync::Mutex;

pub const AUTH_KEY: &str = "auth";
pub const USER_KEY: &str = "user";
pub const PENDING_SIGN_IN_KEY: &str = "pending_oauth";

/// String key-value storage that outlives a single run.
///
/// Reads and writes are independent; there is no transaction spanning a
/// read followed by a write.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, SecurityError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SecurityError>;
    fn remove(&self, key: &str) -> Result<(), SecurityError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> SecurityError {
    SecurityError::Store("memory store lock poisoned".to_string())
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, SecurityError> {
        let entries = self.entries.lock().map_err(poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SecurityError> {
        let mut entries = self.entries.lock().map_err(poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SecurityError> {
        let mut entries = self.entries.lock().map_err(poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_overwrites_and_removes() {
        let store = MemoryStore::new();
        store.set(AUTH_KEY, "one").expect("set");
        store.set(AUTH_KEY, "two").expect("overwrite");
        assert_eq!(store.get(AUTH_KEY).expect("get").as_deref(), Some("two"));
        store.remove(AUTH_KEY).expect("remove");
        store.remove(AUTH_KEY).expect("remove twice");
        assert!(store.is_empty());
    }
}
