use crate::{SecurityError, SessionStore};

/// Secrets kept in the OS keychain under one service name.
#[derive(Debug, Clone)]
pub struct SecretStore {
    service_name: String,
}

#[derive(Debug, Clone)]
pub struct SecretKey {
    pub namespace: String,
    pub id: String,
}

impl SecretKey {
    pub fn session(id: &str) -> Self {
        Self {
            namespace: "session".to_string(),
            id: id.to_string(),
        }
    }

    pub fn as_username(&self) -> String {
        format!("{}:{}", self.namespace, self.id)
    }
}

impl SecretStore {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    pub fn set(&self, key: &SecretKey, value: &str) -> Result<(), SecurityError> {
        let entry = keyring::Entry::new(&self.service_name, &key.as_username())?;
        entry.set_password(value)?;
        Ok(())
    }

    pub fn get(&self, key: &SecretKey) -> Result<Option<String>, SecurityError> {
        let entry = keyring::Entry::new(&self.service_name, &key.as_username())?;
        match entry.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub fn delete(&self, key: &SecretKey) -> Result<(), SecurityError> {
        let entry = keyring::Entry::new(&self.service_name, &key.as_username())?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl SessionStore for SecretStore {
    fn get(&self, key: &str) -> Result<Option<String>, SecurityError> {
        SecretStore::get(self, &SecretKey::session(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SecurityError> {
        SecretStore::set(self, &SecretKey::session(key), value)
    }

    fn remove(&self, key: &str) -> Result<(), SecurityError> {
        self.delete(&SecretKey::session(key))
    }
}
