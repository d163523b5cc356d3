use crate::{SecurityError, SessionStore, AUTH_KEY, USER_KEY};
use quill_core::{Session, UserProfile};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

/// Signed-in state for one user, passed explicitly to everything that needs it.
///
/// Lives from [`SessionContext::initialize`] to [`SessionContext::teardown`].
/// Every change is written through to the backing store.
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
    session: Option<Session>,
    profile: Option<UserProfile>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("session", &self.session)
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

impl SessionContext {
    pub fn initialize(store: Arc<dyn SessionStore>) -> Result<Self, SecurityError> {
        let session = load_entry(store.as_ref(), AUTH_KEY)?;
        let profile = load_entry(store.as_ref(), USER_KEY)?;
        tracing::debug!(
            has_session = session.is_some(),
            has_profile = profile.is_some(),
            "session context initialized"
        );
        Ok(Self {
            store,
            session,
            profile,
        })
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.profile.is_some()
    }

    /// Replaces the current session wholesale.
    pub fn establish(&mut self, session: Session) -> Result<(), SecurityError> {
        save_entry(self.store.as_ref(), AUTH_KEY, &session)?;
        self.session = Some(session);
        Ok(())
    }

    pub fn remember_profile(&mut self, profile: UserProfile) -> Result<(), SecurityError> {
        save_entry(self.store.as_ref(), USER_KEY, &profile)?;
        self.profile = Some(profile);
        Ok(())
    }

    /// Forgets the session and profile, both in the store and in memory.
    /// If the store refuses, the in-memory state is left as it was.
    pub fn teardown(&mut self) -> Result<(), SecurityError> {
        self.store.remove(AUTH_KEY)?;
        self.store.remove(USER_KEY)?;
        self.session = None;
        self.profile = None;
        tracing::info!("session cleared");
        Ok(())
    }
}

fn load_entry<T: DeserializeOwned>(
    store: &dyn SessionStore,
    key: &str,
) -> Result<Option<T>, SecurityError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            tracing::warn!(key, "discarding unreadable session entry: {err}");
            store.remove(key)?;
            Ok(None)
        }
    }
}

fn save_entry<T: Serialize>(
    store: &dyn SessionStore,
    key: &str,
    value: &T,
) -> Result<(), SecurityError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    fn profile() -> UserProfile {
        UserProfile {
            display_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    #[test]
    fn empty_store_gives_signed_out_context() {
        let ctx = SessionContext::initialize(Arc::new(MemoryStore::new())).expect("init");
        assert!(ctx.session().is_none());
        assert!(!ctx.is_authenticated());
    }

    #[test]
    fn state_survives_reinitialization() {
        let store = Arc::new(MemoryStore::new());
        let mut ctx = SessionContext::initialize(store.clone()).expect("init");
        ctx.establish(Session::new("token-1", 5_000)).expect("establish");
        ctx.remember_profile(profile()).expect("profile");

        let reloaded = SessionContext::initialize(store).expect("reload");
        assert_eq!(reloaded.session(), Some(&Session::new("token-1", 5_000)));
        assert_eq!(reloaded.profile(), Some(&profile()));
        assert!(reloaded.is_authenticated());
    }

    #[test]
    fn establish_replaces_previous_session() {
        let store = Arc::new(MemoryStore::new());
        let mut ctx = SessionContext::initialize(store.clone()).expect("init");
        ctx.establish(Session::new("old", 1)).expect("first");
        ctx.establish(Session::new("new", 2)).expect("second");
        assert_eq!(ctx.session().map(|s| s.access_token.as_str()), Some("new"));
        let raw = store.get(AUTH_KEY).expect("get").expect("stored");
        assert!(raw.contains("\"new\""));
    }

    #[test]
    fn teardown_clears_store() {
        let store = Arc::new(MemoryStore::new());
        let mut ctx = SessionContext::initialize(store.clone()).expect("init");
        ctx.establish(Session::new("token", 10)).expect("establish");
        ctx.remember_profile(profile()).expect("profile");
        ctx.teardown().expect("teardown");

        assert!(ctx.session().is_none());
        assert!(ctx.profile().is_none());
        assert!(store.is_empty());
    }

    /// Keeps entries but refuses to delete them.
    struct StickyStore(MemoryStore);

    impl SessionStore for StickyStore {
        fn get(&self, key: &str) -> Result<Option<String>, SecurityError> {
            self.0.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), SecurityError> {
            self.0.set(key, value)
        }

        fn remove(&self, _key: &str) -> Result<(), SecurityError> {
            Err(SecurityError::Store("keychain locked".to_string()))
        }
    }

    #[test]
    fn failed_teardown_keeps_memory_in_step_with_store() {
        let store = Arc::new(StickyStore(MemoryStore::new()));
        let mut ctx = SessionContext::initialize(store.clone()).expect("init");
        ctx.establish(Session::new("token", 10)).expect("establish");
        ctx.remember_profile(profile()).expect("profile");

        let err = ctx.teardown().expect_err("store refuses");
        assert!(err.to_string().contains("keychain locked"));
        assert_eq!(ctx.session(), Some(&Session::new("token", 10)));
        assert!(ctx.is_authenticated());
        assert!(store.get(AUTH_KEY).expect("get").is_some());
    }

    #[test]
    fn corrupt_entries_are_dropped() {
        let store = Arc::new(MemoryStore::new());
        store.set(AUTH_KEY, "{not json").expect("seed");
        let ctx = SessionContext::initialize(store.clone()).expect("init");
        assert!(ctx.session().is_none());
        assert!(store.get(AUTH_KEY).expect("get").is_none());
    }
}
