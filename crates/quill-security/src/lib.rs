mod context;
mod error;
mod gate;
mod keychain;
mod oauth;
mod provider;
mod store;

pub use context::SessionContext;
pub use error::SecurityError;
pub use gate::{check_gate, is_token_fresh, GateDecision};
pub use keychain::{SecretKey, SecretStore};
pub use provider::{LoginRedirect, OAuthSessionProvider, SessionProvider};
pub use store::{MemoryStore, SessionStore, AUTH_KEY, PENDING_SIGN_IN_KEY, USER_KEY};
