use crate::oauth::{PendingSignIn, PkceFlow};
use crate::{SecurityError, SessionContext, SessionStore, PENDING_SIGN_IN_KEY};
use async_trait::async_trait;
use quill_core::{Clock, OAuthProfile};
use std::sync::Arc;
use url::Url;

/// Pending sign-ins older than this are discarded.
const SIGN_IN_TTL_SECS: i64 = 15 * 60;

/// Where to send the user to sign in again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRedirect {
    pub authorization_url: String,
}

/// Sign-in and sign-out, as offered by the identity provider.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn login(&self) -> Result<LoginRedirect, SecurityError>;
    async fn logout(&self) -> Result<(), SecurityError>;
}

/// Authorization-code + PKCE sign-in against the configured identity platform.
pub struct OAuthSessionProvider {
    flow: PkceFlow,
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
}

impl OAuthSessionProvider {
    pub fn new(
        profile: OAuthProfile,
        store: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SecurityError> {
        Ok(Self {
            flow: PkceFlow::from_profile(&profile)?,
            store,
            clock,
        })
    }

    /// Finishes a sign-in started by [`SessionProvider::login`] using the URL
    /// the identity platform redirected the browser to.
    pub async fn complete_login(
        &self,
        ctx: &mut SessionContext,
        callback_url: &str,
    ) -> Result<(), SecurityError> {
        let callback = Url::parse(callback_url.trim())?;
        let param = |name: &str| {
            callback
                .query_pairs()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
        };

        if let Some(error) = param("error") {
            let description = param("error_description").unwrap_or_default();
            return Err(SecurityError::OAuth(format!("{error}: {description}")));
        }

        let code = param("code")
            .ok_or_else(|| SecurityError::OAuth("callback is missing `code`".to_string()))?;
        let state = param("state").unwrap_or_default();

        let raw = self
            .store
            .get(PENDING_SIGN_IN_KEY)?
            .ok_or_else(|| SecurityError::OAuth("no sign-in in progress".to_string()))?;
        let pending: PendingSignIn = serde_json::from_str(&raw)?;

        let now = self.clock.now();
        if now - pending.created_at > SIGN_IN_TTL_SECS {
            self.store.remove(PENDING_SIGN_IN_KEY)?;
            return Err(SecurityError::OAuth(
                "sign-in expired; start again".to_string(),
            ));
        }
        if state != pending.csrf_state {
            return Err(SecurityError::OAuth("OAuth state mismatch".to_string()));
        }

        let session = self.flow.redeem(code.trim(), &pending, now).await?;
        self.store.remove(PENDING_SIGN_IN_KEY)?;

        ctx.establish(session)?;
        tracing::info!("sign-in completed");
        Ok(())
    }
}

#[async_trait]
impl SessionProvider for OAuthSessionProvider {
    async fn login(&self) -> Result<LoginRedirect, SecurityError> {
        let (redirect, pending) = self.flow.authorize(self.clock.now());
        self.store
            .set(PENDING_SIGN_IN_KEY, &serde_json::to_string(&pending)?)?;
        tracing::info!("sign-in started");
        Ok(redirect)
    }

    async fn logout(&self) -> Result<(), SecurityError> {
        self.store.remove(PENDING_SIGN_IN_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use quill_core::{FixedClock, DEFAULT_TOKEN_LIFETIME_SECS};
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const NOW: i64 = 1_700_000_000;

    fn profile(token_base: &str) -> OAuthProfile {
        OAuthProfile {
            client_id: "quill-test-client".to_string(),
            auth_url: Url::parse("https://login.example.com/authorize").expect("url"),
            token_url: Url::parse(&format!("{token_base}/token")).expect("url"),
            redirect_url: Url::parse("http://localhost:5000/callback").expect("url"),
            scopes: vec!["User.Read".to_string()],
        }
    }

    fn provider(
        token_base: &str,
        store: Arc<MemoryStore>,
        clock: Arc<FixedClock>,
    ) -> OAuthSessionProvider {
        OAuthSessionProvider {
            flow: PkceFlow::unvalidated(&profile(token_base)),
            store,
            clock,
        }
    }

    fn state_of(redirect: &LoginRedirect) -> String {
        Url::parse(&redirect.authorization_url)
            .expect("auth url")
            .query_pairs()
            .find(|(key, _)| key == "state")
            .map(|(_, value)| value.into_owned())
            .expect("state param")
    }

    #[tokio::test]
    async fn completes_sign_in_and_establishes_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("code=the-code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh-token",
                "token_type": "Bearer",
                "expires_in": 3599
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(NOW));
        let provider = provider(&server.uri(), store.clone(), clock);
        let mut ctx = SessionContext::initialize(store.clone()).expect("init");

        let redirect = provider.login().await.expect("login");
        let callback = format!(
            "http://localhost:5000/callback?code=the-code&state={}",
            state_of(&redirect)
        );
        provider
            .complete_login(&mut ctx, &callback)
            .await
            .expect("complete");

        let session = ctx.session().expect("session");
        assert_eq!(session.access_token, "fresh-token");
        assert_eq!(session.expires_at, NOW + 3599);
        assert!(store.get(PENDING_SIGN_IN_KEY).expect("get").is_none());
    }

    #[tokio::test]
    async fn rejects_state_mismatch_without_exchanging() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::new());
        let provider = provider(&server.uri(), store.clone(), Arc::new(FixedClock::new(NOW)));
        let mut ctx = SessionContext::initialize(store).expect("init");

        provider.login().await.expect("login");
        let err = provider
            .complete_login(&mut ctx, "http://localhost:5000/callback?code=c&state=forged")
            .await
            .expect_err("mismatch");
        assert!(err.to_string().contains("state mismatch"));
        assert!(ctx.session().is_none());
    }

    #[tokio::test]
    async fn stale_pending_sign_in_is_discarded() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(NOW));
        let provider = provider("https://login.example.com", store.clone(), clock.clone());
        let mut ctx = SessionContext::initialize(store.clone()).expect("init");

        let redirect = provider.login().await.expect("login");
        clock.advance(SIGN_IN_TTL_SECS + 1);
        let callback = format!(
            "http://localhost:5000/callback?code=c&state={}",
            state_of(&redirect)
        );
        let err = provider
            .complete_login(&mut ctx, &callback)
            .await
            .expect_err("expired");
        assert!(err.to_string().contains("expired"));
        assert!(store.get(PENDING_SIGN_IN_KEY).expect("get").is_none());
    }

    #[tokio::test]
    async fn token_without_lifetime_gets_the_default_hour() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("code_verifier="))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "no-lifetime",
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::new());
        let provider = provider(&server.uri(), store.clone(), Arc::new(FixedClock::new(NOW)));
        let mut ctx = SessionContext::initialize(store).expect("init");

        let redirect = provider.login().await.expect("login");
        let callback = format!(
            "http://localhost:5000/callback?code=c&state={}",
            state_of(&redirect)
        );
        provider
            .complete_login(&mut ctx, &callback)
            .await
            .expect("complete");

        let session = ctx.session().expect("session");
        assert_eq!(session.expires_at, NOW + DEFAULT_TOKEN_LIFETIME_SECS);
    }

    #[tokio::test]
    async fn surfaces_identity_platform_errors() {
        let store = Arc::new(MemoryStore::new());
        let provider = provider(
            "https://login.example.com",
            store.clone(),
            Arc::new(FixedClock::new(NOW)),
        );
        let mut ctx = SessionContext::initialize(store).expect("init");
        let err = provider
            .complete_login(
                &mut ctx,
                "http://localhost:5000/callback?error=access_denied&error_description=user+cancelled",
            )
            .await
            .expect_err("denied");
        assert!(err.to_string().contains("access_denied: user cancelled"));
    }

    #[tokio::test]
    async fn logout_drops_pending_sign_in() {
        let store = Arc::new(MemoryStore::new());
        let provider = provider(
            "https://login.example.com",
            store.clone(),
            Arc::new(FixedClock::new(NOW)),
        );
        provider.login().await.expect("login");
        assert!(store.get(PENDING_SIGN_IN_KEY).expect("get").is_some());
        provider.logout().await.expect("logout");
        assert!(store.is_empty());
    }
}
