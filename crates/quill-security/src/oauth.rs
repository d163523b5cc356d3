use crate::{LoginRedirect, SecurityError};
use oauth2::{
    basic::BasicClient, AuthUrl, AuthorizationCode, ClientId, CsrfToken, EndpointNotSet,
    EndpointSet, PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use quill_core::{OAuthProfile, Session};
use serde::{Deserialize, Serialize};
use url::{Host, Url};

type GraphAuthClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Verifier and CSRF state kept between `login` and `complete_login`.
#[derive(Clone, Serialize, Deserialize)]
pub(crate) struct PendingSignIn {
    pub(crate) csrf_state: String,
    pub(crate) pkce_verifier: String,
    pub(crate) created_at: i64,
}

impl std::fmt::Debug for PendingSignIn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingSignIn")
            .field("csrf_state", &"[REDACTED]")
            .field("pkce_verifier", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Authorization-code flow with PKCE for one configured app registration.
///
/// Redirects are never followed on the token request, so the code and verifier
/// only ever reach the configured token endpoint.
pub(crate) struct PkceFlow {
    client: GraphAuthClient,
    scopes: Vec<Scope>,
    http: reqwest::Client,
}

impl PkceFlow {
    pub(crate) fn from_profile(profile: &OAuthProfile) -> Result<Self, SecurityError> {
        check_profile(profile)?;
        Self::build(profile)
    }

    #[cfg(test)]
    pub(crate) fn unvalidated(profile: &OAuthProfile) -> Self {
        Self::build(profile).expect("test profile")
    }

    fn build(profile: &OAuthProfile) -> Result<Self, SecurityError> {
        let client = BasicClient::new(ClientId::new(profile.client_id.trim().to_string()))
            .set_auth_uri(AuthUrl::from_url(profile.auth_url.clone()))
            .set_token_uri(TokenUrl::from_url(profile.token_url.clone()))
            .set_redirect_uri(RedirectUrl::from_url(profile.redirect_url.clone()));
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            client,
            scopes: profile.scopes.iter().cloned().map(Scope::new).collect(),
            http,
        })
    }

    /// The page to send the user to, and what must be remembered to redeem
    /// the code it hands back.
    pub(crate) fn authorize(&self, now: i64) -> (LoginRedirect, PendingSignIn) {
        let (challenge, verifier) = PkceCodeChallenge::new_random_sha256();
        let (url, csrf_state) = self
            .client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(self.scopes.iter().cloned())
            .set_pkce_challenge(challenge)
            .url();

        let pending = PendingSignIn {
            csrf_state: csrf_state.secret().clone(),
            pkce_verifier: verifier.secret().clone(),
            created_at: now,
        };
        let redirect = LoginRedirect {
            authorization_url: url.into(),
        };
        (redirect, pending)
    }

    /// Trades an authorization code for a Graph session. A token response
    /// without `expires_in` gets the default lifetime.
    pub(crate) async fn redeem(
        &self,
        code: &str,
        pending: &PendingSignIn,
        issued_at: i64,
    ) -> Result<Session, SecurityError> {
        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(pending.pkce_verifier.clone()))
            .request_async(&self.http)
            .await
            .map_err(|err| SecurityError::OAuth(format!("token request failed: {err}")))?;

        Ok(Session::from_expires_in(
            token.access_token().secret().as_str(),
            issued_at,
            token.expires_in().map(|lifetime| lifetime.as_secs()),
        ))
    }
}

fn check_profile(profile: &OAuthProfile) -> Result<(), SecurityError> {
    for (label, url) in [
        ("oauth.auth_url", &profile.auth_url),
        ("oauth.token_url", &profile.token_url),
    ] {
        if url.scheme() != "https" || url.host().is_none() {
            return Err(SecurityError::OAuth(format!(
                "{label} must be an https URL with a host, got {url}"
            )));
        }
    }

    if !is_loopback(&profile.redirect_url) {
        return Err(SecurityError::OAuth(format!(
            "oauth.redirect_url must point at this machine, got {}",
            profile.redirect_url
        )));
    }

    if profile.client_id.trim().is_empty() {
        return Err(SecurityError::OAuth(
            "oauth.client_id is empty; set it to the app registration's client id".to_string(),
        ));
    }

    if let Some(scope) = profile.scopes.iter().find(|scope| is_tenant_wide(scope)) {
        return Err(SecurityError::OAuth(format!(
            "scope '{scope}' grants more than this app uses"
        )));
    }

    Ok(())
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(addr)) => addr.is_loopback(),
        Some(Host::Ipv6(addr)) => addr.is_loopback(),
        None => false,
    }
}

fn is_tenant_wide(scope: &str) -> bool {
    let scope = scope.trim();
    scope == "*" || scope.ends_with("/.default") || scope == ".default" || scope.ends_with(".All")
}
