use serde::{Deserialize, Serialize};
use url::Url;

/// Tokens closer than this to expiry are treated as already expired.
pub const SESSION_MARGIN_SECS: i64 = 300;

/// Lifetime assumed when the token endpoint omits `expires_in`.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Signed-in state persisted under the `auth` key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    /// Absolute expiry in epoch seconds.
    #[serde(rename = "expires")]
    pub expires_at: i64,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Session {
    pub fn new(access_token: impl Into<String>, expires_at: i64) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    pub fn from_expires_in(
        access_token: impl Into<String>,
        issued_at: i64,
        expires_in_secs: Option<u64>,
    ) -> Self {
        let lifetime = expires_in_secs
            .and_then(|secs| i64::try_from(secs).ok())
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        Self::new(access_token, issued_at.saturating_add(lifetime))
    }

    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

/// Cached identity of the signed-in user, persisted under the `user` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub display_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    SendMail,
    UploadFile,
    ExploreGraph,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SendMail => "send_mail",
            Self::UploadFile => "upload_file",
            Self::ExploreGraph => "explore_graph",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status flags the view renders for one operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOutcome {
    pub succeeded: bool,
    pub finished: bool,
}

impl RequestOutcome {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn settle(&mut self, succeeded: bool) {
        self.succeeded = succeeded;
        self.finished = true;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeBoard {
    pub send_mail: RequestOutcome,
    pub upload_file: RequestOutcome,
    pub explore_graph: RequestOutcome,
}

impl OutcomeBoard {
    pub fn get(&self, kind: OperationKind) -> RequestOutcome {
        match kind {
            OperationKind::SendMail => self.send_mail,
            OperationKind::UploadFile => self.upload_file,
            OperationKind::ExploreGraph => self.explore_graph,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthProfile {
    pub client_id: String,
    pub auth_url: Url,
    pub token_url: Url,
    pub redirect_url: Url,
    pub scopes: Vec<String>,
}
