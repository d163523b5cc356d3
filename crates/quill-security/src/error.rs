use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("keychain error: {0}")]
    Keychain(#[from] keyring::Error),
    #[error("oauth error: {0}")]
    OAuth(String),
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("session encoding error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("session store error: {0}")]
    Store(String),
}
