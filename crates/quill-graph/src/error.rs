use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("graph returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("session error: {0}")]
    Security(#[from] quill_security::SecurityError),
    #[error("url error: {0}")]
    Url(#[from] url::ParseError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid payload encoding: {0}")]
    Encoding(String),
    #[error("refusing to send the bearer token to {0}")]
    ForeignHost(String),
    #[error("invalid data: {0}")]
    Data(String),
}
