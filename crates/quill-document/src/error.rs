use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("host rejected the batch: {0}")]
    Host(String),
    #[error("range {start}..{end} is outside the document or splits a character")]
    InvalidRange { start: usize, end: usize },
    #[error("no match for \"{0}\" in the document")]
    NoMatch(String),
    #[error("unexpected host result: {0}")]
    UnexpectedResult(String),
    #[error("dialog error: {0}")]
    Dialog(String),
    #[error("search pattern error: {0}")]
    Pattern(#[from] regex::Error),
}
