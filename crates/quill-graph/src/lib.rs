mod client;
mod dispatch;
mod error;
mod message;
mod staging;

pub use client::{ExploreResponse, GraphClient, GraphUser, UploadedItem};
pub use dispatch::{Dispatch, Dispatcher};
pub use error::GraphError;
pub use message::{
    welcome_message, BodyType, EmailAddress, ItemBody, MailMessage, Recipient, SendMailRequest,
    WELCOME_SUBJECT,
};
pub use staging::{default_document, to_base64, FileStage, StagedFile, DEFAULT_FILE_NAME};
