use crate::{CommandBatch, CommandResult, DocumentError};
use async_trait::async_trait;

/// The editor's scripting object model.
#[async_trait]
pub trait DocumentHost: Send + Sync {
    /// Runs every queued command in order as one unit and returns one result
    /// per command. A failed batch leaves the document untouched.
    async fn sync(&self, batch: CommandBatch) -> Result<Vec<CommandResult>, DocumentError>;

    /// The current selection as plain text, via the host's native callback.
    async fn selected_text(&self) -> Result<String, DocumentError>;
}
