mod batch;
mod dialog;
mod error;
mod host;
mod memory;
mod notification;
mod operations;

pub use batch::{
    CommandBatch, CommandResult, DocumentCommand, FontFormat, InsertLocation, SearchOptions,
};
pub use dialog::{
    handle_dialog_event, open_dialog, DialogEvent, DialogHost, DialogLifecycle, DialogOptions,
    DialogReaction,
};
pub use error::DocumentError;
pub use host::DocumentHost;
pub use memory::{FormattedRun, MemoryDocument};
pub use notification::Notification;
pub use operations::{
    display_selected_text, highlight_longest_word, load_sample_data, longest_word, report_error,
    HIGHLIGHT_COLOR, SAMPLE_TEXT,
};
