use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertLocation {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchOptions {
    pub match_case: bool,
    pub match_whole_word: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FontFormat {
    pub bold: Option<bool>,
    /// `#RRGGBB`.
    pub highlight_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum DocumentCommand {
    ClearBody,
    InsertText {
        text: String,
        location: InsertLocation,
    },
    LoadSelectionText,
    FormatFirstMatch {
        needle: String,
        options: SearchOptions,
        format: FontFormat,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Done,
    Text(String),
    Formatted { matches: usize },
}

/// Commands queued against proxy objects, executed on the next `sync`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandBatch {
    commands: Vec<DocumentCommand>,
}

impl CommandBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear_body(mut self) -> Self {
        self.commands.push(DocumentCommand::ClearBody);
        self
    }

    pub fn insert_text(mut self, text: impl Into<String>, location: InsertLocation) -> Self {
        self.commands.push(DocumentCommand::InsertText {
            text: text.into(),
            location,
        });
        self
    }

    pub fn load_selection_text(mut self) -> Self {
        self.commands.push(DocumentCommand::LoadSelectionText);
        self
    }

    pub fn format_first_match(
        mut self,
        needle: impl Into<String>,
        options: SearchOptions,
        format: FontFormat,
    ) -> Self {
        self.commands.push(DocumentCommand::FormatFirstMatch {
            needle: needle.into(),
            options,
            format,
        });
        self
    }

    pub fn into_commands(self) -> Vec<DocumentCommand> {
        self.commands
    }
}
