use crate::{
    CommandBatch, CommandResult, DocumentCommand, DocumentError, DocumentHost, FontFormat,
    InsertLocation, SearchOptions,
};
use async_trait::async_trait;
use regex::RegexBuilder;
use std::ops::Range;
use std::sync::Mutex;

/// Formatting applied to a byte range of the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedRun {
    pub range: Range<usize>,
    pub bold: bool,
    pub highlight_color: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct DocumentState {
    body: String,
    selection: Range<usize>,
    runs: Vec<FormattedRun>,
}

/// A plain-text document that executes command batches in process.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    state: Mutex<DocumentState>,
    failure: Mutex<Option<String>>,
}

impl MemoryDocument {
    /// A document whose whole body is selected.
    pub fn new(body: impl Into<String>) -> Self {
        let body = body.into();
        let selection = 0..body.len();
        Self {
            state: Mutex::new(DocumentState {
                body,
                selection,
                runs: Vec::new(),
            }),
            failure: Mutex::new(None),
        }
    }

    pub fn select(&self, range: Range<usize>) -> Result<(), DocumentError> {
        let mut state = self.lock()?;
        check_range(&state.body, &range)?;
        state.selection = range;
        Ok(())
    }

    /// Selects the first occurrence of `text`.
    pub fn select_text(&self, text: &str) -> Result<(), DocumentError> {
        let mut state = self.lock()?;
        let start = state
            .body
            .find(text)
            .ok_or_else(|| DocumentError::NoMatch(text.to_string()))?;
        state.selection = start..start + text.len();
        Ok(())
    }

    pub fn body(&self) -> String {
        self.lock().map(|state| state.body.clone()).unwrap_or_default()
    }

    pub fn formatted_runs(&self) -> Vec<FormattedRun> {
        self.lock().map(|state| state.runs.clone()).unwrap_or_default()
    }

    /// Makes the next `sync` or `selected_text` call fail with `message`.
    pub fn fail_next(&self, message: impl Into<String>) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = Some(message.into());
        }
    }

    /// The body with bold runs wrapped in `**` and highlighted runs in `==`.
    pub fn render_marked(&self) -> String {
        let Ok(state) = self.lock() else {
            return String::new();
        };
        let mut runs = state.runs.clone();
        runs.sort_by_key(|run| run.range.start);

        let mut out = String::with_capacity(state.body.len() + runs.len() * 4);
        let mut cursor = 0;
        for run in &runs {
            if run.range.start < cursor {
                continue;
            }
            out.push_str(&state.body[cursor..run.range.start]);
            let highlight = if run.highlight_color.is_some() { "==" } else { "" };
            let bold = if run.bold { "**" } else { "" };
            out.push_str(highlight);
            out.push_str(bold);
            out.push_str(&state.body[run.range.clone()]);
            out.push_str(bold);
            out.push_str(highlight);
            cursor = run.range.end;
        }
        out.push_str(&state.body[cursor..]);
        out
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, DocumentState>, DocumentError> {
        self.state
            .lock()
            .map_err(|_| DocumentError::Host("document state poisoned".to_string()))
    }

    fn take_failure(&self) -> Option<String> {
        self.failure.lock().ok().and_then(|mut failure| failure.take())
    }
}

#[async_trait]
impl DocumentHost for MemoryDocument {
    async fn sync(&self, batch: CommandBatch) -> Result<Vec<CommandResult>, DocumentError> {
        if let Some(message) = self.take_failure() {
            return Err(DocumentError::Host(message));
        }

        let mut state = self.lock()?;
        // Work on a copy so a failing command leaves the document as it was.
        let mut draft = state.clone();
        let results = batch
            .into_commands()
            .into_iter()
            .map(|command| apply(&mut draft, command))
            .collect::<Result<Vec<_>, _>>()?;
        *state = draft;
        Ok(results)
    }

    async fn selected_text(&self) -> Result<String, DocumentError> {
        if let Some(message) = self.take_failure() {
            return Err(DocumentError::Host(message));
        }
        let state = self.lock()?;
        Ok(state.body[state.selection.clone()].to_string())
    }
}

fn apply(state: &mut DocumentState, command: DocumentCommand) -> Result<CommandResult, DocumentError> {
    match command {
        DocumentCommand::ClearBody => {
            *state = DocumentState::default();
            Ok(CommandResult::Done)
        }
        DocumentCommand::InsertText { text, location } => {
            match location {
                InsertLocation::End => state.body.push_str(&text),
                InsertLocation::Start => {
                    state.body.insert_str(0, &text);
                    let shift = text.len();
                    state.selection = state.selection.start + shift..state.selection.end + shift;
                    for run in &mut state.runs {
                        run.range = run.range.start + shift..run.range.end + shift;
                    }
                }
            }
            Ok(CommandResult::Done)
        }
        DocumentCommand::LoadSelectionText => {
            check_range(&state.body, &state.selection)?;
            Ok(CommandResult::Text(
                state.body[state.selection.clone()].to_string(),
            ))
        }
        DocumentCommand::FormatFirstMatch {
            needle,
            options,
            format,
        } => {
            let matches = find_matches(&state.body, &needle, options)?;
            if let Some(first) = matches.first() {
                apply_format(state, first.clone(), &format);
            }
            Ok(CommandResult::Formatted {
                matches: matches.len(),
            })
        }
    }
}

fn apply_format(state: &mut DocumentState, range: Range<usize>, format: &FontFormat) {
    if let Some(run) = state.runs.iter_mut().find(|run| run.range == range) {
        if let Some(bold) = format.bold {
            run.bold = bold;
        }
        if format.highlight_color.is_some() {
            run.highlight_color = format.highlight_color.clone();
        }
        return;
    }
    state.runs.push(FormattedRun {
        range,
        bold: format.bold.unwrap_or(false),
        highlight_color: format.highlight_color.clone(),
    });
}

fn find_matches(
    body: &str,
    needle: &str,
    options: SearchOptions,
) -> Result<Vec<Range<usize>>, DocumentError> {
    if needle.is_empty() {
        return Ok(Vec::new());
    }
    let pattern = RegexBuilder::new(&regex::escape(needle))
        .case_insensitive(!options.match_case)
        .build()?;
    Ok(pattern
        .find_iter(body)
        .map(|found| found.range())
        .filter(|range| !options.match_whole_word || is_whole_word(body, range))
        .collect())
}

fn is_whole_word(body: &str, range: &Range<usize>) -> bool {
    let is_word_char = |ch: char| ch.is_alphanumeric() || ch == '_';
    let before = body[..range.start].chars().next_back();
    let after = body[range.end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

fn check_range(body: &str, range: &Range<usize>) -> Result<(), DocumentError> {
    let valid = range.start <= range.end
        && range.end <= body.len()
        && body.is_char_boundary(range.start)
        && body.is_char_boundary(range.end);
    if valid {
        Ok(())
    } else {
        Err(DocumentError::InvalidRange {
            start: range.start,
            end: range.end,
        })
    }
}
