use crate::{
    CommandBatch, CommandResult, DocumentError, DocumentHost, FontFormat, InsertLocation,
    Notification, SearchOptions,
};

pub const SAMPLE_TEXT: &str = "This is a sample text inserted in the document";
pub const HIGHLIGHT_COLOR: &str = "#FFFF00";

/// The first whitespace-delimited token of maximal length, counted in chars.
pub fn longest_word(text: &str) -> Option<&str> {
    text.split_whitespace().fold(None, |best, word| match best {
        Some(current) if current.chars().count() >= word.chars().count() => Some(current),
        _ => Some(word),
    })
}

/// Replaces the document body with the sample text.
pub async fn load_sample_data(host: &dyn DocumentHost) -> Result<(), DocumentError> {
    host.sync(
        CommandBatch::new()
            .clear_body()
            .insert_text(SAMPLE_TEXT, InsertLocation::End),
    )
    .await?;
    tracing::info!("sample text inserted");
    Ok(())
}

/// Bolds and highlights the first whole-word match of the longest word in the selection.
///
/// Returns the highlighted word, or `None` when the selection holds no words.
pub async fn highlight_longest_word(
    host: &dyn DocumentHost,
) -> Result<Option<String>, DocumentError> {
    let results = host.sync(CommandBatch::new().load_selection_text()).await?;
    let selection = match results.as_slice() {
        [CommandResult::Text(text)] => text.clone(),
        other => {
            return Err(DocumentError::UnexpectedResult(format!(
                "expected selection text, got {other:?}"
            )))
        }
    };

    let Some(word) = longest_word(&selection).map(str::to_string) else {
        tracing::debug!("selection has no words to highlight");
        return Ok(None);
    };

    let options = SearchOptions {
        match_case: true,
        match_whole_word: true,
    };
    let format = FontFormat {
        bold: Some(true),
        highlight_color: Some(HIGHLIGHT_COLOR.to_string()),
    };
    let results = host
        .sync(CommandBatch::new().format_first_match(word.clone(), options, format))
        .await?;
    match results.as_slice() {
        [CommandResult::Formatted { matches: 0 }] => Err(DocumentError::NoMatch(word)),
        [CommandResult::Formatted { matches }] => {
            tracing::info!(word = %word, matches, "longest word highlighted");
            Ok(Some(word))
        }
        other => Err(DocumentError::UnexpectedResult(format!(
            "expected search result, got {other:?}"
        ))),
    }
}

pub async fn display_selected_text(host: &dyn DocumentHost) -> Notification {
    match host.selected_text().await {
        Ok(text) => Notification::new("The selected text is:", format!("\"{text}\"")),
        Err(err) => report_error(&err),
    }
}

pub fn report_error(err: &DocumentError) -> Notification {
    tracing::warn!(error = %err, "document operation failed");
    Notification::new("Error:", err.to_string())
}
