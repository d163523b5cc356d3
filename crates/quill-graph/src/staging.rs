use crate::GraphError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use quill_core::RequestOutcome;
use std::path::Path;

pub const DEFAULT_FILE_NAME: &str = "test.docx";

const DEFAULT_DOCUMENT_BASE64: &str = include_str!("../assets/default_document.b64");

/// A whole file held in memory, ready to be sent as one request body.
#[derive(Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub name: String,
    pub content: Vec<u8>,
}

impl std::fmt::Debug for StagedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagedFile")
            .field("name", &self.name)
            .field("size", &self.content.len())
            .finish()
    }
}

/// The document uploaded when the user has not picked one.
pub fn default_document(name: &str) -> Result<StagedFile, GraphError> {
    let compact: String = DEFAULT_DOCUMENT_BASE64
        .chars()
        .filter(|ch| !ch.is_ascii_whitespace())
        .collect();
    let content = STANDARD
        .decode(compact.as_bytes())
        .map_err(|err| GraphError::Encoding(err.to_string()))?;
    Ok(StagedFile {
        name: name.to_string(),
        content,
    })
}

pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// The file selection for the next upload.
#[derive(Debug, Clone)]
pub struct FileStage {
    default_name: String,
    staged: Option<StagedFile>,
}

impl Default for FileStage {
    fn default() -> Self {
        Self::new(DEFAULT_FILE_NAME)
    }
}

impl FileStage {
    pub fn new(default_name: impl Into<String>) -> Self {
        Self {
            default_name: default_name.into(),
            staged: None,
        }
    }

    /// Reads the whole file into memory.
    pub async fn stage_path(&mut self, path: &Path) -> Result<&StagedFile, GraphError> {
        let content = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| GraphError::Data(format!("{} has no file name", path.display())))?;
        tracing::debug!(name = %name, size = content.len(), "file staged");
        Ok(self.staged.insert(StagedFile { name, content }))
    }

    pub fn stage(&mut self, file: StagedFile) {
        self.staged = Some(file);
    }

    pub fn staged(&self) -> Option<&StagedFile> {
        self.staged.as_ref()
    }

    /// Drops the selection and resets the upload status shown for it.
    pub fn clear(&mut self, upload_outcome: &mut RequestOutcome) {
        self.staged = None;
        upload_outcome.reset();
    }

    /// The staged file, or the embedded default document when nothing usable is staged.
    pub fn resolve(&self) -> Result<StagedFile, GraphError> {
        match &self.staged {
            Some(file) if !file.name.is_empty() => Ok(file.clone()),
            _ => {
                tracing::warn!(
                    name = %self.default_name,
                    "no file selected; uploading default document"
                );
                default_document(&self.default_name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_document_is_a_zip_package() {
        let file = default_document(DEFAULT_FILE_NAME).expect("decode");
        assert_eq!(file.name, "test.docx");
        assert!(file.content.starts_with(b"PK\x03\x04"));
    }

    #[test]
    fn empty_stage_falls_back_to_default() {
        let stage = FileStage::default();
        let file = stage.resolve().expect("resolve");
        assert_eq!(file, default_document(DEFAULT_FILE_NAME).expect("decode"));
    }

    #[test]
    fn nameless_selection_counts_as_none() {
        let mut stage = FileStage::new("fallback.docx");
        stage.stage(StagedFile {
            name: String::new(),
            content: b"ignored".to_vec(),
        });
        assert_eq!(stage.resolve().expect("resolve").name, "fallback.docx");
    }

    #[test]
    fn clear_resets_upload_outcome() {
        let mut stage = FileStage::default();
        stage.stage(StagedFile {
            name: "notes.txt".to_string(),
            content: b"hello".to_vec(),
        });
        let mut outcome = RequestOutcome::default();
        outcome.settle(true);

        stage.clear(&mut outcome);
        assert!(stage.staged().is_none());
        assert_eq!(outcome, RequestOutcome::default());
    }

    #[tokio::test]
    async fn stage_path_reads_entire_file() {
        let path = std::env::temp_dir().join(format!("quill-stage-{}.txt", std::process::id()));
        tokio::fs::write(&path, b"line one\nline two\n").await.expect("write");

        let mut stage = FileStage::default();
        let staged = stage.stage_path(&path).await.expect("stage").clone();
        assert_eq!(staged.content, b"line one\nline two\n");
        assert_eq!(
            staged.name,
            path.file_name().expect("name").to_string_lossy()
        );
        assert_eq!(stage.resolve().expect("resolve"), staged);
        let _ = tokio::fs::remove_file(path).await;
    }

    #[test]
    fn base64_helper_matches_embedded_text() {
        let file = default_document(DEFAULT_FILE_NAME).expect("decode");
        let encoded = to_base64(&file.content);
        assert!(DEFAULT_DOCUMENT_BASE64.starts_with(&encoded[..40]));
    }
}
