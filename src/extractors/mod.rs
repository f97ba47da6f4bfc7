use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

pub mod textlayer;
pub mod vision;

#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("failed to build extractor: {0}")]
    Build(String),
    #[error("failed to read document: {0}")]
    Read(String),
    #[error("OCR failed: {0}")]
    Ocr(String),
    #[error("extraction call failed: {0}")]
    Api(String),
    #[error("failed to parse extraction response: {0}")]
    Parse(String),
}

pub type ExtractorResult<T> = Result<T, ExtractorError>;

/// An abstraction over document backends that produce question strings.
///
/// Implementations return the questions of one document in document order,
/// with page headers, footers and answer-key sections removed. An empty
/// vector means the document contained no recognizable questions and is not
/// an error.
#[async_trait]
pub trait QuestionExtractor: Send + Sync {
    /// Extracts every question found in the document at `path`.
    async fn extract_questions(&self, path: &Path) -> ExtractorResult<Vec<String>>;
}
