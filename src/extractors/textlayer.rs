use std::path::Path;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::extractors::{ExtractorError, ExtractorResult, QuestionExtractor};

/// A question line starts with a short numeric enumerator such as `12. `.
static QUESTION_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d{1,3}\.\s").expect("valid question-start regex"));

/// Page furniture and answer-key sections that must not be treated as
/// question text.
static PAGE_FURNITURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)question\s*paper|past\s*year|university|exam|semester|answer\s*key")
        .expect("valid page-furniture regex")
});

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n+").expect("valid blank-line regex"));

static HORIZONTAL_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("valid horizontal-whitespace regex"));

/// Extraction backend for PDFs with a digital text layer.
pub struct TextLayerExtractor;

impl TextLayerExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextLayerExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuestionExtractor for TextLayerExtractor {
    async fn extract_questions(&self, path: &Path) -> ExtractorResult<Vec<String>> {
        let text = pdf_extract::extract_text(path)
            .map_err(|error| ExtractorError::Read(format!("{}: {error}", path.display())))?;
        Ok(questions_from_text(&text))
    }
}

/// Splits raw page text into question strings.
///
/// Lines that start with a numeric enumerator open a new question; every
/// other line is a continuation of the question currently being built, so
/// wrapped stems and attached multiple-choice options stay on their
/// question. Header/footer lines are dropped after merging.
pub(crate) fn questions_from_text(text: &str) -> Vec<String> {
    let text = BLANK_LINES.replace_all(text, "\n");
    let text = HORIZONTAL_WHITESPACE.replace_all(&text, " ");

    let mut merged: Vec<String> = Vec::new();
    let mut buffer = String::new();

    for line in text.split('\n') {
        let line = line.trim();
        if QUESTION_START.is_match(line) {
            if !buffer.is_empty() {
                merged.push(buffer.trim().to_string());
            }
            buffer = line.to_string();
        } else if !line.is_empty() {
            buffer.push(' ');
            buffer.push_str(line);
        }
    }
    if !buffer.is_empty() {
        merged.push(buffer.trim().to_string());
    }

    merged
        .into_iter()
        .filter(|question| !PAGE_FURNITURE.is_match(question))
        .collect()
}
