use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use url::Url;

use crate::extractors::{ExtractorError, ExtractorResult, QuestionExtractor};

/// Messages-API request format.
#[derive(Debug, Serialize)]
struct ExtractionRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

/// Messages-API response format.
#[derive(Debug, Deserialize)]
struct ExtractionResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: String,
}

/// Extraction backend for scanned documents without a usable text layer.
///
/// Pages are rasterized with `pdftoppm` and read with `tesseract`, then the
/// OCR text goes through a single generative extraction call that returns
/// the question strings as a JSON array.
pub struct VisionExtractor {
    api_base: Url,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl VisionExtractor {
    pub fn new(api_base: &str, api_key: String, model: String) -> ExtractorResult<Self> {
        Ok(Self {
            api_base: Url::parse(api_base)
                .map_err(|error| ExtractorError::Build(error.to_string()))?,
            api_key,
            model,
            client: reqwest::Client::new(),
        })
    }

    /// Rasterizes every page of the document into the scratch directory and
    /// returns the page images in page order.
    async fn rasterize(&self, path: &Path, scratch: &Path) -> ExtractorResult<Vec<PathBuf>> {
        let output = Command::new("pdftoppm")
            .arg("-r")
            .arg("200")
            .arg("-png")
            .arg(path)
            .arg(scratch.join("page"))
            .output()
            .await
            .map_err(|error| tool_error("pdftoppm", error))?;
        if !output.status.success() {
            return Err(ExtractorError::Ocr(format!(
                "pdftoppm failed for {}: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let mut entries = std::fs::read_dir(scratch)
            .map_err(|error| ExtractorError::Ocr(format!("failed to list page images: {error}")))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "png"))
            .collect::<Vec<_>>();
        // pdftoppm zero-pads page numbers, so name order is page order.
        entries.sort();
        Ok(entries)
    }

    async fn ocr_page(&self, image: &Path) -> ExtractorResult<String> {
        let output = Command::new("tesseract")
            .arg(image)
            .arg("stdout")
            .output()
            .await
            .map_err(|error| tool_error("tesseract", error))?;
        if !output.status.success() {
            return Err(ExtractorError::Ocr(format!(
                "tesseract failed for {}: {}",
                image.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    async fn extract_via_api(&self, ocr_text: &str) -> ExtractorResult<Vec<String>> {
        let endpoint = self
            .api_base
            .join("v1/messages")
            .map_err(|error| ExtractorError::Build(error.to_string()))?;

        let prompt = format!(
            "The text below was OCR-read from a scanned exam question paper. \
             Extract every question, in document order. Keep each question's \
             sub-parts and multiple-choice options attached to it. Skip page \
             headers, footers and answer-key sections.\n\n\
             Respond ONLY with a JSON array of question strings, no markdown:\n\
             [\"first question\", \"second question\"]\n\n\
             TEXT:\n{ocr_text}"
        );

        let request = ExtractionRequest {
            model: self.model.clone(),
            max_tokens: 4096,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|error| ExtractorError::Api(error.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractorError::Api(format!("{status}: {body}")));
        }

        let response: ExtractionResponse = response
            .json()
            .await
            .map_err(|error| ExtractorError::Parse(error.to_string()))?;
        let text = response
            .content
            .first()
            .map(|block| block.text.as_str())
            .unwrap_or_default();

        parse_question_payload(text)
    }
}

#[async_trait]
impl QuestionExtractor for VisionExtractor {
    async fn extract_questions(&self, path: &Path) -> ExtractorResult<Vec<String>> {
        let scratch = tempfile::tempdir()
            .map_err(|error| ExtractorError::Ocr(format!("failed to create scratch dir: {error}")))?;

        let pages = self.rasterize(path, scratch.path()).await?;
        let mut ocr_text = String::new();
        for page in &pages {
            ocr_text.push_str(&self.ocr_page(page).await?);
            ocr_text.push('\n');
        }
        if ocr_text.trim().is_empty() {
            return Ok(Vec::new());
        }

        self.extract_via_api(&ocr_text).await
    }
}

fn tool_error(tool: &str, error: std::io::Error) -> ExtractorError {
    if error.kind() == std::io::ErrorKind::NotFound {
        ExtractorError::Ocr(format!("{tool} not found on PATH"))
    } else {
        ExtractorError::Ocr(format!("failed to spawn {tool}: {error}"))
    }
}

/// Parses the model's reply into question strings, tolerating a markdown
/// code fence around the JSON array.
fn parse_question_payload(text: &str) -> ExtractorResult<Vec<String>> {
    let trimmed = text.trim();
    let json_text = if trimmed.starts_with("```") {
        trimmed
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
    } else {
        trimmed
    };

    let questions: Vec<String> = serde_json::from_str(json_text)
        .map_err(|error| ExtractorError::Parse(format!("{error}: {json_text:.120}")))?;
    Ok(questions
        .into_iter()
        .map(|question| question.trim().to_string())
        .filter(|question| !question.is_empty())
        .collect())
}
