//! Helpers for integration tests.

use std::collections::HashMap;

use question_analyzer::processing::embedding::{EncodeError, TextEncoder};

/// Deterministic encoder mapping fixed canonical strings to fixed vectors.
pub struct StubEncoder {
    vectors: HashMap<String, Vec<f32>>,
}

impl StubEncoder {
    pub fn new(pairs: &[(&str, &[f32])]) -> Self {
        Self {
            vectors: pairs
                .iter()
                .map(|(text, vector)| (text.to_string(), vector.to_vec()))
                .collect(),
        }
    }
}

impl TextEncoder for StubEncoder {
    fn encode(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>, EncodeError> {
        texts
            .iter()
            .map(|text| {
                self.vectors
                    .get(text)
                    .cloned()
                    .ok_or_else(|| EncodeError::Embed(format!("no stub vector for {text:?}")))
            })
            .collect()
    }
}

/// Encoder that always fails, for exercising model-failure paths.
pub struct FailingEncoder;

impl TextEncoder for FailingEncoder {
    fn encode(&mut self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EncodeError> {
        Err(EncodeError::Embed("model unavailable".to_string()))
    }
}
