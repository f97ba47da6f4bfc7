use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to initialize embedding model: {0}")]
    Init(String),
    #[error("failed to embed text batch: {0}")]
    Embed(String),
}

/// Batch text-to-vector capability consumed by the clustering pipeline.
///
/// Implementations must be length- and order-preserving and deterministic
/// for a fixed model, so clustering results do not depend on batch size or
/// encoding order. Tests inject a stub implementation with fixed vectors.
pub trait TextEncoder {
    fn encode(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>, EncodeError>;
}

/// Production encoder backed by a local fastembed model.
pub struct FastembedEncoder {
    embedder: TextEmbedding,
}

impl FastembedEncoder {
    /// Loads the sentence-embedding model. Model download/initialization
    /// failures are fatal for the request that needed them.
    pub fn try_new() -> Result<Self, EncodeError> {
        let embedder = TextEmbedding::try_new(InitOptions::new(EmbeddingModel::AllMiniLML6V2))
            .map_err(|error| EncodeError::Init(format!("{error:?}")))?;
        Ok(Self { embedder })
    }
}

impl TextEncoder for FastembedEncoder {
    fn encode(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>, EncodeError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let embeddings = self
            .embedder
            .embed(texts.to_vec(), None)
            .map_err(|error| EncodeError::Embed(format!("{error:?}")))?;
        Ok(embeddings
            .into_iter()
            .map(|embedding| normalize_embedding(&embedding))
            .collect())
    }
}

/// Normalize a vector to unit length.
///
/// Returns the original vector when the norm is zero.
pub(crate) fn normalize_embedding(vec: &[f32]) -> Vec<f32> {
    let norm = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        vec.to_vec()
    } else {
        vec.iter().map(|x| x / norm).collect()
    }
}
