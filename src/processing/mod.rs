use serde::Deserialize;

pub mod analyze;
pub mod cluster;
pub mod embedding;
pub mod normalize;
pub mod projection;

#[derive(Deserialize, Debug)]
pub enum AnalyzerMessage {
    Analyze(AnalyzeRequest),
}

/// One batch of documents to cluster together.
#[derive(Deserialize, Debug)]
pub struct AnalyzeRequest {
    /// Paths of the uploaded documents, processed in the given order.
    pub documents: Vec<String>,
    /// Requested similarity threshold; the configured default applies when
    /// absent.
    pub threshold: Option<f32>,
}
