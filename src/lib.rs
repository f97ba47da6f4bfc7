pub mod domain;
pub mod extractors;
pub mod models;
pub mod processing;
pub mod report;

/// Default cosine-similarity threshold for grouping near-duplicate questions.
pub const SIMILARITY_THRESHOLD: f32 = 0.8;
