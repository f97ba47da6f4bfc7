use std::path::Path;

use futures::future;
use thiserror::Error;

use crate::domain::question::{FrequencyLabel, GroupedQuestions, QuestionGroup};
use crate::extractors::QuestionExtractor;
use crate::extractors::textlayer::TextLayerExtractor;
use crate::extractors::vision::VisionExtractor;
use crate::models::config::AnalyzerConfig;
use crate::processing::AnalyzeRequest;
use crate::processing::cluster::cluster_by_similarity;
use crate::processing::embedding::{EncodeError, FastembedEncoder, TextEncoder};
use crate::processing::normalize::canonical_form;
use crate::processing::projection::project_clusters;
use crate::report::write_cluster_report;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// One labeled cluster, ordered as the clusters were formed.
#[derive(Debug, Clone)]
pub struct LabeledCluster {
    pub label: FrequencyLabel,
    pub representative: String,
    pub count: usize,
    pub questions: Vec<String>,
}

/// Outcome of the pure clustering core for one request.
#[derive(Debug, Default)]
pub struct Analysis {
    pub grouped: GroupedQuestions,
    /// Cluster partition over the input indices, anchor first.
    pub clusters: Vec<Vec<usize>>,
    /// Unit-normalized embedding per input question.
    pub embeddings: Vec<Vec<f32>>,
}

#[derive(Default)]
struct AnalyzeStats {
    documents_loaded: usize,
    documents_failed: usize,
    questions_extracted: usize,
    clusters_formed: usize,
    frequent: usize,
    occasional: usize,
    rare: usize,
}

/// Assigns a frequency tier to every cluster.
///
/// The representative is the raw text of the cluster's anchor. Cluster order
/// is preserved.
pub fn label_clusters(questions: &[String], clusters: &[Vec<usize>]) -> Vec<LabeledCluster> {
    clusters
        .iter()
        .map(|cluster| {
            let variants: Vec<String> = cluster
                .iter()
                .map(|&index| questions[index].clone())
                .collect();
            LabeledCluster {
                label: FrequencyLabel::from_count(cluster.len()),
                representative: variants[0].clone(),
                count: cluster.len(),
                questions: variants,
            }
        })
        .collect()
}

/// Re-keys labeled clusters by their tier, preserving cluster-formation
/// order within buckets and first-appearance order across buckets.
pub fn group_by_label(labeled: Vec<LabeledCluster>) -> GroupedQuestions {
    let mut grouped = GroupedQuestions::default();
    for cluster in labeled {
        grouped.push(
            cluster.label,
            QuestionGroup {
                representative: cluster.representative,
                count: cluster.count,
                variants: cluster.questions,
            },
        );
    }
    grouped
}

/// Sanitizes the requested threshold before it reaches the clustering
/// engine, which assumes a valid value in `(0, 1)`.
pub fn resolve_threshold(requested: Option<f32>, fallback: f32) -> f32 {
    let threshold = requested.unwrap_or(fallback);
    if !threshold.is_finite() {
        log::warn!("Similarity threshold {threshold} is not finite; using {fallback}");
        return fallback;
    }
    if threshold <= 0.0 || threshold >= 1.0 {
        let clamped = threshold.clamp(0.05, 0.95);
        log::warn!("Similarity threshold {threshold} outside (0, 1); clamping to {clamped}");
        return clamped;
    }
    threshold
}

/// Runs the deduplication core over one batch of raw questions.
///
/// Questions are normalized to their canonical forms, embedded in a single
/// batch, clustered by anchor similarity, labeled by frequency and grouped
/// by label. An empty batch yields an empty analysis without touching the
/// encoder; an encoding failure aborts the whole request.
pub fn analyze_questions<E: TextEncoder>(
    questions: &[String],
    threshold: f32,
    encoder: &mut E,
) -> Result<Analysis, AnalysisError> {
    if questions.is_empty() {
        return Ok(Analysis::default());
    }

    let canonical: Vec<String> = questions
        .iter()
        .map(|question| canonical_form(question))
        .collect();
    let embeddings = encoder.encode(&canonical)?;

    let clusters = cluster_by_similarity(&embeddings, threshold);
    let labeled = label_clusters(questions, &clusters);
    let grouped = group_by_label(labeled);

    Ok(Analysis {
        grouped,
        clusters,
        embeddings,
    })
}

fn build_extractor(
    config: &AnalyzerConfig,
) -> Option<Box<dyn QuestionExtractor + Send + Sync>> {
    match config.extractor.as_str() {
        "textlayer" => Some(Box::new(TextLayerExtractor::new())),
        "vision" => {
            let api_key = match std::env::var(&config.vision.api_key_env) {
                Ok(key) => key,
                Err(_) => {
                    log::error!(
                        "Vision extractor requires {} to be set",
                        config.vision.api_key_env
                    );
                    return None;
                }
            };
            match VisionExtractor::new(&config.vision.api_base, api_key, config.vision.model.clone())
            {
                Ok(extractor) => Some(Box::new(extractor)),
                Err(error) => {
                    log::error!("Failed to build vision extractor: {error}");
                    None
                }
            }
        }
        other => {
            log::error!("Unknown extractor: {other}");
            None
        }
    }
}

/// Handles one analyze message end to end: extraction fan-out, clustering,
/// report and projection artifacts, and the completion summary.
pub async fn process_analyze_message(msg: AnalyzeRequest, config: &AnalyzerConfig) {
    log::info!("Received analyze request for {} document(s)", msg.documents.len());

    let mut stats = AnalyzeStats::default();

    let Some(extractor) = build_extractor(config) else {
        return;
    };

    let tasks = msg
        .documents
        .iter()
        .map(|document| async { extractor.extract_questions(document.as_ref()).await });
    let outcomes = future::join_all(tasks).await;

    let mut questions: Vec<String> = Vec::new();
    for (document, outcome) in msg.documents.iter().zip(outcomes) {
        match outcome {
            Ok(extracted) => {
                stats.documents_loaded += 1;
                questions.extend(extracted);
            }
            Err(error) => {
                stats.documents_failed += 1;
                log::error!("Failed to extract questions from {document}: {error}");
            }
        }
    }
    stats.questions_extracted = questions.len();

    if questions.is_empty() {
        log::warn!("No questions found in the uploaded documents");
        if let Err(error) = write_cluster_report(Path::new(&config.report_path), &GroupedQuestions::default()) {
            log::error!("Failed to write report to {}: {error}", config.report_path);
        }
        log_summary(&stats, config);
        return;
    }

    let threshold = resolve_threshold(msg.threshold, config.similarity_threshold);

    let mut encoder = match FastembedEncoder::try_new() {
        Ok(encoder) => encoder,
        Err(error) => {
            log::error!("Failed to initialize embedder: {error}");
            return;
        }
    };

    let analysis = match analyze_questions(&questions, threshold, &mut encoder) {
        Ok(analysis) => analysis,
        Err(error) => {
            log::error!("Failed to analyze questions: {error}");
            return;
        }
    };

    stats.clusters_formed = analysis.clusters.len();
    for bucket in &analysis.grouped.buckets {
        match bucket.label {
            FrequencyLabel::Frequent => stats.frequent += bucket.groups.len(),
            FrequencyLabel::Occasional => stats.occasional += bucket.groups.len(),
            FrequencyLabel::Rare => stats.rare += bucket.groups.len(),
        }
    }

    if let Err(error) = write_cluster_report(Path::new(&config.report_path), &analysis.grouped) {
        log::error!("Failed to write report to {}: {error}", config.report_path);
    }

    if let Some(projection_path) = &config.projection_path {
        match project_clusters(&analysis.embeddings, &analysis.clusters) {
            Ok(points) => match serde_json::to_string(&points) {
                Ok(payload) => {
                    if let Err(error) = std::fs::write(projection_path, payload) {
                        log::error!("Failed to write projection to {projection_path}: {error}");
                    }
                }
                Err(error) => log::error!("Failed to serialize projection: {error}"),
            },
            Err(error) => log::error!("Failed to project embeddings: {error}"),
        }
    }

    log_summary(&stats, config);
}

fn log_summary(stats: &AnalyzeStats, config: &AnalyzerConfig) {
    log::info!(
        "Finished analyze request: documents_loaded={}, documents_failed={}, questions_extracted={}, clusters_formed={}, frequent={}, occasional={}, rare={}, report={}",
        stats.documents_loaded,
        stats.documents_failed,
        stats.questions_extracted,
        stats.clusters_formed,
        stats.frequent,
        stats.occasional,
        stats.rare,
        config.report_path,
    );
}

#[cfg(test)]
mod tests {
    use super::{group_by_label, label_clusters, resolve_threshold};
    use crate::domain::question::FrequencyLabel;

    fn questions(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|text| text.to_string()).collect()
    }

    #[test]
    fn labels_use_the_anchor_as_representative() {
        let questions = questions(&["What is DBMS?", "Define DBMS.", "Explain normalization."]);
        let clusters = vec![vec![0, 1], vec![2]];

        let labeled = label_clusters(&questions, &clusters);

        assert_eq!(labeled.len(), 2);
        assert_eq!(labeled[0].representative, "What is DBMS?");
        assert_eq!(labeled[0].count, 2);
        assert_eq!(labeled[0].label, FrequencyLabel::Occasional);
        assert_eq!(labeled[0].questions, vec!["What is DBMS?", "Define DBMS."]);
        assert_eq!(labeled[1].label, FrequencyLabel::Rare);
    }

    #[test]
    fn grouping_preserves_cluster_order_within_buckets() {
        let questions = questions(&["a", "b", "c", "d", "e"]);
        let clusters = vec![vec![0], vec![1, 2], vec![3], vec![4]];

        let grouped = group_by_label(label_clusters(&questions, &clusters));

        assert_eq!(grouped.buckets.len(), 2);
        assert_eq!(grouped.buckets[0].label, FrequencyLabel::Rare);
        assert_eq!(
            grouped.buckets[0]
                .groups
                .iter()
                .map(|group| group.representative.as_str())
                .collect::<Vec<_>>(),
            vec!["a", "d", "e"]
        );
        assert_eq!(grouped.buckets[1].label, FrequencyLabel::Occasional);
    }

    #[test]
    fn threshold_passes_through_when_valid() {
        assert_eq!(resolve_threshold(Some(0.75), 0.8), 0.75);
        assert_eq!(resolve_threshold(None, 0.8), 0.8);
    }

    #[test]
    fn threshold_clamps_out_of_range_values() {
        assert_eq!(resolve_threshold(Some(0.0), 0.8), 0.05);
        assert_eq!(resolve_threshold(Some(-3.0), 0.8), 0.05);
        assert_eq!(resolve_threshold(Some(1.0), 0.8), 0.95);
        assert_eq!(resolve_threshold(Some(42.0), 0.8), 0.95);
    }

    #[test]
    fn threshold_falls_back_when_not_finite() {
        assert_eq!(resolve_threshold(Some(f32::NAN), 0.8), 0.8);
        assert_eq!(resolve_threshold(Some(f32::INFINITY), 0.8), 0.8);
    }
}
