use std::fmt;

use serde::Serialize;

/// Frequency tier of a question cluster, derived from the cluster size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FrequencyLabel {
    Frequent,
    Occasional,
    Rare,
}

impl FrequencyLabel {
    /// Derives the tier from a cluster size. Every cluster contains at least
    /// its anchor, so sizes below one never occur.
    pub fn from_count(count: usize) -> Self {
        if count >= 4 {
            FrequencyLabel::Frequent
        } else if count >= 2 {
            FrequencyLabel::Occasional
        } else {
            FrequencyLabel::Rare
        }
    }

    /// User-facing tier text, also used for the `Cluster` report column.
    pub fn as_str(&self) -> &'static str {
        match self {
            FrequencyLabel::Frequent => "Frequently Asked",
            FrequencyLabel::Occasional => "Occasionally Asked",
            FrequencyLabel::Rare => "Rarely Asked",
        }
    }
}

impl fmt::Display for FrequencyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cluster of near-duplicate questions, keyed by its anchor text.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionGroup {
    pub representative: String,
    pub count: usize,
    pub variants: Vec<String>,
}

/// Per-label bucket of question groups, in cluster-formation order.
#[derive(Debug, Clone, Serialize)]
pub struct LabelBucket {
    pub label: FrequencyLabel,
    pub groups: Vec<QuestionGroup>,
}

/// Grouped analysis result. Buckets are ordered by the first appearance of
/// their label in the labeled-cluster stream, not by tier severity.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupedQuestions {
    pub buckets: Vec<LabelBucket>,
}

impl GroupedQuestions {
    /// Appends a group to the bucket for `label`, creating the bucket at the
    /// end of the list on the label's first appearance.
    pub fn push(&mut self, label: FrequencyLabel, group: QuestionGroup) {
        match self.buckets.iter_mut().find(|bucket| bucket.label == label) {
            Some(bucket) => bucket.groups.push(group),
            None => self.buckets.push(LabelBucket {
                label,
                groups: vec![group],
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of clusters across all buckets.
    pub fn cluster_count(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.groups.len()).sum()
    }
}

/// 2-D projection of one question's embedding, tagged with its cluster index.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterPoint {
    pub x: f32,
    pub y: f32,
    pub cluster: usize,
}
