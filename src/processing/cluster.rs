/// Cosine similarity between two equal-length vectors.
///
/// Returns 0.0 when either vector has zero norm, so empty canonical forms
/// embedded to degenerate vectors never match anything.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Partitions question indices into clusters by greedy anchor scan.
///
/// Indices are scanned in input order. The first unclustered index opens a
/// new cluster and becomes its anchor; every later unclustered index whose
/// similarity to the anchor reaches `threshold` joins that cluster. Members
/// are compared against the anchor only, never against each other, so two
/// near-duplicates can land in different clusters when a closer anchor
/// claims one of them first.
///
/// The returned clusters partition `0..embeddings.len()` exactly, ordered by
/// anchor appearance. `threshold` is assumed to be a valid value in `(0, 1)`;
/// callers sanitize it beforehand.
pub fn cluster_by_similarity(embeddings: &[Vec<f32>], threshold: f32) -> Vec<Vec<usize>> {
    let mut used = vec![false; embeddings.len()];
    let mut clusters = Vec::new();

    for anchor in 0..embeddings.len() {
        if used[anchor] {
            continue;
        }
        used[anchor] = true;
        let mut cluster = vec![anchor];

        for candidate in anchor + 1..embeddings.len() {
            if used[candidate] {
                continue;
            }
            let similarity = cosine_similarity(&embeddings[anchor], &embeddings[candidate]);
            if similarity >= threshold {
                used[candidate] = true;
                cluster.push(candidate);
            }
        }

        clusters.push(cluster);
    }

    clusters
}
