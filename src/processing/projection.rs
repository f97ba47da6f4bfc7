use linfa::DatasetBase;
use linfa::dataset::AsTargets;
use linfa::traits::{Fit, Predict};
use linfa_reduction::Pca;
use ndarray::Array2;
use thiserror::Error;

use crate::domain::question::ClusterPoint;

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("failed to fit projection: {0}")]
    Fit(String),
}

/// Projects question embeddings to two dimensions for scatter plotting.
///
/// Returns one point per question, in question-index order, tagged with the
/// index of the cluster that owns the question. Fewer than three points
/// cannot support a two-component fit and are placed at the origin.
pub fn project_clusters(
    embeddings: &[Vec<f32>],
    clusters: &[Vec<usize>],
) -> Result<Vec<ClusterPoint>, ProjectionError> {
    let mut owner = vec![0usize; embeddings.len()];
    for (cluster_index, cluster) in clusters.iter().enumerate() {
        for &question_index in cluster {
            owner[question_index] = cluster_index;
        }
    }

    if embeddings.len() < 3 {
        return Ok(owner
            .into_iter()
            .map(|cluster| ClusterPoint {
                x: 0.0,
                y: 0.0,
                cluster,
            })
            .collect());
    }

    let dimensions = embeddings[0].len();
    let mut records = Array2::<f64>::zeros((embeddings.len(), dimensions));
    for (row, embedding) in embeddings.iter().enumerate() {
        for (column, &value) in embedding.iter().enumerate() {
            records[[row, column]] = f64::from(value);
        }
    }

    let dataset = DatasetBase::from(records);
    let pca = Pca::params(2)
        .fit(&dataset)
        .map_err(|error| ProjectionError::Fit(error.to_string()))?;
    let reduced = pca.predict(&dataset);

    Ok(reduced
        .as_targets()
        .outer_iter()
        .zip(owner)
        .map(|(coords, cluster)| ClusterPoint {
            x: coords[0] as f32,
            y: coords[1] as f32,
            cluster,
        })
        .collect())
}
