//! Software reference ("golden") k-means computation.
//!
//! Lloyd's algorithm with externally supplied initial centroids, so the
//! result is a pure function of its inputs and can be recomputed during
//! verification under the exact conditions the hardware kernel ran with.

use ndarray::{Array2, ArrayView1, Axis};
use rayon::prelude::*;
use tracing::debug;

use crate::error::{Error, Result};

/// Early-stop threshold on the squared Frobenius norm of the centroid shift
/// between consecutive iterations.
pub const CONVERGENCE_TOL: f64 = 1e-4;

/// Runs Lloyd's k-means from the given initial centroids.
///
/// Returns the final centroids and the number of iterations actually
/// performed (at most `max_iter`). Samples tied between centroids go to the
/// lowest centroid index; a centroid with no assigned samples keeps its
/// previous position.
pub fn golden_model(
    samples: &Array2<f64>,
    n_clusters: usize,
    initial_centroids: &Array2<f64>,
    max_iter: usize,
) -> Result<(Array2<f64>, usize)> {
    let n_samples = samples.len_of(Axis(0));
    let n_features = samples.len_of(Axis(1));

    if n_samples == 0 {
        return Err(Error::InvalidInput("empty sample set".into()));
    }
    if initial_centroids.len_of(Axis(1)) != n_features {
        return Err(Error::InvalidInput(format!(
            "samples have {} features but initial centroids have {}",
            n_features,
            initial_centroids.len_of(Axis(1)),
        )));
    }
    if initial_centroids.len_of(Axis(0)) != n_clusters {
        return Err(Error::InvalidInput(format!(
            "expected {} initial centroids, got {}",
            n_clusters,
            initial_centroids.len_of(Axis(0)),
        )));
    }
    if n_clusters > n_samples {
        return Err(Error::InvalidInput(format!(
            "n_clusters ({n_clusters}) exceeds n_samples ({n_samples})"
        )));
    }
    if max_iter < 1 {
        return Err(Error::InvalidInput("max_iter must be at least 1".into()));
    }

    let mut centroids = initial_centroids.clone();
    let mut n_iter = 0;

    for iter_idx in 1..=max_iter {
        // Assign samples to their nearest centroid.
        let labels = assign_labels(samples, &centroids);

        // Recompute each centroid as the mean of its assigned samples.
        let mut new_centroids = Array2::<f64>::zeros((n_clusters, n_features));
        let mut counts = vec![0usize; n_clusters];
        samples
            .axis_iter(Axis(0))
            .zip(labels.iter())
            .for_each(|(x, &label)| {
                new_centroids
                    .row_mut(label)
                    .zip_mut_with(&x, |a, &b| *a += b);
                counts[label] += 1;
            });
        for (i, mut c) in new_centroids.axis_iter_mut(Axis(0)).enumerate() {
            if counts[i] > 0 {
                c.mapv_inplace(|v| v / counts[i] as f64);
            } else {
                // Empty cluster: the centroid stays where it was.
                c.assign(&centroids.row(i));
            }
        }

        let shift = (&new_centroids - &centroids).mapv(|v| v * v).sum();
        centroids = new_centroids;
        n_iter = iter_idx;
        debug!(iter_idx, shift, "lloyd iteration");
        if shift <= CONVERGENCE_TOL {
            break;
        }
    }

    Ok((centroids, n_iter))
}

/// Assigns each sample to the centroid with minimum squared Euclidean
/// distance, ties broken by the lowest centroid index.
fn assign_labels(samples: &Array2<f64>, centroids: &Array2<f64>) -> Vec<usize> {
    let n_samples = samples.len_of(Axis(0));
    let n_centroids = centroids.len_of(Axis(0));
    (0..n_samples)
        .into_par_iter()
        .map(|i| {
            let x = samples.row(i);
            let mut min_dist = f64::INFINITY;
            let mut min_j = 0;
            for j in 0..n_centroids {
                let dist = squared_distance(&x, &centroids.row(j));
                if dist < min_dist {
                    min_dist = dist;
                    min_j = j;
                }
            }
            min_j
        })
        .collect()
}

fn squared_distance(x: &ArrayView1<f64>, y: &ArrayView1<f64>) -> f64 {
    x.iter().zip(y.iter()).map(|(a, b)| (a - b) * (a - b)).sum()
}
