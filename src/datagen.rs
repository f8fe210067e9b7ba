//! Seeded test-vector generation.
//!
//! Samples come from well-separated Gaussian blobs; initial centroids are
//! drawn uniformly within the samples' per-feature bounds. All randomness
//! flows from one explicitly seeded stream, so a config file fully
//! determines the artifact.

use std::path::Path;

use ndarray::{Array2, Axis};
use ndarray_rand::RandomExt;
use rand::distributions::Uniform;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use tracing::{debug, info};

use crate::artifact::ArtifactWriter;
use crate::config::GenParams;
use crate::error::Result;
use crate::golden::golden_model;

/// One generated test instance, ready to be persisted.
pub struct TestVectors {
    pub params: GenParams,
    pub samples: Array2<f64>,
    pub initial_centroids: Array2<f64>,
    /// Iterations the golden model took under the configured budget. The
    /// hardware kernel runs exactly this many iterations.
    pub n_iter: u32,
}

/// Generates samples and initial centroids from `params` and records the
/// golden model's iteration count.
pub fn generate(params: &GenParams) -> Result<TestVectors> {
    params.validate()?;
    let n_samples = params.n_samples as usize;
    let n_features = params.n_features as usize;
    let n_clusters = params.n_clusters as usize;

    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    let samples = make_blobs(n_samples, n_features, n_clusters, &mut rng);
    let initial_centroids = initial_centroids(&samples, n_clusters, &mut rng);

    let max_iter = params.max_iter as usize;
    let (_, n_iter) = golden_model(&samples, n_clusters, &initial_centroids, max_iter)?;
    info!(
        n_iter,
        max_iter = params.max_iter,
        "golden model iteration count recorded"
    );

    Ok(TestVectors {
        params: params.clone(),
        samples,
        initial_centroids,
        n_iter: n_iter as u32,
    })
}

/// Draws `n_samples` points from `centers` unit-variance Gaussian blobs
/// whose centers are uniform in a fixed ±10 box. Samples are split evenly
/// across blobs, remainder on the leading ones.
fn make_blobs(
    n_samples: usize,
    n_features: usize,
    centers: usize,
    rng: &mut ChaCha8Rng,
) -> Array2<f64> {
    let blob_centers = Array2::random_using((centers, n_features), Uniform::new(-10.0, 10.0), rng);
    debug!(?centers, "blob centers drawn");

    let mut samples = Array2::<f64>::zeros((n_samples, n_features));
    let base = n_samples / centers;
    let extra = n_samples % centers;
    let mut row = 0;
    for c in 0..centers {
        let count = base + usize::from(c < extra);
        for _ in 0..count {
            for j in 0..n_features {
                let noise: f64 = rng.sample(StandardNormal);
                samples[[row, j]] = blob_centers[[c, j]] + noise;
            }
            row += 1;
        }
    }
    samples
}

/// Uniform draw within the samples' per-feature min/max bounds.
fn initial_centroids(
    samples: &Array2<f64>,
    n_clusters: usize,
    rng: &mut ChaCha8Rng,
) -> Array2<f64> {
    let mins = samples.fold_axis(Axis(0), f64::INFINITY, |m, &v| m.min(v));
    let maxs = samples.fold_axis(Axis(0), f64::NEG_INFINITY, |m, &v| m.max(v));
    let n_features = samples.len_of(Axis(1));
    let mut centroids = Array2::<f64>::zeros((n_clusters, n_features));
    for i in 0..n_clusters {
        for j in 0..n_features {
            centroids[[i, j]] = if maxs[j] > mins[j] {
                rng.gen_range(mins[j]..maxs[j])
            } else {
                mins[j]
            };
        }
    }
    centroids
}

impl TestVectors {
    /// Persists parameters, initial centroids and samples as the artifact
    /// the hardware run and verification both consume.
    pub fn write_artifact(&self, path: &Path) -> Result<()> {
        let mut w = ArtifactWriter::new();
        w.scalar_u32("n_samples", self.params.n_samples);
        w.scalar_u32("n_features", self.params.n_features);
        w.scalar_u32("n_clusters", self.params.n_clusters);
        w.scalar_u32("n_iter", self.n_iter);
        let section = self.params.section.as_deref();
        w.array_f64("centroids", &self.initial_centroids, section);
        w.array_f64("samples", &self.samples, section);
        w.write_to(path)?;
        info!(path = %path.display(), "artifact written");
        Ok(())
    }
}
