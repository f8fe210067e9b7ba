//! Deterministic test vectors and golden-model verification for a hardware
//! k-means clustering kernel.
//!
//! Generation draws seeded Gaussian-blob samples and initial centroids,
//! records the reference iteration count, and persists everything into a
//! burst-aligned binary artifact. Verification pulls the kernel's centroids
//! from the simulation output, recomputes the reference result from the
//! same artifact, and judges the element-wise relative error against a
//! fixed tolerance.

pub mod artifact;
pub mod config;
pub mod datagen;
pub mod error;
pub mod golden;
pub mod sim;
pub mod verify;

pub use artifact::{Artifact, ArtifactWriter, BURST_ALIGNMENT};
pub use config::GenParams;
pub use datagen::{generate, TestVectors};
pub use error::{Error, Result};
pub use golden::golden_model;
pub use sim::{DirSimOutput, SimOutput};
pub use verify::{verify, VerifyOutcome, ERR_THRESHOLD};
