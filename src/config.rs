//! Generation parameter file.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Parameters for one generated test instance, loaded from a JSON config
/// file. `section` and `no_gui` are pass-through knobs for the consuming
/// toolchain and have no effect on the numeric contract.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenParams {
    pub n_samples: u32,
    pub n_features: u32,
    pub n_clusters: u32,
    pub max_iter: u32,
    pub seed: u64,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub no_gui: bool,
}

impl GenParams {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_samples == 0 || self.n_features == 0 || self.n_clusters == 0 {
            return Err(Error::InvalidInput(
                "n_samples, n_features and n_clusters must be positive".into(),
            ));
        }
        if self.n_clusters > self.n_samples {
            return Err(Error::InvalidInput(format!(
                "n_clusters ({}) exceeds n_samples ({})",
                self.n_clusters, self.n_samples
            )));
        }
        if self.max_iter < 1 {
            return Err(Error::InvalidInput("max_iter must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_keys() {
        let cfg: GenParams = serde_json::from_str(
            r#"{
                "n_samples": 100,
                "n_features": 2,
                "n_clusters": 3,
                "max_iter": 50,
                "seed": 42,
                "section": ".wide_spm",
                "no_gui": true
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.n_samples, 100);
        assert_eq!(cfg.seed, 42);
        assert_eq!(cfg.section.as_deref(), Some(".wide_spm"));
        assert!(cfg.no_gui);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn optional_keys_default() {
        let cfg: GenParams = serde_json::from_str(
            r#"{"n_samples": 10, "n_features": 2, "n_clusters": 2, "max_iter": 5, "seed": 0}"#,
        )
        .unwrap();
        assert!(cfg.section.is_none());
        assert!(!cfg.no_gui);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let res: std::result::Result<GenParams, _> = serde_json::from_str(
            r#"{"n_samples": 10, "n_features": 2, "n_clusters": 2, "max_iter": 5, "seed": 0, "bogus": 1}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn validation_rejects_bad_params() {
        let mut cfg: GenParams = serde_json::from_str(
            r#"{"n_samples": 10, "n_features": 2, "n_clusters": 2, "max_iter": 5, "seed": 0}"#,
        )
        .unwrap();
        cfg.n_clusters = 11;
        assert!(cfg.validate().is_err());
        cfg.n_clusters = 2;
        cfg.max_iter = 0;
        assert!(cfg.validate().is_err());
    }
}
