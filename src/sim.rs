//! Simulation output channel.
//!
//! The simulator harness captures each requested output as a raw byte
//! buffer keyed by a symbolic name. Verification only depends on the
//! [`SimOutput`] trait, so any capture mechanism can be plugged in.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Named-buffer retrieval interface over a finished simulation run.
pub trait SimOutput {
    /// Raw bytes the hardware wrote for the named output.
    fn output(&self, name: &str) -> Result<Vec<u8>>;
}

/// Reads outputs dumped by the simulation harness as one `<name>.bin` file
/// per output UID in a capture directory.
pub struct DirSimOutput {
    dir: PathBuf,
}

impl DirSimOutput {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SimOutput for DirSimOutput {
    fn output(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.dir.join(format!("{name}.bin"));
        fs::read(&path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::MissingOutput(name.to_string())
            } else {
                Error::Io(e)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_named_buffer() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("centroids.bin"), [1u8, 2, 3, 4]).unwrap();
        let sim = DirSimOutput::new(dir.path());
        assert_eq!(sim.output("centroids").unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn missing_buffer_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let sim = DirSimOutput::new(dir.path());
        assert!(matches!(
            sim.output("centroids"),
            Err(Error::MissingOutput(_))
        ));
    }
}
