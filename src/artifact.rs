//! Binary artifact shared between the hardware run and verification.
//!
//! The artifact is a single file holding named, independently addressable
//! regions: packed little-endian data first, then a JSON symbol table
//! (name, offset, length, dtype), then a fixed 12-byte trailer locating the
//! table. Numeric arrays are aligned to [`BURST_ALIGNMENT`] so a memory
//! transaction never has to be split at a 4 KiB boundary by the consuming
//! hardware.

use std::fmt;
use std::fs;
use std::path::Path;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// AXI splits bursts crossing 4 KiB address boundaries, so array regions
/// start on a 4 KiB boundary.
pub const BURST_ALIGNMENT: usize = 4096;

const MAGIC: &[u8; 4] = b"KMTV";
const VERSION: u32 = 1;
const TRAILER_LEN: usize = 12;

/// Element type of a named region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    U32,
    F64,
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dtype::U32 => write!(f, "u32"),
            Dtype::F64 => write!(f, "f64"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SymbolEntry {
    name: String,
    offset: u64,
    len: u64,
    dtype: Dtype,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    section: Option<String>,
}

/// Builds an artifact region by region and persists it.
#[derive(Default)]
pub struct ArtifactWriter {
    data: Vec<u8>,
    table: Vec<SymbolEntry>,
}

impl ArtifactWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a u32 scalar region.
    pub fn scalar_u32(&mut self, name: &str, value: u32) {
        let offset = self.data.len() as u64;
        self.data.extend_from_slice(&value.to_le_bytes());
        self.table.push(SymbolEntry {
            name: name.to_string(),
            offset,
            len: 4,
            dtype: Dtype::U32,
            section: None,
        });
    }

    /// Appends a row-major f64 array region, padded out to the next
    /// [`BURST_ALIGNMENT`] boundary. `section` is an opaque placement string
    /// recorded for the consuming toolchain.
    pub fn array_f64(&mut self, name: &str, values: &Array2<f64>, section: Option<&str>) {
        while self.data.len() % BURST_ALIGNMENT != 0 {
            self.data.push(0);
        }
        let offset = self.data.len() as u64;
        for v in values.iter() {
            self.data.extend_from_slice(&v.to_le_bytes());
        }
        self.table.push(SymbolEntry {
            name: name.to_string(),
            offset,
            len: (values.len() * 8) as u64,
            dtype: Dtype::F64,
            section: section.map(str::to_string),
        });
    }

    /// Writes data, symbol table and trailer to `path`.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let table = serde_json::to_vec(&self.table)?;
        let mut out = Vec::with_capacity(self.data.len() + table.len() + TRAILER_LEN);
        out.extend_from_slice(&self.data);
        out.extend_from_slice(&table);
        out.extend_from_slice(&(table.len() as u32).to_le_bytes());
        out.extend_from_slice(&VERSION.to_le_bytes());
        out.extend_from_slice(MAGIC);
        fs::write(path, out)?;
        Ok(())
    }
}

/// Read view of a persisted artifact.
pub struct Artifact {
    data: Vec<u8>,
    table: Vec<SymbolEntry>,
}

impl Artifact {
    pub fn open(path: &Path) -> Result<Self> {
        let raw = fs::read(path)?;
        if raw.len() < TRAILER_LEN {
            return Err(Error::Format("file shorter than trailer".into()));
        }
        let trailer = &raw[raw.len() - TRAILER_LEN..];
        if &trailer[8..12] != MAGIC {
            return Err(Error::Format("bad magic".into()));
        }
        let version = u32::from_le_bytes([trailer[4], trailer[5], trailer[6], trailer[7]]);
        if version != VERSION {
            return Err(Error::Format(format!(
                "unsupported artifact version {version}"
            )));
        }
        let table_len =
            u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]) as usize;
        let data_len = raw
            .len()
            .checked_sub(TRAILER_LEN + table_len)
            .ok_or_else(|| Error::Format("symbol table larger than file".into()))?;
        let table: Vec<SymbolEntry> =
            serde_json::from_slice(&raw[data_len..data_len + table_len])?;
        let mut data = raw;
        data.truncate(data_len);
        for entry in &table {
            let end = entry.offset.saturating_add(entry.len);
            if end > data.len() as u64 {
                return Err(Error::Format(format!(
                    "symbol '{}' extends past the data region",
                    entry.name
                )));
            }
        }
        Ok(Self { data, table })
    }

    fn entry(&self, name: &str) -> Result<&SymbolEntry> {
        self.table
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| Error::UnknownSymbol(name.to_string()))
    }

    /// Raw bytes of a named region.
    pub fn symbol(&self, name: &str) -> Result<&[u8]> {
        let entry = self.entry(name)?;
        Ok(&self.data[entry.offset as usize..(entry.offset + entry.len) as usize])
    }

    /// Byte offset of a named region within the artifact.
    pub fn offset_of(&self, name: &str) -> Result<u64> {
        Ok(self.entry(name)?.offset)
    }

    /// Decodes a u32 scalar region.
    pub fn read_u32(&self, name: &str) -> Result<u32> {
        let entry = self.entry(name)?;
        if entry.dtype != Dtype::U32 {
            return Err(Error::DtypeMismatch {
                name: name.to_string(),
                expected: Dtype::U32,
                found: entry.dtype,
            });
        }
        let bytes = self.symbol(name)?;
        if bytes.len() != 4 {
            return Err(Error::TruncatedData {
                name: name.to_string(),
                len: bytes.len(),
                elem: 4,
            });
        }
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Decodes a packed f64 array region.
    pub fn read_f64s(&self, name: &str) -> Result<Vec<f64>> {
        let entry = self.entry(name)?;
        if entry.dtype != Dtype::F64 {
            return Err(Error::DtypeMismatch {
                name: name.to_string(),
                expected: Dtype::F64,
                found: entry.dtype,
            });
        }
        bytes_to_f64s(name, self.symbol(name)?)
    }
}

/// Decodes packed little-endian IEEE-754 doubles. `name` only labels the
/// buffer in error messages.
pub fn bytes_to_f64s(name: &str, bytes: &[u8]) -> Result<Vec<f64>> {
    if bytes.len() % 8 != 0 {
        return Err(Error::TruncatedData {
            name: name.to_string(),
            len: bytes.len(),
            elem: 8,
        });
    }
    Ok(bytes
        .chunks_exact(8)
        .map(|c| {
            let mut b = [0u8; 8];
            b.copy_from_slice(c);
            f64::from_le_bytes(b)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample_artifact() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        let mut w = ArtifactWriter::new();
        w.scalar_u32("n_samples", 4);
        w.scalar_u32("n_clusters", 2);
        w.array_f64("centroids", &array![[1.0, 2.0], [3.0, 4.0]], Some(".l3"));
        w.array_f64("samples", &array![[0.5, 0.5], [1.5, 1.5]], None);
        w.write_to(&path).unwrap();
        (dir, path)
    }

    #[test]
    fn symbols_round_trip() {
        let (_dir, path) = sample_artifact();
        let artifact = Artifact::open(&path).unwrap();
        assert_eq!(artifact.read_u32("n_samples").unwrap(), 4);
        assert_eq!(artifact.read_u32("n_clusters").unwrap(), 2);
        assert_eq!(
            artifact.read_f64s("centroids").unwrap(),
            vec![1.0, 2.0, 3.0, 4.0]
        );
        assert_eq!(
            artifact.read_f64s("samples").unwrap(),
            vec![0.5, 0.5, 1.5, 1.5]
        );
    }

    #[test]
    fn arrays_are_burst_aligned() {
        let (_dir, path) = sample_artifact();
        let artifact = Artifact::open(&path).unwrap();
        assert_eq!(
            artifact.offset_of("centroids").unwrap() % BURST_ALIGNMENT as u64,
            0
        );
        assert_eq!(
            artifact.offset_of("samples").unwrap() % BURST_ALIGNMENT as u64,
            0
        );
        // Distinct regions, not the same boundary.
        assert_ne!(
            artifact.offset_of("centroids").unwrap(),
            artifact.offset_of("samples").unwrap()
        );
    }

    #[test]
    fn unknown_symbol_is_an_error() {
        let (_dir, path) = sample_artifact();
        let artifact = Artifact::open(&path).unwrap();
        assert!(matches!(
            artifact.read_u32("n_features"),
            Err(Error::UnknownSymbol(_))
        ));
    }

    #[test]
    fn dtype_mismatch_is_an_error() {
        let (_dir, path) = sample_artifact();
        let artifact = Artifact::open(&path).unwrap();
        assert!(matches!(
            artifact.read_f64s("n_samples"),
            Err(Error::DtypeMismatch { .. })
        ));
        assert!(matches!(
            artifact.read_u32("centroids"),
            Err(Error::DtypeMismatch { .. })
        ));
    }

    #[test]
    fn bad_magic_is_rejected() {
        let (_dir, path) = sample_artifact();
        let mut raw = std::fs::read(&path).unwrap();
        let n = raw.len();
        raw[n - 1] = b'X';
        std::fs::write(&path, raw).unwrap();
        assert!(matches!(Artifact::open(&path), Err(Error::Format(_))));
    }

    #[test]
    fn odd_length_f64_buffer_is_rejected() {
        assert!(matches!(
            bytes_to_f64s("centroids", &[0u8; 12]),
            Err(Error::TruncatedData { .. })
        ));
    }
}
