use thiserror::Error;

use crate::artifact::Dtype;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by generation, artifact decoding and verification.
///
/// A tolerance failure is a verdict, not an error: it is reported through
/// [`crate::verify::VerifyOutcome`] and the process exit code, never as a
/// variant here.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("cannot reshape {len} values into a {rows}x{cols} matrix")]
    ShapeMismatch { len: usize, rows: usize, cols: usize },

    #[error("unknown symbol '{0}'")]
    UnknownSymbol(String),

    #[error("symbol '{name}': expected {expected} data, found {found}")]
    DtypeMismatch {
        name: String,
        expected: Dtype,
        found: Dtype,
    },

    #[error("'{name}': {len} bytes is not a multiple of the {elem}-byte element size")]
    TruncatedData {
        name: String,
        len: usize,
        elem: usize,
    },

    #[error("malformed artifact: {0}")]
    Format(String),

    #[error("simulation produced no output named '{0}'")]
    MissingOutput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
