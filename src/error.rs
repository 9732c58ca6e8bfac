//! Error type shared by the loader, simplifier, namer and writer.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Input path does not exist.
    #[error("No such file or directory: '{}'", path.display())]
    NotFound { path: PathBuf },

    /// Input extension is not one of the recognised vector formats.
    #[error("Unrecognised vector file format: '{}'", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: geojson::Error,
    },

    /// A geometry could not be simplified (degenerate ring, non-finite coordinate).
    #[error("Invalid geometry in feature {feature}: {reason}")]
    Geometry { feature: usize, reason: String },

    #[error("Invalid tolerance {0}: must be finite and non-negative")]
    InvalidTolerance(f64),

    #[error("Failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Output exists and the conflict policy forbids touching it.
    #[error("Output file already exists: '{}'", path.display())]
    OutputExists { path: PathBuf },

    #[error("Failed to read answer from prompt: {0}")]
    Prompt(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
