//! Typed error handling for indexsweep.
//!
//! Library consumers can match on these variants; the CLI bridges them
//! into `miette` diagnostics at the boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for indexsweep operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The index provider violated its contract: a dangling container,
    /// or the same USR reported with conflicting kinds.
    #[error("index inconsistency: {detail}")]
    IndexInconsistency { detail: String },

    /// Invalid configuration, e.g. an entry-point filename that matches
    /// no indexed file.
    #[error("configuration error: {detail}")]
    Configuration { detail: String },

    /// I/O failure with path context.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record in an index file could not be parsed.
    #[error("malformed index record at {}:{line}: {detail}", path.display())]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        detail: String,
    },
}

impl Error {
    pub fn inconsistency(detail: impl Into<String>) -> Self {
        Error::IndexInconsistency {
            detail: detail.into(),
        }
    }

    pub fn configuration(detail: impl Into<String>) -> Self {
        Error::Configuration {
            detail: detail.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
