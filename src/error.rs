//! Error types for the I/O edges of the estimator.
//!
//! Estimation itself never fails: incomplete input shows up as `None`
//! cost lines.  Errors only arise while loading catalogs, reading
//! configuration and answering HTTP lookups.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EstimatorError {
    #[error("failed to read catalog file {path:?}: {source}")]
    CatalogIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file {path:?}: {source}")]
    CatalogParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid bind address {addr:?}: {source}")]
    BindAddr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("unknown paper type {0:?}")]
    UnknownPaperType(String),
}

pub type Result<T> = std::result::Result<T, EstimatorError>;
