//! Crate-wide error type.
//!
//! Construction-time operations (parsing GeoNames source files, reading or
//! writing the binary cache, fetching source data) return [`Result`].
//! Query-time operations (`geocode`, `reverse_geocode`) never do — see the
//! totality contract on [`crate::facade::GeoCoder`].

/// Everything that can go wrong while building or loading a [`crate::GeoCorpus`].
#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed source data at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("cache (de)serialization failed: {0}")]
    Cache(#[from] bincode::Error),

    #[error("fetching source data failed: {0}")]
    Fetch(String),

    #[error("no data directory configured and none could be inferred")]
    NoDataDir,

    #[error("corpus validation failed: {0}")]
    Validation(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, GeoError>;
