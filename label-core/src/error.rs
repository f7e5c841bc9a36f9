use std::path::PathBuf;
use thiserror::Error;

/// Failures reported by registry, import and association operations.
///
/// None of them is fatal: callers skip the offending row, file or code and
/// carry on with the rest of the batch.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid EAN-13 code {code:?}: expected exactly 13 digits")]
    InvalidEan { code: String },

    #[error("EAN {code} is not in the registry")]
    EanNotFound { code: String },

    #[error("cannot read {}: {source}", path.display())]
    MissingInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV {}: {reason}", path.display())]
    MalformedCsv { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
