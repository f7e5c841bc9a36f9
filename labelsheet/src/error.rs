use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Code(#[from] label_core::Error),

    #[error(transparent)]
    Compose(#[from] sheet_core::ComposeError),

    #[error("SVG parse error: {0}")]
    Svg(String),

    #[error("PDF conversion failed: {0}")]
    Pdf(String),

    #[error("invalid sheet request: {0}")]
    InvalidRequest(String),

    #[error("preview rendering failed: {0}")]
    Preview(String),

    #[error("cannot load font {}: {source}", path.display())]
    Font {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    #[error("cannot serialise listing: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
