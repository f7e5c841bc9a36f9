use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComposeError {
    /// The photo path does not point at a decodable image.
    #[error("cannot read image {}: {source}", path.display())]
    UnreadableImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("cannot re-encode photo: {0}")]
    Encode(#[from] image::ImageError),

    #[error("barcode: {0}")]
    Barcode(String),

    #[error(transparent)]
    Code(#[from] label_core::Error),

    #[error("scratch file: {0}")]
    Io(#[from] std::io::Error),
}
