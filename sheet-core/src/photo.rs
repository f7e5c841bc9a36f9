use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;

use crate::data_uri;
use crate::error::ComposeError;

/// Longest edge of an embedded photo. Cells are under 30 mm tall, so this is
/// well above print resolution.
pub const PHOTO_MAX_PX: u32 = 600;
const JPEG_QUALITY: u8 = 85;

/// A decoded photo ready to be referenced from the sheet SVG.
#[derive(Clone, Debug)]
pub struct EmbeddedImage {
    pub data_uri: String,
    pub width: u32,
    pub height: u32,
}

/// Decode any supported photo (JPEG, PNG, GIF, TIFF, ...), shrink it and
/// re-encode it as a data URI. Opaque photos become JPEG, photos with an
/// alpha channel stay PNG.
pub fn load_photo(path: &Path) -> Result<EmbeddedImage, ComposeError> {
    let img = image::open(path).map_err(|source| ComposeError::UnreadableImage {
        path: path.to_path_buf(),
        source,
    })?;
    embed(img)
}

pub fn embed(img: DynamicImage) -> Result<EmbeddedImage, ComposeError> {
    let img = if img.width() > PHOTO_MAX_PX || img.height() > PHOTO_MAX_PX {
        img.thumbnail(PHOTO_MAX_PX, PHOTO_MAX_PX)
    } else {
        img
    };

    let mut buf = Vec::new();
    let mime = if img.color().has_alpha() {
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
        "image/png"
    } else {
        JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY).encode_image(&img.to_rgb8())?;
        "image/jpeg"
    };
    Ok(EmbeddedImage {
        data_uri: data_uri(mime, &buf),
        width: img.width(),
        height: img.height(),
    })
}
