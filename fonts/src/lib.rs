//! Font bundled at build time for label text.
//!
//! Empty when the build could neither download the font nor copy `FONT_TTF`;
//! callers then rely on system fonts.

pub const FONT_BYTES: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/DejaVuSans.ttf"));

/// File name of the bundled face, for log messages.
pub const FONT_NAME: &str = "DejaVuSans.ttf";

pub fn is_bundled() -> bool {
    !FONT_BYTES.is_empty()
}
