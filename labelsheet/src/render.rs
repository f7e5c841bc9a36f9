use log::{debug, warn};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Pixel density of the PNG preview.
pub const PREVIEW_DPI: f32 = 150.0;

/// Turns sheet SVG into PDF or PNG bytes with one shared font database.
pub struct Renderer {
    options: usvg::Options<'static>,
}

impl Renderer {
    /// Use `font` when given, else the bundled font, else whatever the system
    /// has installed.
    pub fn new(font: Option<&Path>) -> Result<Self> {
        let mut fontdb = usvg::fontdb::Database::new();
        if let Some(path) = font {
            let data = fs::read(path).map_err(|source| Error::Font {
                path: path.to_path_buf(),
                source,
            })?;
            fontdb.load_font_data(data);
        } else if fonts::is_bundled() {
            debug!("using bundled {}", fonts::FONT_NAME);
            fontdb.load_font_data(fonts::FONT_BYTES.to_vec());
        } else {
            warn!("no bundled font; falling back to system fonts");
            fontdb.load_system_fonts();
        }

        // Map generic 'sans-serif' to the first loaded family
        let family_name = fontdb
            .faces()
            .next()
            .and_then(|face| face.families.first().map(|(n, _)| n.clone()));
        if let Some(name) = family_name {
            debug!("sans-serif family: {name}");
            fontdb.set_sans_serif_family(name);
        }

        let mut options = usvg::Options::default();
        options.fontdb = Arc::new(fontdb);
        Ok(Renderer { options })
    }

    pub fn parse(&self, svg: &str) -> Result<usvg::Tree> {
        usvg::Tree::from_str(svg, &self.options).map_err(|e| Error::Svg(format!("{e:?}")))
    }

    /// One PDF page the size of the SVG, one point per user unit.
    pub fn to_pdf(&self, svg: &str) -> Result<Vec<u8>> {
        let tree = self.parse(svg)?;
        svg2pdf::to_pdf(
            &tree,
            svg2pdf::ConversionOptions::default(),
            svg2pdf::PageOptions::default(),
        )
        .map_err(|e| Error::Pdf(format!("{e:?}")))
    }

    pub fn to_png(&self, svg: &str) -> Result<Vec<u8>> {
        let tree = self.parse(svg)?;
        let scale = PREVIEW_DPI / 72.0;
        let size = tree.size();
        let w_px = (size.width() * scale).ceil() as u32;
        let h_px = (size.height() * scale).ceil() as u32;
        let mut pixmap = tiny_skia::Pixmap::new(w_px, h_px)
            .ok_or_else(|| Error::Preview("pixmap alloc failed".into()))?;
        let mut pm = pixmap.as_mut();
        resvg::render(&tree, tiny_skia::Transform::from_scale(scale, scale), &mut pm);
        sheet_core::encode_rgba_to_png_bytes(pixmap.width(), pixmap.height(), pixmap.data())
            .map_err(|e| Error::Preview(e.to_string()))
    }
}
