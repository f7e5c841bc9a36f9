use log::debug;
use std::fmt::Write as _;
use std::path::Path;

use label_core::CodeEntry;

use crate::barcode::ScopedBarcode;
use crate::error::ComposeError;
use crate::layout::{CellParts, DIGITS_SIZE, PAGE_HEIGHT, PAGE_WIDTH, Rect, TEXT_SIZE};
use crate::photo::EmbeddedImage;
use crate::svg_escape;

const BORDER_WIDTH: f64 = 0.5;
// Dash on 1, gap 2, as on the printed sheets.
const BORDER_DASH: &str = "1 2";

/// Build one A4 page (in points) holding `layout.rendered()` identical labels
/// for `entry`.
///
/// Each cell gets a freshly rendered barcode written to a temporary file in
/// `scratch_dir`; the file is gone again before the next cell is drawn.
pub fn build_sheet_svg(
    entry: &CodeEntry,
    photo: &EmbeddedImage,
    layout: &crate::SheetLayout,
    scratch_dir: &Path,
) -> Result<String, ComposeError> {
    let mut s = String::new();
    s.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        s,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{w:.2}\" height=\"{h:.2}\" viewBox=\"0 0 {w:.2} {h:.2}\" font-family=\"sans-serif\">",
        w = PAGE_WIDTH,
        h = PAGE_HEIGHT
    );
    s.push_str("<rect x=\"0\" y=\"0\" width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>\n");

    let product = svg_escape(&format!("Product: {}", entry.product));
    let brand = svg_escape(&format!("Brand: {}", entry.brand));

    for (i, cell) in layout.cells().enumerate() {
        let parts = CellParts::new(cell);
        let barcode = ScopedBarcode::render(&entry.ean, scratch_dir)?;
        let barcode_uri = barcode.data_uri()?;
        drop(barcode);

        s.push_str("<g>\n");
        let _ = writeln!(
            s,
            "<rect {} fill=\"none\" stroke=\"#000\" stroke-width=\"{BORDER_WIDTH}\" stroke-dasharray=\"{BORDER_DASH}\"/>",
            rect_attrs(&parts.border)
        );
        push_image(&mut s, &parts.photo, &photo.data_uri);
        push_image(&mut s, &parts.bars, &barcode_uri);
        let _ = writeln!(
            s,
            "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"{DIGITS_SIZE}\" text-anchor=\"middle\" fill=\"#000\">{}</text>",
            parts.barcode.x + parts.barcode.w / 2.0,
            parts.digits_baseline,
            entry.ean
        );
        let _ = writeln!(
            s,
            "<clipPath id=\"text-{i}\"><rect {}/></clipPath>",
            rect_attrs(&parts.text)
        );
        let _ = writeln!(
            s,
            "<g clip-path=\"url(#text-{i})\" font-size=\"{TEXT_SIZE}\" text-anchor=\"middle\" fill=\"#000\">"
        );
        let cx = parts.text_center_x();
        let _ = writeln!(s, "<text x=\"{cx:.2}\" y=\"{:.2}\">{product}</text>", parts.product_baseline);
        let _ = writeln!(s, "<text x=\"{cx:.2}\" y=\"{:.2}\">{brand}</text>", parts.brand_baseline);
        s.push_str("</g>\n</g>\n");
    }

    s.push_str("</svg>\n");
    debug!(
        "sheet for {}: {} of {} label(s), {} bytes of SVG",
        entry.ean,
        layout.rendered(),
        layout.requested,
        s.len()
    );
    Ok(s)
}

fn rect_attrs(r: &Rect) -> String {
    format!(
        "x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\"",
        r.x, r.y, r.w, r.h
    )
}

// Aspect ratio is forced to the target box.
fn push_image(s: &mut String, r: &Rect, href: &str) {
    let _ = writeln!(
        s,
        "<image {} preserveAspectRatio=\"none\" xlink:href=\"{href}\"/>",
        rect_attrs(r)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SheetLayout;
    use crate::photo::embed;
    use image::{DynamicImage, RgbImage};
    use std::path::PathBuf;

    fn entry(product: &str, brand: &str) -> CodeEntry {
        CodeEntry {
            ean: "1234567890123".into(),
            product: product.into(),
            brand: brand.into(),
            product_image: PathBuf::from("/p.png"),
            model_image: PathBuf::from("/m.png"),
        }
    }

    fn photo() -> EmbeddedImage {
        embed(DynamicImage::ImageRgb8(RgbImage::new(8, 8))).unwrap()
    }

    #[test]
    fn one_dashed_border_per_rendered_label() {
        let dir = tempfile::tempdir().unwrap();
        let layout = SheetLayout::compute(33);
        let svg = build_sheet_svg(&entry("Widget", "Acme"), &photo(), &layout, dir.path()).unwrap();
        assert_eq!(svg.matches("stroke-dasharray").count(), 30);
        assert_eq!(svg.matches("Product: Widget").count(), 30);
        assert_eq!(svg.matches("Brand: Acme").count(), 30);
        assert_eq!(svg.matches("data:image/png;base64,").count(), 30);
        assert_eq!(svg.matches("data:image/jpeg;base64,").count(), 30);
    }

    #[test]
    fn scratch_dir_is_empty_afterwards() {
        let dir = tempfile::tempdir().unwrap();
        let layout = SheetLayout::compute(27);
        build_sheet_svg(&entry("Widget", "Acme"), &photo(), &layout, dir.path()).unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn text_is_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let layout = SheetLayout::compute(1);
        let svg = build_sheet_svg(&entry("Salt & <Pepper>", "\"Q\""), &photo(), &layout, dir.path()).unwrap();
        assert!(svg.contains("Product: Salt &amp; &lt;Pepper&gt;"));
        assert!(svg.contains("Brand: &quot;Q&quot;"));
        assert!(!svg.contains("<Pepper>"));
    }

    #[test]
    fn control_characters_from_spreadsheets_do_not_reach_the_svg() {
        let dir = tempfile::tempdir().unwrap();
        let layout = SheetLayout::compute(1);
        let svg = build_sheet_svg(&entry("Widget\u{0b}XL", "Ac\u{1}me"), &photo(), &layout, dir.path()).unwrap();
        assert!(svg.contains("Product: Widget XL"));
        assert!(svg.contains("Brand: Ac me"));
        assert!(!svg.contains('\u{0b}'));
        assert!(!svg.contains('\u{1}'));
    }

    #[test]
    fn invalid_code_fails_without_leaving_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut bad = entry("Widget", "Acme");
        bad.ean = "123".into();
        let err = build_sheet_svg(&bad, &photo(), &SheetLayout::compute(3), dir.path()).unwrap_err();
        assert!(matches!(err, ComposeError::Code(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
