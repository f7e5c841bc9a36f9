//! Page geometry for a sheet of identical labels.
//!
//! All values are PDF points (1/72 inch), origin at the top-left corner of the
//! page, y growing downward (SVG space).

/// Points per millimeter.
pub const MM: f64 = 72.0 / 25.4;
/// A4 portrait.
pub const PAGE_WIDTH: f64 = 210.0 * MM;
pub const PAGE_HEIGHT: f64 = 297.0 * MM;

pub const CELL_WIDTH: f64 = 168.0;
pub const CELL_HEIGHT: f64 = 80.0;
pub const COLUMNS: u32 = 3;

pub const MARGIN: f64 = 5.0 * MM;
pub const MIN_H_SPACING: f64 = 5.0 * MM;
pub const MIN_V_SPACING: f64 = 0.0;

/// Gap between the dashed border and the cell content.
pub const INSET: f64 = 1.0 * MM;
/// Barcode height is the inner cell height divided by this.
pub const BARCODE_HEIGHT_DIVISOR: f64 = 1.75;
/// Space reserved under the bars for the human readable digits.
pub const DIGITS_BAND: f64 = 7.0;
pub const DIGITS_SIZE: f64 = 6.0;
pub const TEXT_SIZE: f64 = 7.0;
/// Baseline distance between the product and the brand line.
pub const LINE_OFFSET: f64 = 10.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn inset(&self, d: f64) -> Rect {
        Rect {
            x: self.x + d,
            y: self.y + d,
            w: (self.w - 2.0 * d).max(0.0),
            h: (self.h - 2.0 * d).max(0.0),
        }
    }

    /// True when the interiors overlap; shared edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        const EPS: f64 = 1e-9;
        self.x < other.right() - EPS
            && other.x < self.right() - EPS
            && self.y < other.bottom() - EPS
            && other.y < self.bottom() - EPS
    }

    pub fn contains(&self, other: &Rect) -> bool {
        const EPS: f64 = 1e-9;
        other.x >= self.x - EPS
            && other.y >= self.y - EPS
            && other.right() <= self.right() + EPS
            && other.bottom() <= self.bottom() + EPS
    }
}

/// Grid of label cells on one page.
///
/// Only one page is produced: when more duplicates are requested than fit,
/// the excess is dropped and reported through [`SheetLayout::dropped`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SheetLayout {
    pub requested: u32,
    pub columns: u32,
    pub rows: u32,
    pub h_spacing: f64,
    pub v_spacing: f64,
}

impl SheetLayout {
    pub fn compute(duplicates: u32) -> Self {
        let columns = COLUMNS;
        let rows = duplicates.div_ceil(columns).min(Self::max_rows());

        let h_spacing = if columns > 1 {
            ((Self::available_width() - columns as f64 * CELL_WIDTH) / (columns - 1) as f64).max(0.0)
        } else {
            0.0
        };
        let v_spacing = if rows > 1 {
            ((Self::available_height() - rows as f64 * CELL_HEIGHT) / (rows - 1) as f64).max(0.0)
        } else {
            0.0
        };

        SheetLayout {
            requested: duplicates,
            columns,
            rows,
            h_spacing,
            v_spacing,
        }
    }

    pub fn available_width() -> f64 {
        PAGE_WIDTH - 2.0 * MARGIN
    }

    pub fn available_height() -> f64 {
        PAGE_HEIGHT - 2.0 * MARGIN
    }

    /// Rows that physically fit with at least the minimum vertical spacing.
    pub fn max_rows() -> u32 {
        ((Self::available_height() + MIN_V_SPACING) / (CELL_HEIGHT + MIN_V_SPACING)).floor() as u32
    }

    pub fn page() -> Rect {
        Rect {
            x: 0.0,
            y: 0.0,
            w: PAGE_WIDTH,
            h: PAGE_HEIGHT,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.rows * self.columns
    }

    pub fn rendered(&self) -> u32 {
        self.requested.min(self.capacity())
    }

    pub fn dropped(&self) -> u32 {
        self.requested - self.rendered()
    }

    /// Border rectangle of cell `i` (row-major).
    pub fn cell(&self, i: u32) -> Rect {
        let col = i % self.columns;
        let row = i / self.columns;
        Rect {
            x: MARGIN + col as f64 * (CELL_WIDTH + self.h_spacing),
            y: MARGIN + row as f64 * (CELL_HEIGHT + self.v_spacing),
            w: CELL_WIDTH,
            h: CELL_HEIGHT,
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = Rect> + '_ {
        (0..self.rendered()).map(|i| self.cell(i))
    }
}

/// Where each element of one label goes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellParts {
    pub border: Rect,
    pub photo: Rect,
    /// Barcode box including the digits band.
    pub barcode: Rect,
    /// Bars only.
    pub bars: Rect,
    pub digits_baseline: f64,
    /// Area for the product and brand lines, above the barcode.
    pub text: Rect,
    pub product_baseline: f64,
    pub brand_baseline: f64,
}

impl CellParts {
    pub fn new(border: Rect) -> Self {
        let inner = border.inset(INSET);
        // Square photo, as tall as the inner cell.
        let photo = Rect {
            x: inner.x,
            y: inner.y,
            w: inner.h,
            h: inner.h,
        };
        let right_w = (inner.w - photo.w).max(0.0);
        let barcode_h = inner.h / BARCODE_HEIGHT_DIVISOR;
        let barcode = Rect {
            x: photo.right(),
            y: inner.bottom() - barcode_h,
            w: right_w,
            h: barcode_h,
        };
        let bars = Rect {
            h: (barcode.h - DIGITS_BAND).max(0.0),
            ..barcode
        };
        let text = Rect {
            x: barcode.x,
            y: inner.y,
            w: right_w,
            h: barcode.y - inner.y,
        };
        let mid = text.y + text.h / 2.0;
        let product_baseline = mid - LINE_OFFSET / 2.0 + TEXT_SIZE * 0.35;

        CellParts {
            border,
            photo,
            barcode,
            bars,
            digits_baseline: barcode.bottom() - 1.0,
            text,
            product_baseline,
            brand_baseline: product_baseline + LINE_OFFSET,
        }
    }

    pub fn text_center_x(&self) -> f64 {
        self.text.x + self.text.w / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_disjoint_and_on_page(layout: &SheetLayout) {
        let cells: Vec<Rect> = layout.cells().collect();
        assert_eq!(cells.len() as u32, layout.rendered());
        let page = SheetLayout::page();
        for (i, a) in cells.iter().enumerate() {
            assert!(page.contains(a), "cell {i} leaves the page: {a:?}");
            for (j, b) in cells.iter().enumerate().skip(i + 1) {
                assert!(!a.overlaps(b), "cells {i} and {j} overlap");
            }
        }
    }

    #[test]
    fn three_columns_fit_across_a4() {
        assert!(3.0 * CELL_WIDTH + 2.0 * MIN_H_SPACING <= SheetLayout::available_width());
        assert_eq!(SheetLayout::max_rows(), 10);
    }

    #[test]
    fn twenty_seven_labels_fill_nine_rows() {
        let layout = SheetLayout::compute(27);
        assert_eq!(layout.columns, 3);
        assert_eq!(layout.rows, 9);
        assert_eq!(layout.rendered(), 27);
        assert_eq!(layout.dropped(), 0);
        assert!(layout.h_spacing >= MIN_H_SPACING);
        assert!(layout.v_spacing >= MIN_V_SPACING);
        assert_disjoint_and_on_page(&layout);
    }

    #[test]
    fn thirty_three_labels_are_capped_to_one_page() {
        let layout = SheetLayout::compute(33);
        assert_eq!(layout.columns, 3);
        assert_eq!(layout.rows, SheetLayout::max_rows());
        assert_eq!(layout.rendered(), 30);
        assert_eq!(layout.dropped(), 3);
        assert_disjoint_and_on_page(&layout);
    }

    #[test]
    fn rows_never_exceed_physical_fit() {
        for n in 1..=120 {
            let layout = SheetLayout::compute(n);
            assert_eq!(layout.columns, 3);
            assert!(layout.rows <= SheetLayout::max_rows(), "n={n}");
            assert!(layout.v_spacing >= 0.0 && layout.h_spacing >= 0.0);
            assert_disjoint_and_on_page(&layout);
        }
    }

    #[test]
    fn cells_span_the_available_area_edge_to_edge() {
        let layout = SheetLayout::compute(27);
        let first = layout.cell(0);
        let last = layout.cell(26);
        assert!((first.x - MARGIN).abs() < 1e-6);
        assert!((first.y - MARGIN).abs() < 1e-6);
        assert!((last.right() - (PAGE_WIDTH - MARGIN)).abs() < 1e-6);
        assert!((last.bottom() - (PAGE_HEIGHT - MARGIN)).abs() < 1e-6);
    }

    #[test]
    fn single_row_has_no_vertical_spacing() {
        let layout = SheetLayout::compute(2);
        assert_eq!(layout.rows, 1);
        assert_eq!(layout.v_spacing, 0.0);
        assert_eq!(layout.rendered(), 2);
        assert_disjoint_and_on_page(&layout);
    }

    #[test]
    fn zero_duplicates_render_nothing() {
        let layout = SheetLayout::compute(0);
        assert_eq!(layout.rows, 0);
        assert_eq!(layout.cells().count(), 0);
    }

    #[test]
    fn cell_parts_stay_inside_border_without_overlap() {
        let layout = SheetLayout::compute(27);
        let parts = CellParts::new(layout.cell(4));
        let inner = parts.border.inset(INSET);
        for r in [parts.photo, parts.barcode, parts.text] {
            assert!(inner.contains(&r), "{r:?} outside {inner:?}");
        }
        assert!(!parts.photo.overlaps(&parts.barcode));
        assert!(!parts.photo.overlaps(&parts.text));
        assert!(!parts.text.overlaps(&parts.barcode));
        assert_eq!(parts.photo.w, parts.photo.h);
        assert!((parts.barcode.h - inner.h / BARCODE_HEIGHT_DIVISOR).abs() < 1e-9);
        assert!((parts.photo.w + parts.barcode.w - inner.w).abs() < 1e-9);
        assert!(parts.product_baseline < parts.brand_baseline);
        assert!(parts.brand_baseline <= parts.text.bottom());
    }
}
