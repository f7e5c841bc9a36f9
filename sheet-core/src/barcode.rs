//! EAN-13 symbol encoding and rasterisation.

use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tiny_skia::{Color, Paint, Pixmap, Rect, Transform};

use crate::error::ComposeError;
use crate::{data_uri, encode_rgba_to_png_bytes};

/// Modules in an EAN-13 symbol without quiet zones.
pub const MODULES: usize = 95;
pub const QUIET_LEFT: usize = 11;
pub const QUIET_RIGHT: usize = 7;

/// Raster resolution: pixels per module and bar height.
pub const MODULE_PX: u32 = 4;
pub const BAR_HEIGHT_PX: u32 = 240;
/// How much further the guard bars reach below the data bars.
pub const GUARD_EXTRA_PX: u32 = 20;

// Left-hand odd (L) patterns; G is the reversed complement, R the complement.
const L_CODES: [u8; 10] = [
    0b0001101, 0b0011001, 0b0010011, 0b0111101, 0b0100011, 0b0110001, 0b0101111, 0b0111011,
    0b0110111, 0b0001011,
];
const G_CODES: [u8; 10] = [
    0b0100111, 0b0110011, 0b0011011, 0b0100001, 0b0011101, 0b0111001, 0b0000101, 0b0010001,
    0b0001001, 0b0010111,
];
// Parity of the six left digits, selected by the first digit; bit set = G.
const PARITY: [u8; 10] = [
    0b000000, 0b001011, 0b001101, 0b001110, 0b010011, 0b011001, 0b011100, 0b010101, 0b010110,
    0b011010,
];

fn push_bits(out: &mut Vec<bool>, pattern: u8, width: u32) {
    for shift in (0..width).rev() {
        out.push((pattern >> shift) & 1 == 1);
    }
}

/// Dark (`true`) and light modules of the symbol, left to right.
pub fn modules(code: &str) -> Result<[bool; MODULES], label_core::Error> {
    let d = label_core::ean::digits(code)?;
    let mut bits = Vec::with_capacity(MODULES);
    push_bits(&mut bits, 0b101, 3);
    let parity = PARITY[d[0] as usize];
    for (i, &digit) in d[1..7].iter().enumerate() {
        let use_g = (parity >> (5 - i)) & 1 == 1;
        let pattern = if use_g { G_CODES[digit as usize] } else { L_CODES[digit as usize] };
        push_bits(&mut bits, pattern, 7);
    }
    push_bits(&mut bits, 0b01010, 5);
    for &digit in &d[7..13] {
        push_bits(&mut bits, !L_CODES[digit as usize] & 0x7f, 7);
    }
    push_bits(&mut bits, 0b101, 3);

    let mut out = [false; MODULES];
    out.copy_from_slice(&bits);
    Ok(out)
}

/// Guard bars (start, centre, end) are drawn longer than data bars.
pub fn is_guard(module: usize) -> bool {
    module < 3 || (45..50).contains(&module) || module >= MODULES - 3
}

/// Black bars on white, quiet zones included.
pub fn render_pixmap(code: &str) -> Result<Pixmap, ComposeError> {
    let bits = modules(code)?;
    let width = (QUIET_LEFT + MODULES + QUIET_RIGHT) as u32 * MODULE_PX;
    let mut pixmap = Pixmap::new(width, BAR_HEIGHT_PX)
        .ok_or_else(|| ComposeError::Barcode("pixmap alloc failed".into()))?;
    pixmap.fill(Color::WHITE);

    let mut paint = Paint::default();
    paint.set_color_rgba8(0, 0, 0, 255);
    paint.anti_alias = false;

    for (m, dark) in bits.iter().enumerate() {
        if !dark {
            continue;
        }
        let height = if is_guard(m) {
            BAR_HEIGHT_PX
        } else {
            BAR_HEIGHT_PX - GUARD_EXTRA_PX
        };
        let x = (QUIET_LEFT + m) as u32 * MODULE_PX;
        let rect = Rect::from_xywh(x as f32, 0.0, MODULE_PX as f32, height as f32)
            .ok_or_else(|| ComposeError::Barcode(format!("bad bar rect at module {m}")))?;
        pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }
    Ok(pixmap)
}

pub fn render_png(code: &str) -> Result<Vec<u8>, ComposeError> {
    let pixmap = render_pixmap(code)?;
    encode_rgba_to_png_bytes(pixmap.width(), pixmap.height(), pixmap.data())
        .map_err(|e| ComposeError::Barcode(e.to_string()))
}

/// Barcode PNG living in a temporary file for as long as this value exists.
/// The file is removed on drop, whichever way the caller leaves.
pub struct ScopedBarcode {
    file: NamedTempFile,
}

impl ScopedBarcode {
    pub fn render(code: &str, scratch_dir: &Path) -> Result<Self, ComposeError> {
        let png = render_png(code)?;
        let mut file = tempfile::Builder::new()
            .prefix(&format!("ean13-{code}-"))
            .suffix(".png")
            .tempfile_in(scratch_dir)?;
        file.write_all(&png)?;
        file.flush()?;
        Ok(ScopedBarcode { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn data_uri(&self) -> Result<String, ComposeError> {
        let bytes = fs::read(self.path())?;
        Ok(data_uri("image/png", &bytes))
    }
}
