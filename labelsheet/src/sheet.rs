use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use label_core::{CodeEntry, ImageSlot};
use sheet_core::{SheetLayout, build_sheet_svg, load_photo};

use crate::config::{Config, FileNaming};
use crate::error::{Error, Result};
use crate::render::Renderer;

/// Per-run settings applied to every sheet of a batch.
#[derive(Clone, Debug)]
pub struct SheetSettings {
    pub duplicates: u32,
    pub photo: ImageSlot,
    pub naming: FileNaming,
    pub scratch_dir: PathBuf,
    pub preview: bool,
}

impl SheetSettings {
    pub fn from_config(config: &Config) -> Self {
        SheetSettings {
            duplicates: config.duplicates,
            photo: config.photo,
            naming: config.naming,
            scratch_dir: config.scratch_path(),
            preview: config.preview,
        }
    }

    pub fn request<'a>(&self, entry: &'a CodeEntry, out_dir: &Path) -> LabelSheetRequest<'a> {
        LabelSheetRequest {
            entry,
            duplicates: self.duplicates,
            output: out_dir.join(self.naming.file_name(&entry.ean)),
        }
    }
}

/// One sheet to write.
#[derive(Clone, Debug)]
pub struct LabelSheetRequest<'a> {
    pub entry: &'a CodeEntry,
    pub duplicates: u32,
    pub output: PathBuf,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SheetOutcome {
    pub ean: String,
    pub path: PathBuf,
    pub requested: u32,
    pub rendered: u32,
    pub preview: Option<PathBuf>,
}

impl SheetOutcome {
    pub fn dropped(&self) -> u32 {
        self.requested - self.rendered
    }
}

/// Write the PDF for `request`, plus `<ean>_preview.png` next to it when
/// previews are on.
pub fn generate_sheet(
    request: &LabelSheetRequest<'_>,
    settings: &SheetSettings,
    renderer: &Renderer,
) -> Result<SheetOutcome> {
    let entry = request.entry;
    if request.duplicates == 0 {
        return Err(Error::InvalidRequest(format!(
            "{}: duplicates must be at least 1",
            entry.ean
        )));
    }

    let photo = load_photo(entry.image(settings.photo))?;
    let layout = SheetLayout::compute(request.duplicates);
    if layout.dropped() > 0 {
        warn!(
            "{}: only {} of {} labels fit on one page, {} dropped",
            entry.ean,
            layout.rendered(),
            layout.requested,
            layout.dropped()
        );
    }

    let svg = build_sheet_svg(entry, &photo, &layout, &settings.scratch_dir)?;
    let pdf = renderer.to_pdf(&svg)?;
    write_file(&request.output, &pdf)?;

    let preview = if settings.preview {
        let path = request
            .output
            .with_file_name(format!("{}_preview.png", entry.ean));
        write_file(&path, &renderer.to_png(&svg)?)?;
        Some(path)
    } else {
        None
    };

    info!(
        "{}: wrote {} ({} labels)",
        entry.ean,
        request.output.display(),
        layout.rendered()
    );
    Ok(SheetOutcome {
        ean: entry.ean.clone(),
        path: request.output.clone(),
        requested: layout.requested,
        rendered: layout.rendered(),
        preview,
    })
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}
