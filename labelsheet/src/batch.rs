use log::{error, info};
use std::fs;
use std::path::Path;

use label_core::Registry;

use crate::error::{Error, Result};
use crate::render::Renderer;
use crate::sheet::{SheetOutcome, SheetSettings, generate_sheet};

/// Reported after each entry of a batch, whether it succeeded or not.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress<'a> {
    /// 1-based position of the entry just handled.
    pub index: usize,
    pub total: usize,
    pub ean: &'a str,
}

impl Progress<'_> {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        (self.index * 100 / self.total) as u8
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub written: Vec<SheetOutcome>,
    pub failed: Vec<(String, Error)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// One sheet per registry entry, in registry order. A failing entry is logged
/// and recorded; the remaining entries are still generated.
pub fn generate_all<F>(
    registry: &Registry,
    settings: &SheetSettings,
    renderer: &Renderer,
    out_dir: &Path,
    mut on_progress: F,
) -> Result<BatchReport>
where
    F: FnMut(Progress<'_>),
{
    fs::create_dir_all(out_dir).map_err(|source| Error::Write {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let entries = registry.all();
    let total = entries.len();
    let mut report = BatchReport::default();
    for (i, entry) in entries.iter().enumerate() {
        let request = settings.request(entry, out_dir);
        match generate_sheet(&request, settings, renderer) {
            Ok(outcome) => report.written.push(outcome),
            Err(e) => {
                error!("{}: {e}", entry.ean);
                report.failed.push((entry.ean.clone(), e));
            }
        }
        on_progress(Progress {
            index: i + 1,
            total,
            ean: &entry.ean,
        });
    }
    info!(
        "{} sheet(s) written to {}, {} failed",
        report.written.len(),
        out_dir.display(),
        report.failed.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_counts_finished_entries() {
        let p = |index, total| Progress {
            index,
            total,
            ean: "1234567890123",
        };
        assert_eq!(p(1, 4).percent(), 25);
        assert_eq!(p(3, 3).percent(), 100);
        assert_eq!(p(1, 3).percent(), 33);
        assert_eq!(p(0, 0).percent(), 100);
    }

    #[test]
    fn empty_registry_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let registry = Registry::new("/assets/placeholder.png");
        let settings = SheetSettings::from_config(&crate::Config::default());
        let renderer = Renderer::new(None).unwrap();
        let mut calls = 0;

        let report = generate_all(&registry, &settings, &renderer, &out, |_| calls += 1).unwrap();

        assert!(report.is_success());
        assert!(report.written.is_empty());
        assert_eq!(calls, 0);
        assert!(out.is_dir());
    }
}
