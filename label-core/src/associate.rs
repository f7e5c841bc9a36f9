use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::registry::{ImageSlot, Registry};

/// Photo file extensions picked up by a folder scan (compared lowercase).
pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "tif", "tiff"];

/// How an EAN has to appear in a file name to count as a match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchRule {
    /// File name starts with the code and the next character, if any, is
    /// not a digit. `1234567890123_front.jpg` matches, `12345678901234.jpg`
    /// does not.
    #[default]
    Prefix,
    /// Code appears anywhere in the file name.
    Substring,
}

impl MatchRule {
    pub fn matches(self, file_name: &str, code: &str) -> bool {
        match self {
            MatchRule::Prefix => file_name
                .strip_prefix(code)
                .is_some_and(|rest| !rest.starts_with(|c: char| c.is_ascii_digit())),
            MatchRule::Substring => file_name.contains(code),
        }
    }
}

impl FromStr for MatchRule {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "prefix" => Ok(MatchRule::Prefix),
            "substring" => Ok(MatchRule::Substring),
            other => Err(format!("unknown match rule {other:?} (expected prefix or substring)")),
        }
    }
}

#[derive(Debug, Default)]
pub struct ScanReport {
    pub files_scanned: usize,
    /// Final assignment per matched code, in registry order.
    pub matches: Vec<(String, PathBuf)>,
    pub unmatched: Vec<String>,
}

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Image files directly inside `folder` (no recursion), sorted by file name.
/// Returned paths are rooted at the canonical folder path.
pub fn list_image_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let missing = |source: std::io::Error| Error::MissingInput {
        path: folder.to_path_buf(),
        source,
    };
    let root = fs::canonicalize(folder).map_err(missing)?;
    if !root.is_dir() {
        return Err(missing(std::io::Error::other("not a directory")));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(&root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("skipping unreadable entry in {}: {e}", root.display());
                continue;
            }
        };
        let path = entry.path();
        if path.is_file() && is_image_file(path) {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

/// Assign every photo in `folder` whose name matches a registered EAN to that
/// entry's `slot`. When several files match one code the last one in file
/// name order wins. Codes without a match keep their current photo.
pub fn associate_folder(
    registry: &mut Registry,
    folder: &Path,
    slot: ImageSlot,
    rule: MatchRule,
) -> Result<ScanReport> {
    let files = list_image_files(folder)?;
    let codes: Vec<String> = registry.all().iter().map(|e| e.ean.clone()).collect();

    let mut assigned: HashMap<&str, &Path> = HashMap::new();
    for file in &files {
        let Some(name) = file.file_name().map(|n| n.to_string_lossy()) else {
            continue;
        };
        for code in &codes {
            if rule.matches(&name, code) {
                registry.set_image(code, slot, file.as_path())?;
                assigned.insert(code.as_str(), file.as_path());
            }
        }
    }

    let mut report = ScanReport {
        files_scanned: files.len(),
        ..Default::default()
    };
    for code in &codes {
        match assigned.get(code.as_str()) {
            Some(path) => report.matches.push((code.clone(), path.to_path_buf())),
            None => report.unmatched.push(code.clone()),
        }
    }
    info!(
        "{} folder {}: {} file(s), {} code(s) matched, {} unmatched",
        slot.as_str(),
        folder.display(),
        report.files_scanned,
        report.matches.len(),
        report.unmatched.len()
    );
    Ok(report)
}
