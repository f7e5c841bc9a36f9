use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use label_core::{ImageSlot, MatchRule};

use crate::error::{Error, Result};

pub const DEFAULT_DUPLICATES: u32 = 33;
const PLACEHOLDER_FILE: &str = "placeholder.png";

/// How output PDFs are named.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileNaming {
    /// `<ean>_EAN_labels.pdf`
    #[default]
    Labels,
    /// `<ean>_ticket.pdf`
    Ticket,
}

impl FileNaming {
    pub fn file_name(self, ean: &str) -> String {
        match self {
            FileNaming::Labels => format!("{ean}_EAN_labels.pdf"),
            FileNaming::Ticket => format!("{ean}_ticket.pdf"),
        }
    }
}

impl FromStr for FileNaming {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "labels" => Ok(FileNaming::Labels),
            "ticket" => Ok(FileNaming::Ticket),
            other => Err(format!("unknown naming {other:?} (expected labels or ticket)")),
        }
    }
}

/// Settings shared by all commands. Loaded from an optional JSON file, then
/// overridden by command line flags.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Fallback photo; defaults to the bundled `assets/placeholder.png`.
    pub placeholder: Option<PathBuf>,
    pub duplicates: u32,
    /// Which photo goes on the labels.
    pub photo: ImageSlot,
    pub naming: FileNaming,
    pub match_rule: MatchRule,
    /// Where barcode scratch files go; system temp dir when unset.
    pub scratch_dir: Option<PathBuf>,
    /// Font file for label text instead of the bundled one.
    pub font: Option<PathBuf>,
    /// Also write `<ean>_preview.png` next to every PDF.
    pub preview: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            placeholder: None,
            duplicates: DEFAULT_DUPLICATES,
            photo: ImageSlot::Model,
            naming: FileNaming::Labels,
            match_rule: MatchRule::Prefix,
            scratch_dir: None,
            font: None,
            preview: false,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let txt = fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: Config = serde_json::from_str(&txt).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate(path)?;
        Ok(config)
    }

    pub fn validate(&self, origin: &Path) -> Result<()> {
        if self.duplicates == 0 {
            return Err(Error::Config {
                path: origin.to_path_buf(),
                reason: "duplicates must be at least 1".into(),
            });
        }
        Ok(())
    }

    pub fn placeholder_path(&self) -> PathBuf {
        self.placeholder.clone().unwrap_or_else(default_placeholder)
    }

    pub fn scratch_path(&self) -> PathBuf {
        self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// `assets/placeholder.png` next to the executable, else the copy in the
/// source tree.
pub fn default_placeholder() -> PathBuf {
    let installed = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.join("assets").join(PLACEHOLDER_FILE)));
    if let Some(p) = installed
        && p.is_file()
    {
        return p;
    }
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("assets")
        .join(PLACEHOLDER_FILE)
}
