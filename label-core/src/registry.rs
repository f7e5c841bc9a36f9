use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::ean;
use crate::error::{Error, Result};

/// Which of the two photos of an entry an operation refers to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSlot {
    Product,
    #[default]
    Model,
}

impl ImageSlot {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageSlot::Product => "product",
            ImageSlot::Model => "model",
        }
    }
}

impl FromStr for ImageSlot {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "product" => Ok(ImageSlot::Product),
            "model" => Ok(ImageSlot::Model),
            other => Err(format!("unknown photo slot {other:?} (expected product or model)")),
        }
    }
}

/// One imported product code with its associated photos.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CodeEntry {
    pub ean: String,
    pub product: String,
    pub brand: String,
    pub product_image: PathBuf,
    pub model_image: PathBuf,
}

impl CodeEntry {
    pub fn image(&self, slot: ImageSlot) -> &Path {
        match slot {
            ImageSlot::Product => &self.product_image,
            ImageSlot::Model => &self.model_image,
        }
    }

    pub fn uses_placeholder(&self, slot: ImageSlot, placeholder: &Path) -> bool {
        self.image(slot) == placeholder
    }
}

/// In-memory EAN registry for one working session.
///
/// Entries keep the order in which their code was first added; re-adding a
/// code replaces the record in place.
#[derive(Debug)]
pub struct Registry {
    placeholder: PathBuf,
    entries: Vec<CodeEntry>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// `placeholder` is the image used until a real photo is associated.
    pub fn new(placeholder: impl Into<PathBuf>) -> Self {
        Self {
            placeholder: placeholder.into(),
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn placeholder(&self) -> &Path {
        &self.placeholder
    }

    /// Insert or overwrite a code. Both photos are reset to the placeholder,
    /// matching what a fresh CSV import means.
    pub fn add_code(&mut self, code: &str, product: &str, brand: &str) -> Result<()> {
        let code = ean::validate(code)?;
        let entry = CodeEntry {
            ean: code.to_string(),
            product: product.to_string(),
            brand: brand.to_string(),
            product_image: self.placeholder.clone(),
            model_image: self.placeholder.clone(),
        };
        match self.index.get(code) {
            Some(&i) => {
                debug!("EAN {code} re-imported, photos reset");
                self.entries[i] = entry;
            }
            None => {
                debug!("EAN {code} added");
                self.index.insert(code.to_string(), self.entries.len());
                self.entries.push(entry);
            }
        }
        Ok(())
    }

    pub fn set_product_image(&mut self, code: &str, path: impl Into<PathBuf>) -> Result<()> {
        self.set_image(code, ImageSlot::Product, path)
    }

    pub fn set_model_image(&mut self, code: &str, path: impl Into<PathBuf>) -> Result<()> {
        self.set_image(code, ImageSlot::Model, path)
    }

    pub fn set_image(&mut self, code: &str, slot: ImageSlot, path: impl Into<PathBuf>) -> Result<()> {
        let code = ean::validate(code)?;
        let i = *self.index.get(code).ok_or_else(|| Error::EanNotFound {
            code: code.to_string(),
        })?;
        let path = path.into();
        debug!("EAN {code}: {} photo -> {}", slot.as_str(), path.display());
        let entry = &mut self.entries[i];
        match slot {
            ImageSlot::Product => entry.product_image = path,
            ImageSlot::Model => entry.model_image = path,
        }
        Ok(())
    }

    pub fn get(&self, code: &str) -> Option<&CodeEntry> {
        self.index.get(code).map(|&i| &self.entries[i])
    }

    /// All entries in insertion order.
    pub fn all(&self) -> &[CodeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}
