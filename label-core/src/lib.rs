//! Code registry, CSV import and photo association for EAN label sheets.

pub mod associate;
pub mod ean;
pub mod error;
pub mod import;
pub mod registry;

pub use associate::{MatchRule, ScanReport, associate_folder};
pub use error::{Error, Result};
pub use import::{ImportReport, RowIssue, import_csv};
pub use registry::{CodeEntry, ImageSlot, Registry};
