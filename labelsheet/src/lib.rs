//! Turn an EAN registry into printable label sheets.

pub mod batch;
pub mod config;
pub mod error;
pub mod render;
pub mod sheet;

pub use batch::{BatchReport, Progress, generate_all};
pub use config::{Config, FileNaming};
pub use error::{Error, Result};
pub use render::Renderer;
pub use sheet::{LabelSheetRequest, SheetOutcome, SheetSettings, generate_sheet};
