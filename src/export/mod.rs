pub mod json_export;
pub mod sbox_export;

use std::path::PathBuf;

use anyhow::Result;

use crate::core::model::RunDocument;

pub use json_export::JsonExporter;
pub use sbox_export::SboxExporter;

/// Persists a produced run document under a test name and returns the
/// written path.
pub trait Exporter {
    fn export(&self, name: &str, document: &RunDocument) -> Result<PathBuf>;
}
