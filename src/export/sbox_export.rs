use std::path::PathBuf;

use anyhow::Result;

use crate::codec::sbox::write_sbox_file;
use crate::core::model::RunDocument;
use crate::export::Exporter;

/// Writes `<out_dir>/<name>.sbox`, ready to diff against or replace the
/// exemplar.
#[derive(Debug, Clone)]
pub struct SboxExporter {
    out_dir: PathBuf,
}

impl SboxExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }
}

impl Exporter for SboxExporter {
    fn export(&self, name: &str, document: &RunDocument) -> Result<PathBuf> {
        let path = self.out_dir.join(format!("{name}.sbox"));
        write_sbox_file(document, &path)?;
        Ok(path)
    }
}
