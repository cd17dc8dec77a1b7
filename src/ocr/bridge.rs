use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use tracing::debug;

/// Thin wrapper around the `tesseract` command line in `makebox` mode.
#[derive(Debug, Clone)]
pub struct TesseractBridge {
    program: PathBuf,
    lang: String,
    psm: u32,
}

impl TesseractBridge {
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            lang: "eng".to_string(),
            psm: 6,
        }
    }

    pub fn with_lang(mut self, lang: String) -> Self {
        self.lang = lang;
        self
    }

    pub fn with_psm(mut self, psm: u32) -> Self {
        self.psm = psm;
        self
    }

    /// Write per-character boxes for `image_path` to `<output_prefix>.box`
    /// and return that path.
    pub fn make_boxes(&self, image_path: &Path, output_prefix: &Path) -> Result<PathBuf> {
        if let Some(parent) = output_prefix.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut command = Command::new(&self.program);
        command
            .arg("--psm")
            .arg(self.psm.to_string())
            .arg("-l")
            .arg(&self.lang)
            .arg(image_path)
            .arg(output_prefix)
            .arg("makebox");
        debug!(?command, "invoking OCR engine");

        let status = command.status().with_context(|| {
            format!(
                "failed to invoke {}; is tesseract installed?",
                self.program.display()
            )
        })?;

        if !status.success() {
            anyhow::bail!("tesseract failed with status: {status}");
        }

        let mut box_path = output_prefix.as_os_str().to_owned();
        box_path.push(".box");
        let box_path = PathBuf::from(box_path);
        if !box_path.exists() {
            anyhow::bail!("expected box file not found: {}", box_path.display());
        }
        Ok(box_path)
    }
}
