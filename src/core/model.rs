use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A run of characters on one row, anchored at the cell of its first
/// character. `text` is never empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GlyphRun {
    pub text: String,
    pub row: i32,
    pub col: i32,
}

impl GlyphRun {
    pub fn new(text: impl Into<String>, row: i32, col: i32) -> Self {
        Self {
            text: text.into(),
            row,
            col,
        }
    }
}

impl fmt::Display for GlyphRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{} \"{}\"", self.row, self.col, self.text)
    }
}

/// Runs of one rendered frame, in the order the glyphs were read.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunDocument {
    pub runs: Vec<GlyphRun>,
}

impl RunDocument {
    pub fn new(runs: Vec<GlyphRun>) -> Self {
        Self { runs }
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GlyphRun> {
        self.runs.iter()
    }
}

impl From<Vec<GlyphRun>> for RunDocument {
    fn from(runs: Vec<GlyphRun>) -> Self {
        Self { runs }
    }
}

impl<'a> IntoIterator for &'a RunDocument {
    type Item = &'a GlyphRun;
    type IntoIter = std::slice::Iter<'a, GlyphRun>;

    fn into_iter(self) -> Self::IntoIter {
        self.runs.iter()
    }
}

/// One exemplar together with the paths the harness derives from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub name: String,
    pub exemplar: PathBuf,
    pub binary: PathBuf,
    pub scratch_dir: PathBuf,
}

impl TestCase {
    pub fn new(
        name: impl Into<String>,
        exemplar: PathBuf,
        build_dir: &Path,
        scratch_dir: PathBuf,
    ) -> Self {
        let name = name.into();
        Self {
            binary: build_dir.join(&name),
            name,
            exemplar,
            scratch_dir,
        }
    }

    fn scratch(&self, extension: &str) -> PathBuf {
        self.scratch_dir.join(format!("{}.{extension}", self.name))
    }

    /// Prefix handed to the OCR engine, which appends `.box` itself.
    pub fn box_prefix(&self) -> PathBuf {
        self.scratch_dir.join(&self.name)
    }

    pub fn image_path(&self) -> PathBuf {
        self.scratch("png")
    }

    pub fn box_path(&self) -> PathBuf {
        self.scratch("box")
    }

    pub fn sbox_path(&self) -> PathBuf {
        self.scratch("sbox")
    }
}

/// Outcome of comparing one produced frame against its exemplar.
#[derive(Debug, Clone)]
pub struct TestVerdict {
    pub name: String,
    pub passed: bool,
    /// The produced document, kept on failure for inspection.
    pub actual: Option<RunDocument>,
}

impl TestVerdict {
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            actual: None,
        }
    }

    pub fn fail(name: impl Into<String>, actual: RunDocument) -> Self {
        Self {
            name: name.into(),
            passed: false,
            actual: Some(actual),
        }
    }
}

/// Aggregate of one harness run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunSummary {
    /// Exemplars selected for this run.
    pub discovered: usize,
    /// Cases that were actually executed.
    pub run: usize,
    pub passed: usize,
    pub failed: Vec<String>,
    /// Cases without a test binary.
    pub skipped: Vec<String>,
}

impl RunSummary {
    pub fn record(&mut self, verdict: &TestVerdict) {
        self.run += 1;
        if verdict.passed {
            self.passed += 1;
        } else {
            self.failed.push(verdict.name.clone());
        }
    }

    pub fn record_skip(&mut self, name: impl Into<String>) {
        self.skipped.push(name.into());
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.discovered
    }

    /// 0 when every selected exemplar passed, 9 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.all_passed() {
            0
        } else {
            9
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} succeeded", self.passed, self.discovered)
    }
}
