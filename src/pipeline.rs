use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::codec::boxfile::read_box_file;
use crate::codec::sbox::read_sbox_file;
use crate::core::accumulate::simplify_boxes;
use crate::core::geometry::GridGeometry;
use crate::core::model::{RunDocument, RunSummary, TestCase, TestVerdict};
use crate::export::{Exporter, JsonExporter, SboxExporter};
use crate::ocr::capture::default_env_overrides;
use crate::ocr::{
    CaptureMode, CaptureTool, DirectCapture, FrameSource, OcrLayoutBuilder, TesseractBridge,
};
use crate::oracle::{compare, first_divergence};

pub const EXEMPLAR_EXTENSION: &str = "sbox";

#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub root: PathBuf,
    pub tests_dir: PathBuf,
    pub build_dir: PathBuf,
    pub tmp_dir: PathBuf,
    pub capture_tool: PathBuf,
    pub ocr_program: PathBuf,
    pub ocr_lang: String,
    pub ocr_psm: u32,
    pub mode: CaptureMode,
    pub geometry: GridGeometry,
    /// Run only this exemplar instead of the whole `tests` directory.
    pub selected: Option<PathBuf>,
    /// Also dump produced documents as JSON next to the `.sbox` output.
    pub json_dump: bool,
    pub env_overrides: Vec<(String, String)>,
}

impl HarnessConfig {
    pub fn new(root: PathBuf) -> Self {
        Self {
            tests_dir: root.join("tests"),
            build_dir: root.join("build"),
            tmp_dir: root.join("tmp"),
            capture_tool: root.join("build").join("capture"),
            root,
            ocr_program: PathBuf::from("tesseract"),
            ocr_lang: "eng".to_string(),
            ocr_psm: 6,
            mode: CaptureMode::Direct,
            geometry: GridGeometry::default(),
            selected: None,
            json_dump: false,
            env_overrides: default_env_overrides(),
        }
    }

    pub fn with_mode(mut self, mode: CaptureMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_geometry(mut self, geometry: GridGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_selected(mut self, selected: Option<PathBuf>) -> Self {
        self.selected = selected;
        self
    }

    pub fn with_json_dump(mut self, json_dump: bool) -> Self {
        self.json_dump = json_dump;
        self
    }

    pub fn with_capture_tool(mut self, capture_tool: PathBuf) -> Self {
        self.capture_tool = capture_tool;
        self
    }

    pub fn with_ocr_program(mut self, ocr_program: PathBuf) -> Self {
        self.ocr_program = ocr_program;
        self
    }

    fn test_case(&self, exemplar: PathBuf) -> Result<TestCase> {
        let name = exemplar
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow::anyhow!("exemplar has no file name: {}", exemplar.display()))?;
        Ok(TestCase::new(
            name,
            exemplar,
            &self.build_dir,
            self.tmp_dir.clone(),
        ))
    }

    /// The frame source matching the configured capture mode.
    pub fn frame_source(&self) -> Box<dyn FrameSource> {
        let capture =
            CaptureTool::new(self.capture_tool.clone()).with_env(self.env_overrides.clone());
        match self.mode {
            CaptureMode::Direct => Box::new(DirectCapture::new(capture)),
            CaptureMode::Ocr => {
                let bridge = TesseractBridge::new(self.ocr_program.clone())
                    .with_lang(self.ocr_lang.clone())
                    .with_psm(self.ocr_psm);
                Box::new(OcrLayoutBuilder::new(capture, bridge, self.geometry))
            }
        }
    }

    pub fn exporters(&self) -> Vec<Box<dyn Exporter>> {
        let mut exporters: Vec<Box<dyn Exporter>> =
            vec![Box::new(SboxExporter::new(self.tmp_dir.clone()))];
        if self.json_dump {
            exporters.push(Box::new(JsonExporter::new(self.tmp_dir.clone())));
        }
        exporters
    }
}

/// The selected exemplar, or every `*.sbox` directly under the tests
/// directory in file name order.
pub fn discover_cases(config: &HarnessConfig) -> Result<Vec<TestCase>> {
    if let Some(selected) = &config.selected {
        if !selected.is_file() {
            anyhow::bail!("exemplar does not exist: {}", selected.display());
        }
        return Ok(vec![config.test_case(selected.clone())?]);
    }

    let entries = fs::read_dir(&config.tests_dir).with_context(|| {
        format!(
            "failed to list exemplars in {}",
            config.tests_dir.display()
        )
    })?;

    let mut exemplars = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && has_exemplar_extension(&path) {
            exemplars.push(path);
        }
    }
    exemplars.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    exemplars
        .into_iter()
        .map(|path| config.test_case(path))
        .collect()
}

fn has_exemplar_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == EXEMPLAR_EXTENSION)
}

/// Capture, persist and compare one case. `None` when the test binary has
/// not been built.
pub fn run_case(
    case: &TestCase,
    source: &dyn FrameSource,
    exporters: &[Box<dyn Exporter>],
) -> Result<Option<TestVerdict>> {
    if !case.binary.exists() {
        warn!(case = %case.name, binary = %case.binary.display(), "test binary missing, skipping");
        return Ok(None);
    }

    let expected = read_sbox_file(&case.exemplar)?;
    info!(case = %case.name, "running test case");
    let actual = source
        .capture_frame(case)
        .with_context(|| format!("test case {} aborted", case.name))?;

    let passed = compare(&actual, &expected);

    // The exemplar grammar has no escapes, so some produced documents cannot
    // be persisted. Such a case still gets its verdict.
    let mut persisted = None;
    for exporter in exporters {
        match exporter.export(&case.name, &actual) {
            Ok(path) => {
                debug!(case = %case.name, path = %path.display(), "wrote produced document");
                if persisted.is_none() {
                    persisted = Some(path);
                }
            }
            Err(err) => {
                warn!(case = %case.name, error = %format!("{err:#}"), "could not persist produced document");
            }
        }
    }

    let verdict = if passed {
        TestVerdict::pass(&case.name)
    } else {
        TestVerdict::fail(&case.name, actual)
    };
    report_verdict(&verdict, &expected, persisted.as_deref());
    Ok(Some(verdict))
}

fn report_verdict(verdict: &TestVerdict, expected: &RunDocument, persisted: Option<&Path>) {
    let Some(actual) = &verdict.actual else {
        println!("{}: PASS", verdict.name);
        return;
    };

    println!("{}: FAIL", verdict.name);
    if let Some(divergence) = first_divergence(actual, expected) {
        println!("  {divergence}");
        warn!(case = %verdict.name, %divergence, "produced document differs from exemplar");
    }
    match persisted {
        Some(path) => println!("  actual output: {}", path.display()),
        None => println!("  actual output was not persisted"),
    }
}

/// Run every case in order. Tool failures abort the whole run; mismatches
/// and missing binaries are only recorded.
pub fn run_suite(
    cases: &[TestCase],
    source: &dyn FrameSource,
    exporters: &[Box<dyn Exporter>],
) -> Result<RunSummary> {
    println!("=== running {} tests ===", cases.len());

    let mut summary = RunSummary {
        discovered: cases.len(),
        ..Default::default()
    };
    for case in cases {
        match run_case(case, source, exporters)? {
            Some(verdict) => summary.record(&verdict),
            None => summary.record_skip(&case.name),
        }
    }

    println!("=== {summary} ===");
    Ok(summary)
}

pub fn run_harness(config: &HarnessConfig) -> Result<RunSummary> {
    let cases = discover_cases(config)?;
    info!(
        root = %config.root.display(),
        mode = ?config.mode,
        cases = cases.len(),
        "starting harness"
    );
    let source = config.frame_source();
    run_suite(&cases, source.as_ref(), &config.exporters())
}

/// Normalize a raw box file into a run document.
pub fn simplify_box_file(box_path: &Path, geometry: &GridGeometry) -> Result<RunDocument> {
    let boxes = read_box_file(box_path)?;
    Ok(simplify_boxes(&boxes, geometry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_output_dir(prefix: &str) -> PathBuf {
        let mut out = std::env::temp_dir();
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let pid = std::process::id();
        out.push(format!("{prefix}-{pid}-{now}"));
        out
    }

    #[test]
    fn discovers_exemplars_in_name_order() -> Result<()> {
        let root = temp_output_dir("termcheck-discover");
        let tests = root.join("tests");
        fs::create_dir_all(&tests)?;
        for name in ["t8.sbox", "t4.sbox", "notes.txt", "t0.sbox"] {
            fs::write(tests.join(name), "")?;
        }

        let config = HarnessConfig::new(root.clone());
        let names: Vec<String> = discover_cases(&config)?
            .into_iter()
            .map(|case| case.name)
            .collect();
        assert_eq!(names, vec!["t0", "t4", "t8"]);

        let _ = fs::remove_dir_all(&root);
        Ok(())
    }

    #[test]
    fn selected_exemplar_is_the_only_case() -> Result<()> {
        let root = temp_output_dir("termcheck-select");
        let tests = root.join("tests");
        fs::create_dir_all(&tests)?;
        fs::write(tests.join("a.sbox"), "")?;
        fs::write(tests.join("b.sbox"), "")?;

        let config = HarnessConfig::new(root.clone()).with_selected(Some(tests.join("b.sbox")));
        let cases = discover_cases(&config)?;
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].name, "b");
        assert_eq!(cases[0].binary, root.join("build").join("b"));

        let _ = fs::remove_dir_all(&root);
        Ok(())
    }

    #[test]
    fn missing_selected_exemplar_is_an_error() {
        let config = HarnessConfig::new(temp_output_dir("termcheck-none"))
            .with_selected(Some(PathBuf::from("/nonexistent/x.sbox")));
        assert!(discover_cases(&config).is_err());
    }

    #[test]
    fn json_dump_adds_an_exporter() {
        let config = HarnessConfig::new(PathBuf::from("."));
        assert_eq!(config.exporters().len(), 1);
        assert_eq!(config.with_json_dump(true).exporters().len(), 2);
    }
}
