pub mod bridge;
pub mod capture;
pub mod direct;
pub mod layout_builder;

use anyhow::Result;

use crate::core::model::{RunDocument, TestCase};

pub use bridge::TesseractBridge;
pub use capture::{CaptureTool, RENDER_ENV_OVERRIDES};
pub use direct::DirectCapture;
pub use layout_builder::OcrLayoutBuilder;

/// How the run document for a test case is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureMode {
    /// The capture tool writes the run document itself.
    #[default]
    Direct,
    /// The capture tool writes an image which is read back by OCR.
    Ocr,
}

/// Produces the actual run document for a test case.
pub trait FrameSource {
    fn capture_frame(&self, case: &TestCase) -> Result<RunDocument>;
}
