use anyhow::Result;
use tracing::debug;

use crate::codec::sbox::read_sbox_file;
use crate::core::model::{RunDocument, TestCase};
use crate::ocr::capture::CaptureTool;
use crate::ocr::FrameSource;

/// Direct mode: the capture tool quantizes its own cell grid and writes
/// `<tmp>/<name>.sbox`, which is decoded as is.
#[derive(Debug, Clone)]
pub struct DirectCapture {
    capture: CaptureTool,
}

impl DirectCapture {
    pub fn new(capture: CaptureTool) -> Self {
        Self { capture }
    }
}

impl FrameSource for DirectCapture {
    fn capture_frame(&self, case: &TestCase) -> Result<RunDocument> {
        let sbox_path = case.sbox_path();
        self.capture.capture_sbox(&case.binary, &sbox_path)?;
        let document = read_sbox_file(&sbox_path)?;
        debug!(case = %case.name, runs = document.len(), "decoded captured run document");
        Ok(document)
    }
}
