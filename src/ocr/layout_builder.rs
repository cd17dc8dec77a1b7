use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::codec::boxfile::read_box_file;
use crate::core::accumulate::simplify_boxes;
use crate::core::geometry::GridGeometry;
use crate::core::model::{RunDocument, TestCase};
use crate::ocr::bridge::TesseractBridge;
use crate::ocr::capture::CaptureTool;
use crate::ocr::FrameSource;

/// OCR mode: capture an image, let tesseract box every character, then
/// quantize and merge the boxes onto the terminal grid.
#[derive(Debug, Clone)]
pub struct OcrLayoutBuilder {
    capture: CaptureTool,
    bridge: TesseractBridge,
    geometry: GridGeometry,
}

impl OcrLayoutBuilder {
    pub fn new(capture: CaptureTool, bridge: TesseractBridge, geometry: GridGeometry) -> Self {
        Self {
            capture,
            bridge,
            geometry,
        }
    }

    fn check_dimensions(&self, image_path: &Path) -> Result<()> {
        let (width, height) = image::image_dimensions(image_path)
            .with_context(|| format!("failed to read captured image {}", image_path.display()))?;
        if f64::from(width) != self.geometry.pixel_width
            || f64::from(height) != self.geometry.pixel_height
        {
            warn!(
                width,
                height,
                expected_width = self.geometry.pixel_width,
                expected_height = self.geometry.pixel_height,
                "captured image size differs from grid geometry"
            );
        }
        Ok(())
    }
}

impl FrameSource for OcrLayoutBuilder {
    fn capture_frame(&self, case: &TestCase) -> Result<RunDocument> {
        let image_path = case.image_path();
        self.capture.capture_image(&case.binary, &image_path)?;
        self.check_dimensions(&image_path)?;

        let box_path = self.bridge.make_boxes(&image_path, &case.box_prefix())?;
        let boxes = read_box_file(&box_path)?;
        debug!(case = %case.name, boxes = boxes.len(), "read OCR boxes");

        Ok(simplify_boxes(&boxes, &self.geometry))
    }
}
