pub mod codec;
pub mod core;
pub mod error;
pub mod export;
pub mod ocr;
pub mod oracle;
pub mod pipeline;

pub use crate::core::geometry::{quantize, Cell, GlyphBox, GridGeometry};
pub use crate::core::model::{GlyphRun, RunDocument, RunSummary, TestCase, TestVerdict};
pub use error::CodecError;
