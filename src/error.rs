use thiserror::Error;

/// Errors raised while reading or writing the line formats handled by
/// [`crate::codec`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// A run-document line did not match `<row>,<col> "<text>"`.
    #[error("malformed run line {line}: {reason}")]
    MalformedRun { line: usize, reason: String },

    /// A raw box line did not match `char x1 y1 x2 y2 [page]`.
    #[error("malformed box line {line}: {reason}")]
    MalformedBox { line: usize, reason: String },

    /// Run text the format cannot represent (quote, newline or empty).
    #[error("run at {row},{col} cannot be encoded: {reason}")]
    UnencodableText { row: i32, col: i32, reason: String },
}

impl CodecError {
    pub(crate) fn run(line: usize, reason: impl Into<String>) -> Self {
        CodecError::MalformedRun {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn boxed(line: usize, reason: impl Into<String>) -> Self {
        CodecError::MalformedBox {
            line,
            reason: reason.into(),
        }
    }
}
