//! The `.sbox` run-document format: one run per line, `<row>,<col> "<text>"`.
//!
//! Text is written verbatim, so run text may not contain `"` or a newline.
//! Both are rejected on encode, and a quote inside the text is rejected on
//! decode.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::model::{GlyphRun, RunDocument};
use crate::error::CodecError;

pub fn encode_run(run: &GlyphRun) -> Result<String, CodecError> {
    let reason = if run.text.is_empty() {
        Some("empty text")
    } else if run.text.contains('"') {
        Some("text contains a double quote")
    } else if run.text.contains(['\n', '\r']) {
        Some("text contains a line break")
    } else {
        None
    };
    if let Some(reason) = reason {
        return Err(CodecError::UnencodableText {
            row: run.row,
            col: run.col,
            reason: reason.to_string(),
        });
    }
    Ok(format!("{run}\n"))
}

pub fn encode_document(document: &RunDocument) -> Result<String, CodecError> {
    let mut out = String::new();
    for run in document {
        out.push_str(&encode_run(run)?);
    }
    Ok(out)
}

/// Parse one line (without its terminator). `line_no` is 1-based and only
/// used for error reporting.
pub fn decode_run(line: &str, line_no: usize) -> Result<GlyphRun, CodecError> {
    let (cell, quoted) = line
        .split_once(' ')
        .ok_or_else(|| CodecError::run(line_no, "missing space after cell"))?;
    let (row, col) = cell
        .split_once(',')
        .ok_or_else(|| CodecError::run(line_no, "missing comma in cell"))?;
    let row = parse_coordinate(row, line_no)?;
    let col = parse_coordinate(col, line_no)?;

    let text = quoted
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| CodecError::run(line_no, "text is not enclosed in double quotes"))?;
    if text.is_empty() {
        return Err(CodecError::run(line_no, "empty text"));
    }
    if text.contains('"') {
        return Err(CodecError::run(line_no, "double quote inside text"));
    }

    Ok(GlyphRun::new(text, row, col))
}

fn parse_coordinate(field: &str, line_no: usize) -> Result<i32, CodecError> {
    let digits = field.strip_prefix('-').unwrap_or(field);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodecError::run(line_no, format!("invalid coordinate '{field}'")));
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return Err(CodecError::run(line_no, format!("leading zero in '{field}'")));
    }
    field
        .parse()
        .map_err(|_| CodecError::run(line_no, format!("coordinate out of range '{field}'")))
}

pub fn decode_document(input: &str) -> Result<RunDocument, CodecError> {
    input
        .lines()
        .enumerate()
        .map(|(idx, line)| decode_run(line, idx + 1))
        .collect::<Result<Vec<_>, _>>()
        .map(RunDocument::new)
}

pub fn read_sbox_file(path: &Path) -> Result<RunDocument> {
    let input = fs::read_to_string(path)
        .with_context(|| format!("failed to read run document {}", path.display()))?;
    decode_document(&input).with_context(|| format!("failed to parse {}", path.display()))
}

pub fn write_sbox_file(document: &RunDocument, path: &Path) -> Result<()> {
    let data = encode_document(document)
        .with_context(|| format!("failed to encode run document for {}", path.display()))?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, data).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
