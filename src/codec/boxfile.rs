use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::geometry::GlyphBox;
use crate::error::CodecError;

/// Parse one raw detection line: `char x1 y1 x2 y2`, optionally followed by
/// the page index tesseract appends in `makebox` output.
pub fn parse_box_line(line: &str, line_no: usize) -> Result<GlyphBox, CodecError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 5 && fields.len() != 6 {
        return Err(CodecError::boxed(
            line_no,
            format!("expected 5 or 6 fields, found {}", fields.len()),
        ));
    }

    let coord = |idx: usize| -> Result<f64, CodecError> {
        fields[idx]
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| {
                CodecError::boxed(line_no, format!("invalid coordinate '{}'", fields[idx]))
            })
    };
    let glyph = GlyphBox::new(fields[0], coord(1)?, coord(2)?, coord(3)?, coord(4)?);

    if let Some(page) = fields.get(5) {
        page.parse::<u32>()
            .map_err(|_| CodecError::boxed(line_no, format!("invalid page index '{page}'")))?;
    }

    Ok(glyph)
}

pub fn parse_box_file(input: &str) -> Result<Vec<GlyphBox>, CodecError> {
    input
        .lines()
        .enumerate()
        .map(|(idx, line)| parse_box_line(line, idx + 1))
        .collect()
}

pub fn read_box_file(path: &Path) -> Result<Vec<GlyphBox>> {
    let input = fs::read_to_string(path)
        .with_context(|| format!("failed to read box file {}", path.display()))?;
    parse_box_file(&input).with_context(|| format!("failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_plain_and_makebox_lines() {
        let boxes = parse_box_file("H 10 770 20 790\ni 21 770 25 790 0\n").unwrap();
        assert_eq!(
            boxes,
            vec![
                GlyphBox::new("H", 10.0, 770.0, 20.0, 790.0),
                GlyphBox::new("i", 21.0, 770.0, 25.0, 790.0),
            ]
        );
    }

    #[test]
    fn accepts_fractional_coordinates() {
        let glyph = parse_box_line("$ 1.5 2.25 3 4", 1).unwrap();
        assert_eq!(glyph, GlyphBox::new("$", 1.5, 2.25, 3.0, 4.0));
    }

    #[test]
    fn rejects_short_and_non_numeric_lines() {
        assert!(parse_box_line("H 10 770 20", 1).is_err());
        assert!(parse_box_line("H 10 770 x 790", 1).is_err());
        assert!(parse_box_line("H 10 770 20 790 p", 1).is_err());
        assert!(parse_box_line("H inf 770 20 790", 1).is_err());
        assert!(parse_box_line("", 1).is_err());
    }

    #[test]
    fn reports_failing_line_number() {
        let err = parse_box_file("a 0 0 1 1\nb 0 0\n").unwrap_err();
        assert!(matches!(err, CodecError::MalformedBox { line: 2, .. }));
    }
}
