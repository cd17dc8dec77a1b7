use tracing::trace;

use crate::core::geometry::{Cell, GlyphBox, GridGeometry};
use crate::core::model::{GlyphRun, RunDocument};

/// Greedy left-to-right merge of quantized glyphs into runs.
///
/// A glyph directly right of the previous one extends the open run; a glyph
/// one empty cell further right extends it with a single space. Any other
/// position closes the run and opens a new one. No lookahead.
#[derive(Debug, Default)]
pub struct GlyphAccumulator {
    open: Option<GlyphRun>,
    last: Option<Cell>,
    runs: Vec<GlyphRun>,
}

impl GlyphAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, character: &str, cell: Cell) {
        let gap = match (self.last, self.open.as_ref()) {
            (Some(last), Some(_)) if last.row == cell.row => Some(cell.col - last.col),
            _ => None,
        };

        match (gap, self.open.as_mut()) {
            (Some(1), Some(run)) => run.text.push_str(character),
            (Some(2), Some(run)) => {
                run.text.push(' ');
                run.text.push_str(character);
            }
            _ => {
                self.close();
                self.open = Some(GlyphRun::new(character, cell.row, cell.col));
            }
        }

        trace!(character, row = cell.row, col = cell.col, "accumulated glyph");
        self.last = Some(cell);
    }

    fn close(&mut self) {
        if let Some(run) = self.open.take() {
            if !run.text.is_empty() {
                self.runs.push(run);
            }
        }
    }

    pub fn finish(mut self) -> RunDocument {
        self.close();
        RunDocument::new(self.runs)
    }
}

/// Quantize every box in input order and merge the cells into runs.
pub fn simplify_boxes<'a, I>(boxes: I, geometry: &GridGeometry) -> RunDocument
where
    I: IntoIterator<Item = &'a GlyphBox>,
{
    let mut acc = GlyphAccumulator::new();
    for glyph in boxes {
        acc.push(&glyph.character, geometry.quantize(glyph));
    }
    acc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn accumulate(cells: &[(&str, i32, i32)]) -> RunDocument {
        let mut acc = GlyphAccumulator::new();
        for &(c, row, col) in cells {
            acc.push(c, Cell::new(row, col));
        }
        acc.finish()
    }

    #[test]
    fn adjacent_cells_merge() {
        let doc = accumulate(&[("a", 1, 1), ("b", 1, 2), ("c", 1, 3)]);
        assert_eq!(doc.runs, vec![GlyphRun::new("abc", 1, 1)]);
    }

    #[test]
    fn one_empty_cell_becomes_a_space() {
        let doc = accumulate(&[("H", 1, 1), ("i", 1, 3)]);
        assert_eq!(doc.runs, vec![GlyphRun::new("H i", 1, 1)]);
    }

    #[test]
    fn two_empty_cells_split_the_run() {
        let doc = accumulate(&[("a", 1, 1), ("b", 1, 2), ("c", 1, 5)]);
        assert_eq!(
            doc.runs,
            vec![GlyphRun::new("ab", 1, 1), GlyphRun::new("c", 1, 5)]
        );
    }

    #[test]
    fn row_change_splits_the_run() {
        let doc = accumulate(&[("a", 1, 1), ("b", 2, 2)]);
        assert_eq!(
            doc.runs,
            vec![GlyphRun::new("a", 1, 1), GlyphRun::new("b", 2, 2)]
        );
    }

    #[test]
    fn same_cell_starts_a_new_run() {
        let doc = accumulate(&[("H", 1, 2), ("i", 1, 2)]);
        assert_eq!(
            doc.runs,
            vec![GlyphRun::new("H", 1, 2), GlyphRun::new("i", 1, 2)]
        );
    }

    #[test]
    fn backwards_column_starts_a_new_run() {
        let doc = accumulate(&[("x", 3, 10), ("y", 3, 4), ("z", 3, 5)]);
        assert_eq!(
            doc.runs,
            vec![GlyphRun::new("x", 3, 10), GlyphRun::new("yz", 3, 4)]
        );
    }

    #[test]
    fn spaced_words_keep_first_cell_as_anchor() {
        let doc = accumulate(&[
            ("g", 1, 1),
            ("o", 1, 2),
            ("t", 1, 4),
            ("o", 1, 5),
            ("x", 1, 7),
        ]);
        assert_eq!(doc.runs, vec![GlyphRun::new("go to x", 1, 1)]);
    }

    #[test]
    fn order_follows_input_not_position() {
        let doc = accumulate(&[("b", 2, 1), ("a", 1, 1)]);
        assert_eq!(
            doc.runs,
            vec![GlyphRun::new("b", 2, 1), GlyphRun::new("a", 1, 1)]
        );
    }

    #[test]
    fn empty_input_yields_empty_document() {
        assert!(accumulate(&[]).is_empty());
    }

    #[test]
    fn simplifies_pixel_boxes() {
        let geometry = GridGeometry::default();
        let boxes = vec![
            GlyphBox::new("H", 0.0, 770.0, 14.0, 790.0),
            GlyphBox::new("i", 15.0, 770.0, 29.0, 790.0),
            GlyphBox::new("!", 45.0, 770.0, 59.0, 790.0),
            GlyphBox::new("2", 0.0, 737.0, 14.0, 757.0),
        ];
        let doc = simplify_boxes(&boxes, &geometry);
        assert_eq!(
            doc.runs,
            vec![GlyphRun::new("Hi !", 1, 1), GlyphRun::new("2", 2, 1)]
        );
    }
}
