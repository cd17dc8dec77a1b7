use serde::{Deserialize, Serialize};

/// One detected character with its pixel bounding box.
///
/// `y` is measured from the bottom of the image, the convention used by
/// tesseract box files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlyphBox {
    pub character: String,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl GlyphBox {
    pub fn new(character: impl Into<String>, x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            character: character.into(),
            x1,
            y1,
            x2,
            y2,
        }
    }
}

/// A 1-based terminal grid position, row counted from the top.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

/// Pixel canvas and cell size used to map boxes onto the grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GridGeometry {
    pub pixel_width: f64,
    pub pixel_height: f64,
    pub cell_width: f64,
    pub cell_height: f64,
}

impl GridGeometry {
    pub fn new(pixel_width: f64, pixel_height: f64, cell_width: f64, cell_height: f64) -> Self {
        Self {
            pixel_width,
            pixel_height,
            cell_width,
            cell_height,
        }
    }

    /// Geometry for a `cols` x `rows` grid stretched over a
    /// `width` x `height` pixel canvas.
    pub fn from_grid(width: u32, height: u32, cols: u32, rows: u32) -> Self {
        let pixel_width = f64::from(width);
        let pixel_height = f64::from(height);
        Self::new(
            pixel_width,
            pixel_height,
            pixel_width / f64::from(cols),
            pixel_height / f64::from(rows),
        )
    }

    pub fn quantize(&self, glyph: &GlyphBox) -> Cell {
        quantize(
            glyph.x1,
            glyph.y1,
            glyph.x2,
            glyph.y2,
            self.pixel_width,
            self.pixel_height,
            self.cell_width,
            self.cell_height,
        )
    }
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self::from_grid(1200, 800, 80, 24)
    }
}

/// Map a pixel bounding box to the grid cell containing its center.
///
/// Each edge is normalized by the cell size before averaging; the result is
/// floored. Only the y axis is flipped, so the canvas width is unused.
///
/// Keep this evaluation order: folding the expression changes the rounding
/// for boxes that straddle a cell boundary. No clamping is done, so boxes
/// outside the canvas produce cells outside the nominal grid, saturating at
/// the `i32` range.
#[allow(clippy::too_many_arguments)]
pub fn quantize(
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    _pixel_width: f64,
    pixel_height: f64,
    cell_width: f64,
    cell_height: f64,
) -> Cell {
    // `as` saturates at the i32 bounds; the +1 must not overflow past them.
    let col = ((((x1 / cell_width) + (x2 / cell_width)) / 2.0).floor() as i32)
        .saturating_add(1);
    let row = (((((pixel_height - y1) / cell_height) + ((pixel_height - y2) / cell_height))
        / 2.0)
        .floor() as i32)
        .saturating_add(1);
    Cell { row, col }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_geometry_is_80_by_24() {
        let g = GridGeometry::default();
        assert_eq!(g.cell_width, 15.0);
        assert_eq!(g.cell_height, 800.0 / 24.0);
    }

    #[test]
    fn quantizes_top_left_cell() {
        let g = GridGeometry::default();
        let cell = g.quantize(&GlyphBox::new("A", 0.0, 770.0, 14.0, 790.0));
        assert_eq!(cell, Cell::new(1, 1));
    }

    #[test]
    fn quantizes_consecutive_cells() {
        let g = GridGeometry::default();
        let cells: Vec<Cell> = [0.0, 15.0, 30.0, 45.0]
            .iter()
            .map(|&x| g.quantize(&GlyphBox::new("x", x, 770.0, x + 14.0, 790.0)))
            .collect();
        assert_eq!(
            cells,
            vec![Cell::new(1, 1), Cell::new(1, 2), Cell::new(1, 3), Cell::new(1, 4)]
        );
    }

    #[test]
    fn flips_y_axis_to_top_origin() {
        let g = GridGeometry::default();
        // Bottom row of a 24 row grid.
        let cell = g.quantize(&GlyphBox::new("_", 0.0, 2.0, 14.0, 30.0));
        assert_eq!(cell.row, 24);
    }

    #[test]
    fn midpoint_on_boundary_floors_up() {
        // 10/15 + 20/15 rounds to exactly 2.0, so the midpoint lands on the
        // boundary between columns 1 and 2 and floors into column 2.
        let g = GridGeometry::default();
        let cell = g.quantize(&GlyphBox::new("H", 10.0, 770.0, 20.0, 790.0));
        assert_eq!(cell, Cell::new(1, 2));
    }

    #[test]
    fn boxes_outside_canvas_are_not_clamped() {
        let g = GridGeometry::default();
        let cell = g.quantize(&GlyphBox::new("S", 1500.0, -40.0, 1510.0, -10.0));
        assert_eq!(cell, Cell::new(25, 101));
    }

    #[test]
    fn far_off_canvas_boxes_saturate() {
        let cell = quantize(1e12, 770.0, 1e12, 790.0, 1200.0, 800.0, 15.0, 800.0 / 24.0);
        assert_eq!(cell, Cell::new(1, i32::MAX));

        let cell = quantize(-1e12, 1e12, -1e12, 1e12, 1200.0, 800.0, 15.0, 800.0 / 24.0);
        assert_eq!(cell, Cell::new(i32::MIN + 1, i32::MIN + 1));
    }

    #[test]
    fn zero_sized_canvas_does_not_panic() {
        // Zero-width cells divide to infinity, which saturates instead of
        // wrapping. 0/0 is NaN and casts to 0.
        let g = GridGeometry::from_grid(0, 800, 80, 24);
        assert_eq!(
            g.quantize(&GlyphBox::new("H", 10.0, 770.0, 20.0, 790.0)),
            Cell::new(1, i32::MAX)
        );
        assert_eq!(g.quantize(&GlyphBox::new("H", 0.0, 770.0, 0.0, 790.0)).col, 1);
    }

    #[test]
    fn quantize_is_deterministic() {
        let a = quantize(123.4, 456.7, 130.1, 470.2, 1200.0, 800.0, 15.0, 800.0 / 24.0);
        let b = quantize(123.4, 456.7, 130.1, 470.2, 1200.0, 800.0, 15.0, 800.0 / 24.0);
        assert_eq!(a, b);
    }
}
