pub mod diff;

use crate::core::model::RunDocument;

pub use diff::{first_divergence, Divergence};

/// Exact structural equality: same runs, same order, same `(row, col, text)`.
pub fn compare(actual: &RunDocument, expected: &RunDocument) -> bool {
    actual.len() == expected.len()
        && actual
            .iter()
            .zip(expected)
            .all(|(a, e)| a.row == e.row && a.col == e.col && a.text == e.text)
}
