use std::fmt;

use strsim::normalized_levenshtein;

use crate::core::model::{GlyphRun, RunDocument};

/// First position where two run documents disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct Divergence {
    pub index: usize,
    pub actual: Option<GlyphRun>,
    pub expected: Option<GlyphRun>,
    /// Text similarity of the two runs in `[0, 1]`, when both exist.
    pub similarity: Option<f64>,
}

/// Locate the first differing run. `None` when the documents are equal.
pub fn first_divergence(actual: &RunDocument, expected: &RunDocument) -> Option<Divergence> {
    let len = actual.len().max(expected.len());
    (0..len).find_map(|index| {
        let a = actual.runs.get(index);
        let e = expected.runs.get(index);
        if a == e {
            return None;
        }
        let similarity = match (a, e) {
            (Some(a), Some(e)) => Some(normalized_levenshtein(&a.text, &e.text)),
            _ => None,
        };
        Some(Divergence {
            index,
            actual: a.cloned(),
            expected: e.cloned(),
            similarity,
        })
    })
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |run: &Option<GlyphRun>| match run {
            Some(run) => run.to_string(),
            None => "<none>".to_string(),
        };
        write!(
            f,
            "run {}: expected {}, got {}",
            self.index + 1,
            show(&self.expected),
            show(&self.actual)
        )?;
        if let Some(sim) = self.similarity {
            write!(f, " (text similarity {sim:.2})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn equal_documents_have_no_divergence() {
        let doc = RunDocument::new(vec![GlyphRun::new("abc", 1, 1)]);
        assert_eq!(first_divergence(&doc, &doc), None);
    }

    #[test]
    fn reports_first_differing_run() {
        let actual = RunDocument::new(vec![
            GlyphRun::new("same", 1, 1),
            GlyphRun::new("goto lime 1", 2, 1),
        ]);
        let expected = RunDocument::new(vec![
            GlyphRun::new("same", 1, 1),
            GlyphRun::new("goto line 1", 2, 1),
        ]);
        let div = first_divergence(&actual, &expected).unwrap();
        assert_eq!(div.index, 1);
        let sim = div.similarity.unwrap();
        assert!(sim > 0.9 && sim < 1.0);
        assert!(div.to_string().starts_with("run 2: expected 2,1 \"goto line 1\""));
    }

    #[test]
    fn reports_missing_trailing_run() {
        let actual = RunDocument::new(vec![GlyphRun::new("a", 1, 1)]);
        let expected = RunDocument::new(vec![
            GlyphRun::new("a", 1, 1),
            GlyphRun::new("b", 2, 1),
        ]);
        let div = first_divergence(&actual, &expected).unwrap();
        assert_eq!(div.index, 1);
        assert_eq!(div.actual, None);
        assert_eq!(div.similarity, None);
        assert!(div.to_string().ends_with("got <none>"));
    }
}
