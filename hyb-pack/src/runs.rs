use std::fmt;

use crate::error::HybridError;
use crate::record::{Duplex, TIE_SEPARATOR};
use crate::render::{CONNECTOR_ROW, QUERY_ROW, TARGET_ROW};

/// Where the paired rows sit in a diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramLayout {
    /// nine-row diagram written by this crate
    Rendered,
    /// four-row block printed by RNAhybrid; paired bases double as the marker
    Raw,
}

impl DiagramLayout {
    /// (marker row, target row, query row)
    fn rows(&self) -> (usize, usize, usize) {
        match self {
            DiagramLayout::Rendered => (CONNECTOR_ROW, TARGET_ROW, QUERY_ROW),
            DiagramLayout::Raw => (1, 1, 2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LongestRun {
    pub length: usize,
    pub pairs: Vec<Duplex>,
}

impl fmt::Display for LongestRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .pairs
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<String>>()
            .join(&TIE_SEPARATOR.to_string());
        write!(f, "{}", joined)
    }
}

/// Column spans of whitespace-delimited tokens in a row.
fn tokens(row: &[u8]) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;

    for (i, b) in row.iter().enumerate() {
        match (b.is_ascii_whitespace(), start) {
            (false, None) => start = Some(i),
            (true, Some(s)) => {
                spans.push((s, i - s));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push((s, row.len() - s));
    }

    spans
}

/// Longest contiguous run(s) of paired positions.
///
/// Every run of maximal length is reported at its own column, target slice
/// read forward and query slice reversed so both come out 5'->3'.
pub fn longest_run(diagram: &str, layout: DiagramLayout) -> Result<LongestRun, HybridError> {
    let rows = diagram.split('\n').collect::<Vec<&str>>();
    let (marker_idx, target_idx, query_idx) = layout.rows();

    let row = |idx: usize| {
        rows.get(idx).map(|r| r.as_bytes()).ok_or_else(|| {
            HybridError::malformed(format!(
                "diagram has {} rows, row {} requested",
                rows.len(),
                idx
            ))
        })
    };
    let marker = row(marker_idx)?;
    let target = row(target_idx)?;
    let query = row(query_idx)?;

    let spans = tokens(marker);
    let length = spans.iter().map(|(_, len)| *len).max().unwrap_or(0);

    let mut pairs = Vec::new();
    for (start, len) in spans.into_iter().filter(|(_, len)| *len == length) {
        let slice = |row: &[u8]| {
            row.get(start..start + len)
                .map(|s| String::from_utf8_lossy(s).into_owned())
                .ok_or_else(|| {
                    HybridError::DiagramConsistency(format!(
                        "paired run at column {} overruns its row",
                        start
                    ))
                })
        };
        let t = slice(target)?;
        let q = slice(query)?.chars().rev().collect::<String>();
        pairs.push(Duplex::new(t, q));
    }

    Ok(LongestRun { length, pairs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Duplex;
    use crate::render::{render, Region};

    #[test]
    fn test_longest_run_single_max() {
        let diagram = [
            "", "", "", "  AC  GGA  ", "  ||  |||  ", "  UG  CCU  ", "", "", "",
        ]
        .join("\n");
        let run = longest_run(&diagram, DiagramLayout::Rendered).unwrap();

        assert_eq!(run.length, 3);
        assert_eq!(run.pairs, vec![Duplex::new("GGA", "UCC")]);
        assert_eq!(run.to_string(), "GGA&UCC");
    }

    #[test]
    fn test_longest_run_ties_keep_their_columns() {
        let target = "GGGAAACCCUUUAGCUAGCUAGGCAUCGAUCGUACGAUCGAUUUGGGCCCAAA";
        let query = "CCAGAUCAGUAGCAUACUAGGCAUCCAAG";
        let diagram = render(
            Region::new(target, 17, 26),
            Region::new(query, 9, 18),
            &Duplex::parse("AGCUAGGCAU&GUAGCAUACU").unwrap(),
            &Duplex::parse("((.((.((((&)).)).))))").unwrap(),
        )
        .unwrap();

        let run = longest_run(&diagram, DiagramLayout::Rendered).unwrap();
        assert_eq!(run.length, 2);
        assert_eq!(run.to_string(), "AG&CU|UA&UA|GC&GC|AU&GU");
    }

    #[test]
    fn test_longest_run_raw_layout() {
        let diagram = [
            "target 5' U   A  U  C 3'",
            "           UGC AC GG    ",
            "           ACG UG UC    ",
            "tRF    3' G      C    5'",
        ]
        .join("\n");
        let run = longest_run(&diagram, DiagramLayout::Raw).unwrap();

        assert_eq!(run.length, 3);
        assert_eq!(run.pairs, vec![Duplex::new("UGC", "GCA")]);
    }

    #[test]
    fn test_longest_run_empty_connector() {
        let diagram = vec![""; 9].join("\n");
        let run = longest_run(&diagram, DiagramLayout::Rendered).unwrap();
        assert_eq!(run.length, 0);
        assert!(run.pairs.is_empty());
        assert_eq!(run.to_string(), "");
    }

    #[test]
    fn test_longest_run_short_diagram() {
        assert!(longest_run("a\nb", DiagramLayout::Rendered).is_err());
    }
}
