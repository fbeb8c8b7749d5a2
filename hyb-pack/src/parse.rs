//! Reading dot-bracket pairs back out of ASCII diagrams.
//!
//! Both layouts share the same four strand rows (target unmatched, target
//! matched, query matched, query unmatched) and the same per-column rules;
//! they differ only in which rows hold them and which columns are scanned.

use std::ops::Range;

use crate::error::HybridError;
use crate::record::Duplex;
use crate::render::{CONNECTOR_ROW, DIAGRAM_ROWS};

const RAW_ROWS: usize = 4;
const RAW_PREFIX: usize = 9;
const RAW_SUFFIX: usize = 2;

const UNPAIRED: char = '.';
const TARGET_PAIRED: char = '(';
const QUERY_PAIRED: char = ')';

#[derive(Debug, Default)]
struct Strand {
    seq: String,
    note: String,
}

impl Strand {
    /// Classifies one column; `None` means both cells are blank.
    fn read(
        &mut self,
        unmatched: u8,
        matched: u8,
        paired: char,
        side: &str,
        col: usize,
    ) -> Result<(), HybridError> {
        match (unmatched == b' ', matched == b' ') {
            (true, true) => {}
            (false, true) => {
                self.seq.push(unmatched as char);
                self.note.push(UNPAIRED);
            }
            (true, false) => {
                self.seq.push(matched as char);
                self.note.push(paired);
            }
            (false, false) => {
                return Err(HybridError::malformed(format!(
                    "{} column {} has both a matched and an unmatched base",
                    side, col
                )))
            }
        }
        Ok(())
    }

    /// Keeps only first..=last paired position.
    fn bound_only(self, paired: char, side: &str) -> Result<Strand, HybridError> {
        let first = self.note.find(paired);
        let last = self.note.rfind(paired);

        match (first, last) {
            (Some(first), Some(last)) => Ok(Strand {
                seq: self.seq[first..=last].to_string(),
                note: self.note[first..=last].to_string(),
            }),
            _ => Err(HybridError::malformed(format!(
                "{} strand has no paired position",
                side
            ))),
        }
    }
}

/// Columns are bytes, so any non-ASCII row is rejected up front.
fn padded(rows: &[&str]) -> Result<Vec<Vec<u8>>, HybridError> {
    if let Some(idx) = rows.iter().position(|r| !r.is_ascii()) {
        return Err(HybridError::malformed(format!(
            "diagram row {} holds non-ASCII text",
            idx
        )));
    }

    let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    Ok(rows
        .iter()
        .map(|r| {
            let mut row = r.as_bytes().to_vec();
            row.resize(width, b' ');
            row
        })
        .collect())
}

/// rows: target unmatched, target matched, query matched, query unmatched
fn read_columns(rows: [&[u8]; 4], cols: Range<usize>) -> Result<(Duplex, Duplex), HybridError> {
    let mut target = Strand::default();
    let mut query = Strand::default();

    for col in cols {
        target.read(rows[0][col], rows[1][col], TARGET_PAIRED, "target", col)?;
        query.read(rows[3][col], rows[2][col], QUERY_PAIRED, "query", col)?;
    }

    let target = target.bound_only(TARGET_PAIRED, "target")?;
    let query = query.bound_only(QUERY_PAIRED, "query")?;

    let subsequence = Duplex::new(target.seq, query.seq.chars().rev().collect::<String>());
    let structure = Duplex::new(target.note, query.note.chars().rev().collect::<String>());

    Ok((subsequence, structure))
}

/// Parses a four-row RNAhybrid diagram into `(subsequence, structure)`.
///
/// The `target 5'` label prefix and the trailing `3'`/`5'` are skipped.
pub fn parse_diagram(raw: &str) -> Result<(Duplex, Duplex), HybridError> {
    let lines = raw
        .trim_matches('\n')
        .split('\n')
        .collect::<Vec<&str>>();
    if lines.len() != RAW_ROWS {
        return Err(HybridError::malformed(format!(
            "expected a {}-row diagram, found {} rows",
            RAW_ROWS,
            lines.len()
        )));
    }

    let rows = padded(&lines)?;
    let width = rows[0].len();
    if width < RAW_PREFIX + RAW_SUFFIX {
        return Err(HybridError::malformed("diagram narrower than its labels"));
    }

    read_columns(
        [&rows[0], &rows[1], &rows[2], &rows[3]],
        RAW_PREFIX..width - RAW_SUFFIX,
    )
}

/// Parses a nine-row diagram produced by [`crate::render`] back into
/// `(subsequence, structure)`.
///
/// Only the columns between the first and last connector symbol are read,
/// so flanks and labels never leak into the result.
pub fn parse_rendered(diagram: &str) -> Result<(Duplex, Duplex), HybridError> {
    let lines = diagram.split('\n').collect::<Vec<&str>>();
    if lines.len() != DIAGRAM_ROWS {
        return Err(HybridError::malformed(format!(
            "expected a {}-row diagram, found {} rows",
            DIAGRAM_ROWS,
            lines.len()
        )));
    }

    let rows = padded(&lines)?;
    let connector = &rows[CONNECTOR_ROW];
    let first = connector.iter().position(|b| *b != b' ');
    let last = connector.iter().rposition(|b| *b != b' ');

    match (first, last) {
        (Some(first), Some(last)) => read_columns(
            [
                &rows[CONNECTOR_ROW - 2],
                &rows[CONNECTOR_ROW - 1],
                &rows[CONNECTOR_ROW + 1],
                &rows[CONNECTOR_ROW + 2],
            ],
            first..last + 1,
        ),
        _ => Err(HybridError::malformed("diagram has an empty connector row")),
    }
}
