//! Nine-row alignment diagram renderer.
//!
//! Row layout, top to bottom: target numbers, target ruler, target unmatched,
//! target matched, connector, query matched, query unmatched, query ruler,
//! query numbers. The target is printed 5'->3' left to right and the query
//! 3'->5' underneath it.

use config::{QUERY_LABEL, TARGET_LABEL};

use crate::error::HybridError;
use crate::record::Duplex;
use crate::ruler::{blanks, marker_row, number_row, Edge};
use crate::sequence::to_rna;

pub const LABEL_WIDTH: usize = 8;
pub const DIAGRAM_ROWS: usize = 9;
pub const TARGET_ROW: usize = 3;
pub const CONNECTOR_ROW: usize = 4;
pub const QUERY_ROW: usize = 5;

const FLANK_LIMIT: usize = 8;
const FLANK_HEAD: usize = 3;
const FLANK_NEAR: usize = 5;
const ELLIPSIS: &str = "...";

// narrowest flanks still able to carry a coordinate
const TARGET_LEAD_MIN: usize = 5;
const TARGET_TRAIL_MIN: usize = 10;
const QUERY_LEAD_MIN: usize = 6;
const QUERY_TRAIL_MIN: usize = 5;

/// A bound region `start..=end` (1-based) of a full sequence.
#[derive(Debug, Clone, Copy)]
pub struct Region<'a> {
    pub sequence: &'a str,
    pub start: usize,
    pub end: usize,
}

impl<'a> Region<'a> {
    pub fn new(sequence: &'a str, start: usize, end: usize) -> Self {
        Self {
            sequence,
            start,
            end,
        }
    }

    fn check(&self, side: &str) -> Result<(), HybridError> {
        if self.start == 0 || self.start > self.end || self.end > self.sequence.len() {
            return Err(HybridError::DiagramConsistency(format!(
                "{} region {}..{} outside a {} nt sequence",
                side,
                self.start,
                self.end,
                self.sequence.len()
            )));
        }
        if !self.sequence.is_ascii() {
            return Err(HybridError::malformed(format!(
                "{} sequence is not ASCII",
                side
            )));
        }
        Ok(())
    }
}

/// Watson-Crick pairs print `|`, G-U wobbles print `:`.
pub fn pair_symbol(target: u8, query: u8) -> Result<char, HybridError> {
    match (target, query) {
        (b'A', b'U') | (b'U', b'A') | (b'C', b'G') | (b'G', b'C') => Ok('|'),
        (b'G', b'U') | (b'U', b'G') => Ok(':'),
        _ => Err(HybridError::InvalidPair(target as char, query as char)),
    }
}

/// The five middle rows, built column by column.
#[derive(Debug, Default)]
struct Core {
    rows: [String; 5],
}

impl Core {
    fn push(&mut self, column: [char; 5]) {
        for (row, c) in self.rows.iter_mut().zip(column) {
            row.push(c);
        }
    }

    fn width(&self) -> usize {
        self.rows[0].len()
    }
}

/// Walks the target 5'->3' and the query 3'->5' in lockstep.
fn core_block(subsequence: &Duplex, structure: &Duplex) -> Result<Core, HybridError> {
    let t_seq = to_rna(&subsequence.target).into_bytes();
    let q_seq = to_rna(&subsequence.query).bytes().rev().collect::<Vec<u8>>();
    let t_db = structure.target.trim().as_bytes();
    let q_db = structure.query.trim().bytes().rev().collect::<Vec<u8>>();

    if t_seq.is_empty() || q_seq.is_empty() {
        return Err(HybridError::malformed(format!(
            "empty strand in sub-sequence {}",
            subsequence
        )));
    }
    if t_seq.len() != t_db.len() || q_seq.len() != q_db.len() {
        return Err(HybridError::DiagramConsistency(format!(
            "sub-sequence {} does not align with structure {}",
            subsequence, structure
        )));
    }

    let mut core = Core::default();
    let (mut i, mut j) = (0, 0);

    while i < t_seq.len() && j < q_seq.len() {
        let (t, q) = (t_seq[i] as char, q_seq[j] as char);
        match (t_db[i], q_db[j]) {
            (b'(', b')') => {
                let symbol = pair_symbol(t_seq[i], q_seq[j])?;
                core.push([' ', t, symbol, q, ' ']);
                i += 1;
                j += 1;
            }
            (b'.', b'.') => {
                core.push([t, ' ', ' ', ' ', q]);
                i += 1;
                j += 1;
            }
            (b'(', b'.') => {
                core.push([' ', ' ', ' ', ' ', q]);
                j += 1;
            }
            (b'.', b')') => {
                core.push([t, ' ', ' ', ' ', ' ']);
                i += 1;
            }
            (a, b) => {
                return Err(HybridError::malformed(format!(
                    "unrecognized structure pattern {:?}/{:?}",
                    a as char, b as char
                )))
            }
        }
    }

    if i != t_seq.len() || j != q_seq.len() {
        return Err(HybridError::DiagramConsistency(format!(
            "structure {} left {} target and {} query positions unconsumed",
            structure,
            t_seq.len() - i,
            q_seq.len() - j
        )));
    }

    Ok(core)
}

/// Bases before `start`, abbreviated when more than eight of them.
fn head_flank(full: &str, start: usize) -> String {
    if start > FLANK_LIMIT {
        format!(
            "{}{}{}",
            &full[..FLANK_HEAD],
            ELLIPSIS,
            &full[start - 1 - FLANK_NEAR..start - 1]
        )
    } else {
        full[..start - 1].to_string()
    }
}

/// Bases after `end`, abbreviated when more than eight of them.
fn tail_flank(full: &str, end: usize) -> String {
    if full.len() - end > FLANK_LIMIT {
        format!(
            "{}{}{}",
            &full[end..end + FLANK_NEAR],
            ELLIPSIS,
            &full[full.len() - FLANK_HEAD..]
        )
    } else {
        full[end..].to_string()
    }
}

fn reversed(s: &str) -> String {
    s.chars().rev().collect()
}

fn pad_left(row: &mut String, n: usize) {
    if n > 0 {
        row.insert_str(0, &blanks(n));
    }
}

/// Rebuilds the nine-row diagram of a bound region pair.
///
/// `subsequence` and `structure` are `target&query` strings, both halves
/// 5'->3'; `target` and `query` carry the full sequences with the 1-based
/// coordinates of the bound regions.
pub fn render(
    target: Region,
    query: Region,
    subsequence: &Duplex,
    structure: &Duplex,
) -> Result<String, HybridError> {
    let t_full = to_rna(target.sequence);
    let q_full = to_rna(query.sequence);
    let target = Region::new(&t_full, target.start, target.end);
    let query = Region::new(&q_full, query.start, query.end);
    target.check("target")?;
    query.check("query")?;

    let core = core_block(subsequence, structure)?;
    let width = core.width();
    let [mut unpaired_t, mut paired_t, mut connector, mut paired_q, mut unpaired_q] = core.rows;

    let t_at_start = target.start == 1;
    let t_at_end = target.end == t_full.len();
    let q_at_start = query.start == 1;
    let q_at_end = query.end == q_full.len();

    let mut t_head = format!("5'-{}", head_flank(&t_full, target.start));
    let t_tail = format!("{}-3'", tail_flank(&t_full, target.end));
    let mut q_head = format!("3'-{}", reversed(&tail_flank(&q_full, query.end)));
    let q_tail = format!("{}-5'", reversed(&head_flank(&q_full, query.start)));

    let mut t_marks = marker_row(
        Edge::new(t_head.len(), t_at_start, TARGET_LEAD_MIN),
        width,
        Edge::new(t_tail.len(), t_at_end, TARGET_TRAIL_MIN),
    );
    let mut t_nums = number_row(&t_marks, target.start, target.end, t_full.len(), false)?;
    let mut q_marks = marker_row(
        Edge::new(q_head.len(), q_at_end, QUERY_LEAD_MIN),
        width,
        Edge::new(q_tail.len(), q_at_start, QUERY_TRAIL_MIN),
    );
    let mut q_nums = number_row(&q_marks, query.start, query.end, q_full.len(), true)?;

    // WARN: only the left flanks are aligned, right flanks may be ragged
    if t_head.len() > q_head.len() {
        let diff = t_head.len() - q_head.len();
        pad_left(&mut q_head, diff);
        pad_left(&mut q_marks, diff);
        pad_left(&mut q_nums, diff);
    } else {
        let diff = q_head.len() - t_head.len();
        pad_left(&mut t_head, diff);
        pad_left(&mut t_marks, diff);
        pad_left(&mut t_nums, diff);
    }

    let lead = t_head.len();
    let gap = blanks(lead);

    if t_at_start {
        unpaired_t.insert_str(0, &gap);
        paired_t.insert_str(0, &t_head);
    } else {
        unpaired_t.insert_str(0, &t_head);
        paired_t.insert_str(0, &gap);
    }
    if t_at_end {
        paired_t.push_str(&t_tail);
    } else {
        unpaired_t.push_str(&t_tail);
    }

    connector.insert_str(0, &gap);

    if q_at_end {
        paired_q.insert_str(0, &q_head);
        unpaired_q.insert_str(0, &gap);
    } else {
        paired_q.insert_str(0, &gap);
        unpaired_q.insert_str(0, &q_head);
    }
    if q_at_start {
        paired_q.push_str(&q_tail);
    } else {
        unpaired_q.push_str(&q_tail);
    }

    let rows = [
        t_nums, t_marks, unpaired_t, paired_t, connector, paired_q, unpaired_q, q_marks, q_nums,
    ];

    Ok(rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let label = match i {
                TARGET_ROW => TARGET_LABEL,
                QUERY_ROW => QUERY_LABEL,
                _ => "",
            };
            format!("{:<width$}{}", label, row.trim_end(), width = LABEL_WIDTH)
        })
        .collect::<Vec<String>>()
        .join("\n"))
}
