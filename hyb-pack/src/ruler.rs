//! Coordinate ruler helpers for the rendered diagram.
//!
//! The ruler is two rows per strand: a marker row with `|` at the flank
//! boundaries and at both ends of the bound region, and a number row where
//! each `|` is overwritten by its coordinate, centred on the mark.

use crate::error::HybridError;

pub const TICK: char = '|';
const EDGE_GAP: &str = "   ";
const LEAD_TICK: &str = "   |";
const TRAIL_TICK: &str = "|   ";

pub fn blanks(n: usize) -> String {
    " ".repeat(n)
}

/// One flank of the ruler.
///
/// `width` is the printed flank width, `at_sequence_end` is set when the
/// bound region touches the physical end on that side, and `min_width` is
/// the narrowest flank still able to carry a coordinate.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub width: usize,
    pub at_sequence_end: bool,
    pub min_width: usize,
}

impl Edge {
    pub fn new(width: usize, at_sequence_end: bool, min_width: usize) -> Self {
        Self {
            width,
            at_sequence_end,
            min_width,
        }
    }

    fn lead(&self) -> String {
        if self.at_sequence_end {
            EDGE_GAP.to_string()
        } else if self.width < self.min_width {
            blanks(self.width)
        } else {
            format!("{}{}", LEAD_TICK, blanks(self.width - LEAD_TICK.len()))
        }
    }

    fn trail(&self) -> String {
        if self.at_sequence_end {
            EDGE_GAP.to_string()
        } else if self.width < self.min_width {
            blanks(self.width)
        } else {
            format!("{}{}", blanks(self.width - TRAIL_TICK.len()), TRAIL_TICK)
        }
    }
}

/// Marker row: lead flank, `|` under the first and last bound column, trail flank.
///
/// A one-column bound region still prints two ticks.
pub fn marker_row(lead: Edge, core_width: usize, trail: Edge) -> String {
    format!(
        "{}{}{}{}{}",
        lead.lead(),
        TICK,
        blanks(core_width.saturating_sub(2)),
        TICK,
        trail.trail()
    )
}

/// Coordinates printed on the ruler for a bound region `start..=end` of a
/// `full_len` sequence, left to right in reading order of the 5'->3' strand.
pub fn ruler_numbers(start: usize, end: usize, full_len: usize, ticks: usize) -> Vec<usize> {
    let mut nums = vec![1, start, end, full_len];

    if start == 1 {
        nums.remove(0);
    }
    if end == full_len {
        nums.pop();
    }
    if start == 2 {
        // INFO: "1" and "2" would collide over a one-base flank
        nums.remove(0);
    }
    if nums.len() > ticks {
        nums.pop();
    }

    nums
}

/// Number row derived from a marker row; `reversed` for the query strand,
/// which is printed 3'->5'.
pub fn number_row(
    markers: &str,
    start: usize,
    end: usize,
    full_len: usize,
    reversed: bool,
) -> Result<String, HybridError> {
    let ticks = markers
        .char_indices()
        .filter(|(_, c)| *c == TICK)
        .map(|(i, _)| i)
        .collect::<Vec<usize>>();

    let mut nums = ruler_numbers(start, end, full_len, ticks.len());
    if nums.len() != ticks.len() {
        return Err(HybridError::DiagramConsistency(format!(
            "{} coordinates for {} ruler ticks",
            nums.len(),
            ticks.len()
        )));
    }
    if reversed {
        nums.reverse();
    }

    Ok(ticks
        .iter()
        .zip(nums.iter())
        .fold(markers.to_string(), |row, (idx, num)| {
            overwrite_centered(&row, *idx, &num.to_string())
        }))
}

/// Replaces the text around `idx` with `label`, `len/2` characters to the
/// left of `idx` and the rest from `idx` on.
pub fn overwrite_centered(row: &str, idx: usize, label: &str) -> String {
    let pre = label.len() / 2;
    let suf = label.len() - pre;

    let left = idx.saturating_sub(pre).min(row.len());
    let right = (idx + suf).min(row.len()).max(left);

    format!("{}{}{}", &row[..left], label, &row[right..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_row_target_interior() {
        // head "5'-GGG...UAGCU" (14), core 16, tail "CGAUC...AAA-3'" (14)
        let row = marker_row(Edge::new(14, false, 5), 16, Edge::new(14, false, 10));
        assert_eq!(row, "   |          |              |          |   ");
    }

    #[test]
    fn test_marker_row_at_ends() {
        let row = marker_row(Edge::new(3, true, 5), 5, Edge::new(3, true, 10));
        assert_eq!(row, "   |   |   ");
    }

    #[test]
    fn test_marker_row_short_flanks() {
        let row = marker_row(Edge::new(4, false, 5), 1, Edge::new(9, false, 10));
        assert_eq!(row, "    ||         ");
    }

    #[test]
    fn test_ruler_numbers() {
        assert_eq!(ruler_numbers(4, 9, 13, 3), vec![1, 4, 9]);
        assert_eq!(ruler_numbers(1, 13, 13, 2), vec![1, 13]);
        assert_eq!(ruler_numbers(2, 7, 8, 2), vec![2, 7]);
        assert_eq!(ruler_numbers(17, 26, 53, 4), vec![1, 17, 26, 53]);
    }

    #[test]
    fn test_number_row_centering() {
        let row = number_row("   |  |    |    ", 4, 9, 13, false).unwrap();
        assert_eq!(row, "   1  4    9    ");

        let row = number_row("   |          |         |          |   ", 17, 26, 53, false).unwrap();
        assert_eq!(row, "   1         17        26         53   ");
    }

    #[test]
    fn test_number_row_reversed() {
        let row = number_row("   |    |   ", 2, 7, 8, true).unwrap();
        assert_eq!(row, "   7    2   ");
    }

    #[test]
    fn test_number_row_tick_mismatch() {
        let err = number_row("   |        ", 4, 9, 13, false).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_overwrite_centered_edges() {
        assert_eq!(overwrite_centered("|   ", 0, "12"), "12   ");
        assert_eq!(overwrite_centered("   |", 3, "123"), "  123");
    }
}
