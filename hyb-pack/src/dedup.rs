use config::{DEDUP_NARROW_SLACK, DEDUP_WIDE_SLACK};
use log::debug;

use crate::record::{BindingSite, Interaction};

/// Two sites on the same target are duplicates when one boundary moved by at
/// most the wide slack and the other by at most the narrow slack.
#[inline(always)]
pub fn is_duplicate_site(a: (usize, usize), b: (usize, usize)) -> bool {
    let ds = a.0.abs_diff(b.0);
    let de = a.1.abs_diff(b.1);

    (ds <= DEDUP_WIDE_SLACK && de <= DEDUP_NARROW_SLACK)
        || (ds <= DEDUP_NARROW_SLACK && de <= DEDUP_WIDE_SLACK)
}

/// Indices of records to drop, in ascending order.
///
/// Records must already be sorted so that each `(query, target)` pair forms
/// a contiguous run with the preferred record first. A record is dropped
/// when it duplicates an earlier record of its run that was itself kept.
pub fn dedupe<S: BindingSite>(records: &[S]) -> Vec<usize> {
    let mut drop = Vec::new();
    let mut kept: Vec<usize> = Vec::new();

    for (i, record) in records.iter().enumerate() {
        if let Some(first) = kept.first() {
            if !records[*first].same_pair(record) {
                kept.clear();
            }
        }

        let span = record.target_span();
        if kept
            .iter()
            .any(|k| is_duplicate_site(records[*k].target_span(), span))
        {
            drop.push(i);
        } else {
            kept.push(i);
        }
    }

    drop
}

/// Filters duplicates out of a sorted batch; returns survivors and drop count.
pub fn drop_duplicates(records: Vec<Interaction>) -> (Vec<Interaction>, usize) {
    let drop = dedupe(&records);
    let dropped = drop.len();

    let mut drop = drop.into_iter().peekable();
    let survivors = records
        .into_iter()
        .enumerate()
        .filter_map(|(i, record)| {
            if drop.peek() == Some(&i) {
                drop.next();
                debug!("Dropping duplicate {}", record.locus());
                None
            } else {
                Some(record)
            }
        })
        .collect();

    (survivors, dropped)
}
