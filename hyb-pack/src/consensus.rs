use std::collections::BTreeMap;

use hashbrown::{HashMap, HashSet};

use crate::record::BindingSite;

/// A `(query, target)` group where some record had more than one candidate
/// partner on the other side. Indices point into the two input slices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousGroup {
    pub query_id: String,
    pub target_id: String,
    pub first: Vec<usize>,
    pub second: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConsensusReport {
    /// `(index in first, index in second)`, sorted
    pub pairs: Vec<(usize, usize)>,
    pub ambiguous: Vec<AmbiguousGroup>,
}

impl ConsensusReport {
    /// every record taking part in a pair counts once
    pub fn records(&self) -> usize {
        self.pairs.len() * 2
    }
}

#[inline(always)]
pub fn is_consensus_site(a: (usize, usize), b: (usize, usize), offset: usize) -> bool {
    a.0.abs_diff(b.0) <= offset && a.1.abs_diff(b.1) <= offset
}

/// Matches sites reported by two tools for the same `(query, target)`.
///
/// Pairs are one-to-one: when a group is ambiguous, records of `second`
/// are taken in order and each claims the first unclaimed matching record
/// of `first`. Ambiguous groups are returned for review.
pub fn consensus<S: BindingSite>(first: &[S], second: &[S], offset: usize) -> ConsensusReport {
    let mut groups: BTreeMap<(&str, &str), (Vec<usize>, Vec<usize>)> = BTreeMap::new();
    for (i, record) in first.iter().enumerate() {
        groups
            .entry((record.query_id(), record.target_id()))
            .or_default()
            .0
            .push(i);
    }
    for (j, record) in second.iter().enumerate() {
        groups
            .entry((record.query_id(), record.target_id()))
            .or_default()
            .1
            .push(j);
    }

    let mut report = ConsensusReport::default();
    for ((query_id, target_id), (a_idx, b_idx)) in groups {
        if a_idx.is_empty() || b_idx.is_empty() {
            continue;
        }

        let candidates = b_idx
            .iter()
            .map(|b| {
                a_idx
                    .iter()
                    .copied()
                    .filter(|a| {
                        is_consensus_site(first[*a].target_span(), second[*b].target_span(), offset)
                    })
                    .collect::<Vec<usize>>()
            })
            .collect::<Vec<Vec<usize>>>();

        let mut a_hits: HashMap<usize, usize> = HashMap::new();
        candidates.iter().flatten().for_each(|a| {
            *a_hits.entry(*a).or_default() += 1;
        });

        let is_ambiguous =
            candidates.iter().any(|c| c.len() > 1) || a_hits.values().any(|n| *n > 1);

        let mut claimed = HashSet::new();
        for (b, cands) in b_idx.iter().zip(candidates.iter()) {
            if let Some(a) = cands.iter().find(|a| !claimed.contains(*a)) {
                claimed.insert(*a);
                report.pairs.push((*a, *b));
            }
        }

        if is_ambiguous {
            let mut involved_a = a_hits.keys().copied().collect::<Vec<usize>>();
            involved_a.sort_unstable();
            let involved_b = b_idx
                .iter()
                .zip(candidates.iter())
                .filter(|(_, c)| !c.is_empty())
                .map(|(b, _)| *b)
                .collect();

            report.ambiguous.push(AmbiguousGroup {
                query_id: query_id.to_string(),
                target_id: target_id.to_string(),
                first: involved_a,
                second: involved_b,
            });
        }
    }

    report.pairs.sort_unstable();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::site;
    use crate::record::Interaction;
    use config::CONSENSUS_OFFSET;

    #[test]
    fn test_consensus_boundaries() {
        assert!(is_consensus_site((100, 120), (102, 122), CONSENSUS_OFFSET));
        assert!(!is_consensus_site((100, 120), (103, 120), CONSENSUS_OFFSET));
        assert!(!is_consensus_site((100, 120), (100, 123), CONSENSUS_OFFSET));
    }

    #[test]
    fn test_consensus_pairs_within_groups() {
        let a = vec![
            site("q1", "t1", 100, 120, -30.0),
            site("q1", "t1", 300, 320, -20.0),
            site("q1", "t2", 100, 120, -20.0),
        ];
        let b = vec![
            site("q1", "t2", 300, 320, -22.0),
            site("q1", "t1", 102, 122, -28.0),
            site("q2", "t1", 100, 120, -28.0),
        ];

        let report = consensus(&a, &b, CONSENSUS_OFFSET);
        assert_eq!(report.pairs, vec![(0, 1)]);
        assert_eq!(report.records(), 2);
        assert!(report.ambiguous.is_empty());
    }

    #[test]
    fn test_consensus_symmetry() {
        let a = vec![
            site("q1", "t1", 100, 120, -30.0),
            site("q1", "t1", 200, 220, -20.0),
            site("q1", "t3", 50, 70, -20.0),
        ];
        let b = vec![
            site("q1", "t3", 51, 69, -21.0),
            site("q1", "t1", 199, 222, -28.0),
            site("q1", "t1", 140, 160, -28.0),
        ];

        let ab = consensus(&a, &b, CONSENSUS_OFFSET);
        let mut ba = consensus(&b, &a, CONSENSUS_OFFSET)
            .pairs
            .into_iter()
            .map(|(j, i)| (i, j))
            .collect::<Vec<_>>();
        ba.sort_unstable();

        assert_eq!(ab.pairs, vec![(1, 1), (2, 0)]);
        assert_eq!(ab.pairs, ba);
    }

    #[test]
    fn test_consensus_ambiguous_group() {
        let a = vec![
            site("q1", "t1", 100, 120, -30.0),
            site("q1", "t1", 101, 121, -29.0),
        ];
        let b = vec![site("q1", "t1", 100, 121, -28.0)];

        let report = consensus(&a, &b, CONSENSUS_OFFSET);
        assert_eq!(report.pairs, vec![(0, 0)]);
        assert_eq!(
            report.ambiguous,
            vec![AmbiguousGroup {
                query_id: "q1".to_string(),
                target_id: "t1".to_string(),
                first: vec![0, 1],
                second: vec![0],
            }]
        );
    }

    #[test]
    fn test_consensus_greedy_one_to_one() {
        let a = vec![
            site("q1", "t1", 100, 120, -30.0),
            site("q1", "t1", 102, 122, -29.0),
        ];
        let b = vec![
            site("q1", "t1", 101, 121, -28.0),
            site("q1", "t1", 100, 120, -27.0),
        ];

        let report = consensus(&a, &b, CONSENSUS_OFFSET);
        assert_eq!(report.pairs, vec![(0, 0), (1, 1)]);
        assert_eq!(report.ambiguous.len(), 1);
    }

    #[test]
    fn test_consensus_empty_side() {
        let a: Vec<Interaction> = vec![site("q1", "t1", 100, 120, -30.0)];
        assert!(consensus(&a, &[], CONSENSUS_OFFSET).pairs.is_empty());
    }
}
