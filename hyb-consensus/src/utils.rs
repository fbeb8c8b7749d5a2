use std::collections::BTreeMap;

use hybpack::{consensus, AmbiguousGroup, ConsensusSummary, Interaction, Tool};
use log::warn;

/// Records of one query, split by tool.
#[derive(Debug, Default)]
pub struct QueryGroup<'a> {
    pub query_id: &'a str,
    pub first: Vec<&'a Interaction>,
    pub second: Vec<&'a Interaction>,
}

/// Matched pairs of one query plus its summary row.
#[derive(Debug)]
pub struct QueryConsensus<'a> {
    pub summary: ConsensusSummary,
    pub pairs: Vec<(&'a Interaction, &'a Interaction)>,
    pub ambiguous: Vec<AmbiguousGroup>,
}

/// Groups both tables by query id; the union of ids comes back sorted.
pub fn group_by_query<'a>(first: &'a [Interaction], second: &'a [Interaction]) -> Vec<QueryGroup<'a>> {
    let mut groups: BTreeMap<&str, QueryGroup> = BTreeMap::new();

    for record in first {
        groups
            .entry(record.query_id.as_str())
            .or_insert_with(|| QueryGroup {
                query_id: &record.query_id,
                ..Default::default()
            })
            .first
            .push(record);
    }
    for record in second {
        groups
            .entry(record.query_id.as_str())
            .or_insert_with(|| QueryGroup {
                query_id: &record.query_id,
                ..Default::default()
            })
            .second
            .push(record);
    }

    groups.into_values().collect()
}

impl<'a> QueryGroup<'a> {
    pub fn resolve(&self, offset: usize) -> QueryConsensus<'a> {
        let report = consensus(&self.first, &self.second, offset);
        let matched = report.records();
        let pairs = report
            .pairs
            .iter()
            .map(|(a, b)| (self.first[*a], self.second[*b]))
            .collect::<Vec<_>>();

        let ambiguous = report.ambiguous;
        for group in &ambiguous {
            let first = group.first.iter().map(|i| self.first[*i]);
            let second = group.second.iter().map(|j| self.second[*j]);
            warn_ambiguous(group, first.chain(second));
        }

        QueryConsensus {
            summary: ConsensusSummary {
                query_id: self.query_id.to_string(),
                first: self.first.len(),
                second: self.second.len(),
                consensus: matched,
            },
            pairs,
            ambiguous,
        }
    }
}

fn warn_ambiguous<'a>(group: &AmbiguousGroup, records: impl Iterator<Item = &'a Interaction>) {
    let diagrams = records
        .map(|r| {
            format!(
                "{} {}-{} ({} kcal/mol)\n{}",
                r.tool, r.start_target, r.end_target, r.free_energy, r.diagram
            )
        })
        .collect::<Vec<String>>()
        .join("\n");

    warn!(
        "Ambiguous consensus for {}/{}, resolved one-to-one in table order:\n{}",
        group.query_id, group.target_id, diagrams
    );
}

/// Counts records whose `Tool` column disagrees with the table they came from.
pub fn count_foreign(records: &[Interaction], expected: Tool) -> usize {
    records.iter().filter(|r| r.tool != expected).count()
}
