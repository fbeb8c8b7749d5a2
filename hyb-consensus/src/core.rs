use anyhow::Result;
use config::{CONSENSUS_RESULTS, CONSENSUS_STATS};
use hybpack::{read_table, write_summary, write_table, ConsensusSummary, Interaction, Tool};
use log::{info, warn};
use rayon::prelude::*;

use std::path::PathBuf;

use crate::cli::Args;
use crate::utils::*;

/// Cross-checks both tool tables and writes the consensus table and the
/// per-query summary. Returns both paths in that order.
pub fn check_consensus(args: Args) -> Result<(PathBuf, PathBuf)> {
    info!("Checking consensus between RNAhybrid and IntaRNA...");

    let (first, second) = rayon::join(|| read_table(&args.rnahybrid), || read_table(&args.intarna));
    let (first, second) = (first?, second?);

    for (records, tool) in [(&first, Tool::RNAhybrid), (&second, Tool::IntaRNA)] {
        let foreign = count_foreign(records, tool);
        if foreign > 0 {
            warn!(
                "{} records in the {} table carry another Tool value",
                foreign, tool
            );
        }
    }

    let groups = group_by_query(&first, &second);
    let outcomes = groups
        .par_iter()
        .map(|group| group.resolve(args.offset))
        .collect::<Vec<QueryConsensus>>();

    let ambiguous = outcomes.iter().map(|o| o.ambiguous.len()).sum::<usize>();
    if ambiguous > 0 {
        warn!("Ambiguous (query, target) groups: {}", ambiguous);
    }

    let rows = outcomes
        .iter()
        .flat_map(|o| o.pairs.iter().flat_map(|(a, b)| [*a, *b]))
        .collect::<Vec<&Interaction>>();
    let summary = outcomes
        .into_iter()
        .map(|o| o.summary)
        .collect::<Vec<ConsensusSummary>>();

    std::fs::create_dir_all(&args.outdir)?;
    let table = args.outdir.join(CONSENSUS_RESULTS);
    let stats = args.outdir.join(CONSENSUS_STATS);

    let pairs = write_table(&table, rows, true)? / 2;
    write_summary(&stats, (Tool::RNAhybrid, Tool::IntaRNA), &summary)?;

    info!(
        "Consensus pairs: {} across {} queries",
        pairs,
        summary.iter().filter(|s| s.consensus > 0).count()
    );

    Ok((table, stats))
}
