use anyhow::{bail, Result};
use config::RNAHYBRID_RESULTS;
use hybpack::{load_sequences, normalize_all, par_reader, write_sequence_info};
use log::info;

use std::path::PathBuf;

use crate::cli::Args;
use crate::utils::RnaHybridAdapter;

/// Normalizes every captured RNAhybrid output into `rnahybrid_results.csv`.
pub fn parse_rnahybrid(args: Args) -> Result<PathBuf> {
    info!("Normalizing RNAhybrid hits...");

    let (queries, targets) = load_sequences(&args.queries, &args.targets)?;
    if queries.is_empty() || targets.is_empty() {
        bail!("ERROR: no sequences to resolve hits against!");
    }

    let raws = par_reader(&args.inputs)?;
    let adapter = RnaHybridAdapter::new(args.min_run, args.max_mfe);
    let batch = normalize_all(&adapter, &raws, &queries, &targets);

    if !args.no_info {
        write_sequence_info(&args.outdir, &queries, &targets)?;
    }

    let table = batch.finish(&args.outdir, RNAHYBRID_RESULTS, args.with_pval)?;
    info!("RNAhybrid results written to {}", table.display());

    Ok(table)
}
