use anyhow::{bail, Result};
use config::INTARNA_RESULTS;
use hybpack::{load_sequences, normalize_all, par_reader};
use log::info;

use std::path::PathBuf;

use crate::cli::Args;
use crate::utils::IntaRnaAdapter;

/// Normalizes IntaRNA tables into `parsed_intarna_results.csv`.
pub fn parse_intarna(args: Args) -> Result<PathBuf> {
    info!("Normalizing IntaRNA hits...");

    let (queries, targets) = load_sequences(&args.queries, &args.targets)?;
    if queries.is_empty() || targets.is_empty() {
        bail!("ERROR: no sequences to resolve hits against!");
    }

    let raws = par_reader(&args.inputs)?;
    let batch = normalize_all(&IntaRnaAdapter, &raws, &queries, &targets);

    let table = batch.finish(&args.outdir, INTARNA_RESULTS, args.with_pval)?;
    info!("IntaRNA results written to {}", table.display());

    Ok(table)
}
