use anyhow::{anyhow, bail, Result};
use config::{validate, QUERY_INFO, TABLE_EXTENSIONS, TARGET_INFO};
use log::info;

use hyb_consensus::lib_hyb_consensus;
use hyb_intarna::lib_hyb_intarna;
use hyb_rnahybrid::lib_hyb_rnahybrid;

use std::path::{Path, PathBuf};

const KEYS: [&str; 5] = ["--targets", "--queries", "--rnahybrid", "--intarna", "--outdir"];
const RNAHYBRID_PASSTHROUGH: [&str; 2] = ["--min-run", "--max-mfe"];
const CONSENSUS_PASSTHROUGH: [&str; 1] = ["--offset"];

/// Runs RNAhybrid normalization, IntaRNA normalization and the consensus
/// check into one output directory. The IntaRNA step reads the sequence
/// info tables written by the RNAhybrid step.
///
/// Returns the consensus table and the per-query summary.
pub fn run(args: Vec<String>) -> Result<(PathBuf, PathBuf)> {
    check_args(&args)?;
    // step 2 input is checked here so a bad path fails before step 1 writes
    validate(&PathBuf::from(value_of(&args, "--intarna")?), &TABLE_EXTENSIONS)?;

    let outdir = PathBuf::from(value_of(&args, "--outdir")?);
    let outdir_arg = outdir.display().to_string();

    let mut rnahybrid_args = vec![
        "--targets".to_string(),
        value_of(&args, "--targets")?,
        "--queries".to_string(),
        value_of(&args, "--queries")?,
        "--input".to_string(),
        value_of(&args, "--rnahybrid")?,
        "--outdir".to_string(),
        outdir_arg.clone(),
        "--with-pval".to_string(),
    ];
    rnahybrid_args.extend(forward(&args, &RNAHYBRID_PASSTHROUGH));

    info!("Step 1/3: RNAhybrid");
    let rnahybrid = lib_hyb_rnahybrid(rnahybrid_args)?;

    let intarna_args = vec![
        "--targets".to_string(),
        info_path(&outdir, TARGET_INFO),
        "--queries".to_string(),
        info_path(&outdir, QUERY_INFO),
        "--input".to_string(),
        value_of(&args, "--intarna")?,
        "--outdir".to_string(),
        outdir_arg.clone(),
    ];

    info!("Step 2/3: IntaRNA");
    let intarna = lib_hyb_intarna(intarna_args)?;

    let mut consensus_args = vec![
        "--rnahybrid".to_string(),
        rnahybrid.display().to_string(),
        "--intarna".to_string(),
        intarna.display().to_string(),
        "--outdir".to_string(),
        outdir_arg,
    ];
    consensus_args.extend(forward(&args, &CONSENSUS_PASSTHROUGH));

    info!("Step 3/3: consensus");
    lib_hyb_consensus(consensus_args)
}

/// Value of `--threads`/`-t` if present, used to size the global pool.
pub fn thread_count(args: &[String]) -> Option<usize> {
    ["--threads", "-t"]
        .iter()
        .find_map(|key| value_of(args, key).ok())
        .and_then(|v| v.parse::<usize>().ok())
}

/// Check if all required arguments are present
fn check_args(args: &[String]) -> Result<()> {
    let missing = KEYS
        .iter()
        .copied()
        .filter(|key| value_of(args, key).is_err())
        .collect::<Vec<&str>>();

    if !missing.is_empty() {
        bail!("ERROR: missing required arguments: {}", missing.join(", "));
    }

    Ok(())
}

// INFO: accepts both "--key value" and "--key=value"
fn value_of(args: &[String], key: &str) -> Result<String> {
    let prefix = format!("{}=", key);
    for (i, arg) in args.iter().enumerate() {
        if arg == key {
            return args
                .get(i + 1)
                .cloned()
                .ok_or_else(|| anyhow!("ERROR: {} expects a value", key));
        }
        if let Some(value) = arg.strip_prefix(&prefix) {
            return Ok(value.to_string());
        }
    }

    Err(anyhow!("ERROR: {} not provided", key))
}

fn forward(args: &[String], keys: &[&str]) -> Vec<String> {
    keys.iter()
        .filter_map(|key| {
            value_of(args, key)
                .ok()
                .map(|value| [key.to_string(), value])
        })
        .flatten()
        .collect()
}

fn info_path(outdir: &Path, fname: &str) -> String {
    outdir.join(fname).display().to_string()
}
