pub mod cli;
pub mod core;
pub mod utils;

use anyhow::Result;
use config::ArgCheck;
use std::path::PathBuf;

pub fn lib_hyb_consensus(args: Vec<String>) -> Result<(PathBuf, PathBuf)> {
    let args = cli::Args::from(args);
    args.check()?;

    crate::core::check_consensus(args)
}
