pub mod cli;
pub mod core;
pub mod utils;

use anyhow::Result;
use config::ArgCheck;
use std::path::PathBuf;

pub fn lib_hyb_intarna(args: Vec<String>) -> Result<PathBuf> {
    let args = cli::Args::from(args);
    args.check()?;

    crate::core::parse_intarna(args)
}
