pub mod cli;
pub mod core;
pub mod utils;

use anyhow::Result;
use config::ArgCheck;
use std::path::PathBuf;

pub fn lib_hyb_rnahybrid(args: Vec<String>) -> Result<PathBuf> {
    let args = cli::Args::from(args);
    args.check()?;

    crate::core::parse_rnahybrid(args)
}
