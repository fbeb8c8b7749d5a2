use clap::Parser;
use config::{ArgCheck, CONSENSUS_OFFSET, TABLE_EXTENSIONS};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "hyb-consensus")]
#[command(about = "Find binding sites predicted by both RNAhybrid and IntaRNA")]
#[command(version = config::VERSION)]
pub struct Args {
    #[arg(
        short = 'r',
        long = "rnahybrid",
        required = true,
        value_name = "PATH",
        help = "Path to rnahybrid_results.csv"
    )]
    pub rnahybrid: PathBuf,

    #[arg(
        short = 'i',
        long = "intarna",
        required = true,
        value_name = "PATH",
        help = "Path to parsed_intarna_results.csv"
    )]
    pub intarna: PathBuf,

    #[arg(
        short = 'f',
        long = "offset",
        help = "Maximum distance between target starts and ends of matched sites",
        value_name = "NT",
        default_value_t = CONSENSUS_OFFSET
    )]
    pub offset: usize,

    #[arg(
        short = 'o',
        long = "outdir",
        help = "Output directory",
        value_name = "DIR",
        default_value = "."
    )]
    pub outdir: PathBuf,

    #[arg(
        short = 't',
        long = "threads",
        help = "Number of threads",
        value_name = "THREADS",
        default_value_t = num_cpus::get()
    )]
    pub threads: usize,
}

impl ArgCheck for Args {
    fn get_sequences(&self) -> Vec<&PathBuf> {
        vec![]
    }

    fn get_inputs(&self) -> Vec<&PathBuf> {
        vec![&self.rnahybrid, &self.intarna]
    }

    fn input_extensions(&self) -> &[&str] {
        &TABLE_EXTENSIONS
    }

    fn get_outdir(&self) -> &PathBuf {
        &self.outdir
    }
}

impl Args {
    pub fn from(args: Vec<String>) -> Self {
        let mut full_args = vec![env!("CARGO_PKG_NAME").to_string()];
        full_args.extend(args);

        Args::parse_from(full_args)
    }
}
