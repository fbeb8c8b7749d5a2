use clap::{ArgAction, Parser};
use config::{ArgCheck, MIN_RUN_LENGTH};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "hyb-rnahybrid")]
#[command(about = "Normalize captured RNAhybrid output into an interaction table")]
#[command(version = config::VERSION)]
pub struct Args {
    #[arg(
        short = 'r',
        long = "targets",
        required = true,
        value_name = "PATH",
        help = "Path to target transcripts [FASTA, FASTA.gz or transcripts_info.csv]"
    )]
    pub targets: PathBuf,

    #[arg(
        short = 'q',
        long = "queries",
        required = true,
        value_name = "PATH",
        help = "Path to query tRFs [FASTA, FASTA.gz or trfs_info.csv]"
    )]
    pub queries: PathBuf,

    #[arg(
        short = 'i',
        long = "input",
        required = true,
        value_name = "PATHS",
        value_delimiter = ',',
        num_args = 1..,
        help = "Paths to captured RNAhybrid outputs delimited by comma"
    )]
    pub inputs: Vec<PathBuf>,

    #[arg(
        short = 'm',
        long = "min-run",
        help = "Minimum length of the longest paired run",
        value_name = "LENGTH",
        default_value_t = MIN_RUN_LENGTH
    )]
    pub min_run: usize,

    #[arg(
        short = 'e',
        long = "max-mfe",
        help = "Drop hits with a free energy above this value [kcal/mol]",
        value_name = "MFE",
        allow_hyphen_values = true
    )]
    pub max_mfe: Option<f64>,

    #[arg(
        long = "with-pval",
        help = "Flag to keep the P_Val column in the output table",
        value_name = "FLAG",
        default_missing_value("true"),
        default_value("false"),
        num_args(0..=1),
        require_equals(true),
        action = ArgAction::Set,
    )]
    pub with_pval: bool,

    #[arg(
        long = "no-info",
        help = "Flag to skip writing the sequence info tables",
        value_name = "FLAG",
        default_missing_value("true"),
        default_value("false"),
        num_args(0..=1),
        require_equals(true),
        action = ArgAction::Set,
    )]
    pub no_info: bool,

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
        vec![&self.targets, &self.queries]
    }

    fn get_inputs(&self) -> Vec<&PathBuf> {
        self.inputs.iter().collect()
    }

    fn input_extensions(&self) -> &[&str] {
        &[]
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
