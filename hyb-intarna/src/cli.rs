use clap::{ArgAction, Parser};
use config::{ArgCheck, TABLE_EXTENSIONS};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "hyb-intarna")]
#[command(about = "Normalize IntaRNA CSV output into an interaction table")]
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
        help = "Paths to IntaRNA ';'-separated CSV outputs delimited by comma"
    )]
    pub inputs: Vec<PathBuf>,

    #[arg(
        long = "with-pval",
        help = "Flag to keep the (empty) P_Val column in the output table",
        value_name = "FLAG",
        default_missing_value("true"),
        default_value("false"),
        num_args(0..=1),
        require_equals(true),
        action = ArgAction::Set,
    )]
    pub with_pval: bool,

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_from_vec() {
        let args = Args::from(
            ["-r", "t.fa.gz", "-q", "q.fa", "-i", "intarna_results.csv", "--with-pval"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );

        assert_eq!(args.inputs, vec![PathBuf::from("intarna_results.csv")]);
        assert!(args.with_pval);
        assert_eq!(args.input_extensions(), &[".csv"]);
    }
}
