pub mod fns;
pub use fns::*;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// numeric values
pub const SEARCH_WINDOW_SLACK: usize = 50;
pub const DEDUP_WIDE_SLACK: usize = 8;
pub const DEDUP_NARROW_SLACK: usize = 5;
pub const CONSENSUS_OFFSET: usize = 2;
pub const MIN_RUN_LENGTH: usize = 6;

// file names
pub const RNAHYBRID_RESULTS: &str = "rnahybrid_results.csv";
pub const INTARNA_RESULTS: &str = "parsed_intarna_results.csv";
pub const CONSENSUS_RESULTS: &str = "consensus_results.csv";
pub const CONSENSUS_STATS: &str = "tRF_level_consensus_stats.csv";
pub const QUERY_INFO: &str = "trfs_info.csv";
pub const TARGET_INFO: &str = "transcripts_info.csv";
pub const SKIPPED: &str = "skipped.txt";
pub const STATS: &str = "stats.json";

// accepted extensions
pub const FASTA_EXTENSIONS: [&str; 6] = [".fa", ".fasta", ".fna", ".fa.gz", ".fasta.gz", ".fna.gz"];
pub const SEQUENCE_EXTENSIONS: [&str; 7] = [
    ".fa",
    ".fasta",
    ".fna",
    ".fa.gz",
    ".fasta.gz",
    ".fna.gz",
    ".csv",
];
pub const TABLE_EXTENSIONS: [&str; 1] = [".csv"];

// column labels
pub const QUERY_LABEL: &str = "tRF";
pub const TARGET_LABEL: &str = "target";
