/// hybtools: reconcile tRF-transcript interactions from RNAhybrid and IntaRNA
///
/// This is the entry point for the hybtools CLI.
/// It parses the subcommand and hands the remaining
/// arguments to the matching hyb-tool in-process.
///
/// This wrapper offers 4 subcommands:
/// - rnahybrid
/// - intarna
/// - consensus
/// - run
///
/// 'run' chains the other three into a single output
/// directory. Two hidden crates back every tool: 'hyb-pack',
/// holding records, tables and the shared algorithms, and
/// 'config', holding the constants and argument checks.
///
/// To get help on the subcommands, you can run:
///
/// ```shell
/// hybtools rnahybrid -- --help
/// ```
///
use clap::{Args, Parser, Subcommand};
use hyb_consensus::lib_hyb_consensus;
use hyb_intarna::lib_hyb_intarna;
use hyb_rnahybrid::lib_hyb_rnahybrid;
use hybtools::{run, thread_count};
use log::{error, info, Level};
use simple_logger::init_with_level;

const HELP: &str = r#"
Usage: hybtools run --targets <PATH> --queries <PATH> --rnahybrid <PATHS> --intarna <PATH> --outdir <DIR>

 Options:
  --targets <PATH>            Path to target transcripts [FASTA, FASTA.gz]
  --queries <PATH>            Path to query tRFs [FASTA, FASTA.gz]
  --rnahybrid <PATHS>         Captured RNAhybrid outputs delimited by comma
  --intarna <PATH>            IntaRNA ';'-separated CSV output
  --outdir <DIR>              Output directory for every step
  --min-run <LENGTH>          Minimum longest paired run for RNAhybrid hits [default: 6]
  --max-mfe <MFE>             Drop RNAhybrid hits above this free energy
  --offset <NT>               Consensus tolerance on target starts and ends [default: 2]
  -t, --threads <THREADS>     Number of threads
  -h, --help                  Print help
"#;

#[derive(Parser)]
#[command(name = "hybtools")]
#[command(about = "hybtools: reconcile tRF-transcript interactions from RNAhybrid and IntaRNA")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(name = "rnahybrid")]
    RnaHybrid(HybArgs),
    #[command(name = "intarna")]
    IntaRna(HybArgs),
    #[command(name = "consensus")]
    Consensus(HybArgs),
    #[command(name = "run")]
    Run(HybArgs),
}

#[derive(Args)]
struct HybArgs {
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, help = HELP)]
    args: Vec<String>,
}

fn main() {
    let start = std::time::Instant::now();
    init_with_level(Level::Info).unwrap();
    let cli = Cli::parse();

    init();

    let args = match &cli.command {
        Commands::RnaHybrid(args)
        | Commands::IntaRna(args)
        | Commands::Consensus(args)
        | Commands::Run(args) => args.args.clone(),
    };

    if let Some(threads) = thread_count(&args) {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .unwrap();
    }

    let result = match cli.command {
        Commands::RnaHybrid(_) => lib_hyb_rnahybrid(args).map(|table| vec![table]),
        Commands::IntaRna(_) => lib_hyb_intarna(args).map(|table| vec![table]),
        Commands::Consensus(_) => lib_hyb_consensus(args).map(|(table, stats)| vec![table, stats]),
        Commands::Run(_) => run(args).map(|(table, stats)| vec![table, stats]),
    };

    match result {
        Ok(outputs) => outputs
            .iter()
            .for_each(|path| info!("Output written to {}", path.display())),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }

    let elapsed = start.elapsed();
    info!("Elapsed time: {:?}", elapsed);
}

fn init() {
    let message = format!(
        r#"

        hybtools: reconcile tRF-transcript interactions
        predicted by RNAhybrid and IntaRNA

        this is the entry point for the hybtools CLI
        and it is responsible for dispatching the
        arguments to each hyb-tool:

        - rnahybrid
        - intarna
        - consensus
        - run (all of the above)

        > version: {}

        * to get help on the subcommands, run:
            hybtools <SUBCOMMAND> -- --help

        "#,
        env!("CARGO_PKG_VERSION")
    );

    println!("{}", message);
}
