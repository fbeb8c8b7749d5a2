//! Shared core of hybtools.
//!
//! Holds the interaction record, the sequence and result tables, and the
//! algorithms both tool adapters run through: coordinate resolution,
//! diagram parsing and rendering, longest-run extraction, deduplication
//! and cross-tool consensus.

use std::fmt::Debug;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use flate2::read::MultiGzDecoder;
use rayon::prelude::*;

pub mod adapter;
pub mod consensus;
pub mod coords;
pub mod dedup;
pub mod error;
pub mod parse;
pub mod record;
pub mod render;
pub mod ruler;
pub mod runs;
pub mod sequence;
pub mod table;

pub use adapter::{normalize, normalize_all, Batch, RawHit, Skipped, ToolAdapter};
pub use consensus::{consensus, AmbiguousGroup, ConsensusReport};
pub use coords::resolve;
pub use dedup::{dedupe, drop_duplicates};
pub use error::HybridError;
pub use parse::{parse_diagram, parse_rendered};
pub use record::{sort_records, BindingSite, Duplex, Interaction, Tool};
pub use render::{render, Region};
pub use runs::{longest_run, DiagramLayout, LongestRun};
pub use sequence::{load_sequences, write_sequence_info, SequenceKind, SequenceTable};
pub use table::{read_table, write_summary, write_table, ConsensusSummary, COLUMNS};

/// Reads a whole file, transparently decompressing `.gz`.
pub fn reader<P: AsRef<Path> + Debug>(file: P) -> Result<String, anyhow::Error> {
    let path = file.as_ref();
    let handle = File::open(path).with_context(|| format!("cannot open {:?}", path))?;

    let mut contents = String::new();
    if path.extension().map_or(false, |ext| ext == "gz") {
        MultiGzDecoder::new(handle)
            .read_to_string(&mut contents)
            .with_context(|| format!("cannot decompress {:?}", path))?;
    } else {
        let mut handle = handle;
        handle
            .read_to_string(&mut contents)
            .with_context(|| format!("cannot read {:?}", path))?;
    }

    // INFO: tool outputs captured on windows hosts carry CRLF
    if contents.contains('\r') {
        contents = contents.replace("\r\n", "\n");
    }

    Ok(contents)
}

/// Reads every file in parallel, keeping each file's contents apart.
pub fn par_reader<P: AsRef<Path> + Debug + Sync + Send>(
    files: &[P],
) -> Result<Vec<String>, anyhow::Error> {
    files.par_iter().map(|path| reader(path)).collect()
}
