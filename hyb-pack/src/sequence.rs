use anyhow::{anyhow, bail, Context, Result};
use bio::io::fasta;
use hashbrown::HashMap;
use log::info;
use serde::{Deserialize, Serialize};

use std::path::Path;

use crate::error::HybridError;
use crate::reader;

/// Which side of an interaction a table holds; decides the info-table labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    Query,
    Target,
}

#[derive(Debug, Serialize, Deserialize)]
struct QueryInfo {
    #[serde(rename = "tRF_ID")]
    id: String,
    #[serde(rename = "tRF_Seq")]
    sequence: String,
    #[serde(rename = "tRF_Length")]
    length: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct TargetInfo {
    #[serde(rename = "Trans_ID")]
    id: String,
    #[serde(rename = "Trans_Seq")]
    sequence: String,
    #[serde(rename = "Trans_Length")]
    length: usize,
}

/// Read-only `id -> sequence` map built once per run.
///
/// Sequences are stored upper-cased with T replaced by U, so every later
/// lookup, search and pairing check works on RNA letters only.
#[derive(Debug, Default, Clone)]
pub struct SequenceTable {
    kind: Option<SequenceKind>,
    seqs: HashMap<String, String>,
}

pub fn to_rna(seq: &str) -> String {
    seq.trim()
        .chars()
        .map(|c| match c.to_ascii_uppercase() {
            'T' => 'U',
            other => other,
        })
        .collect()
}

impl SequenceTable {
    pub fn new(kind: SequenceKind) -> Self {
        Self {
            kind: Some(kind),
            seqs: HashMap::new(),
        }
    }

    /// Loads FASTA (plain or gzip) or a previously written info table.
    pub fn from_path<P: AsRef<Path>>(path: P, kind: SequenceKind) -> Result<Self> {
        let path = path.as_ref();
        let contents = reader(path)?;
        let fname = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or_default();

        let table = if fname.ends_with(".csv") {
            Self::from_info(&contents, kind)
        } else if config::FASTA_EXTENSIONS.iter().any(|ext| fname.ends_with(ext)) {
            Self::from_fasta(&contents, kind)
        } else {
            bail!("ERROR: unrecognized sequence file format: {}", path.display());
        }
        .with_context(|| format!("while reading {}", path.display()))?;

        info!(
            "Sequences read from {}: {}",
            path.display(),
            table.seqs.len()
        );

        Ok(table)
    }

    pub fn from_fasta(contents: &str, kind: SequenceKind) -> Result<Self> {
        let mut table = Self::new(kind);

        for record in fasta::Reader::new(contents.as_bytes()).records() {
            let record = record.context("ERROR: malformed FASTA record")?;
            record
                .check()
                .map_err(|e| anyhow!("ERROR: FASTA record {:?}: {}", record.id(), e))?;

            let seq = std::str::from_utf8(record.seq())?;
            table.insert(record.id().to_string(), seq)?;
        }

        if table.is_empty() {
            bail!("ERROR: no FASTA records found");
        }

        Ok(table)
    }

    pub fn from_info(contents: &str, kind: SequenceKind) -> Result<Self> {
        let mut table = Self::new(kind);
        let mut rdr = csv::Reader::from_reader(contents.as_bytes());

        match kind {
            SequenceKind::Query => {
                for row in rdr.deserialize::<QueryInfo>() {
                    let row = row?;
                    table.insert(row.id, &row.sequence)?;
                }
            }
            SequenceKind::Target => {
                for row in rdr.deserialize::<TargetInfo>() {
                    let row = row?;
                    table.insert(row.id, &row.sequence)?;
                }
            }
        }

        if table.is_empty() {
            bail!("ERROR: sequence info table has no rows");
        }

        Ok(table)
    }

    pub fn insert(&mut self, id: String, seq: &str) -> Result<()> {
        let seq = to_rna(seq);
        if !seq.is_ascii() {
            bail!("ERROR: sequence {} contains non-ASCII symbols", id);
        }
        if self.seqs.contains_key(&id) {
            bail!("ERROR: duplicate sequence identifier {}", id);
        }

        self.seqs.insert(id, seq);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<&str, HybridError> {
        self.seqs
            .get(id.trim())
            .map(|s| s.as_str())
            .ok_or_else(|| HybridError::UnknownSequence(id.trim().to_string()))
    }

    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }

    /// Writes `<ID>,<Seq>,<Length>` rows sorted by identifier.
    pub fn write_info<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut ids = self.seqs.keys().collect::<Vec<_>>();
        ids.sort_unstable();

        let mut wtr = csv::Writer::from_path(path.as_ref())?;
        for id in ids {
            let seq = &self.seqs[id];
            match self.kind {
                Some(SequenceKind::Target) => wtr.serialize(TargetInfo {
                    id: id.clone(),
                    sequence: seq.clone(),
                    length: seq.len(),
                })?,
                _ => wtr.serialize(QueryInfo {
                    id: id.clone(),
                    sequence: seq.clone(),
                    length: seq.len(),
                })?,
            }
        }
        wtr.flush()?;

        Ok(())
    }
}

/// Loads query and target tables side by side.
pub fn load_sequences<P, Q>(queries: P, targets: Q) -> Result<(SequenceTable, SequenceTable)>
where
    P: AsRef<Path> + Send,
    Q: AsRef<Path> + Send,
{
    let (queries, targets) = rayon::join(
        || SequenceTable::from_path(queries, SequenceKind::Query),
        || SequenceTable::from_path(targets, SequenceKind::Target),
    );

    Ok((queries?, targets?))
}

/// Writes `trfs_info.csv` and `transcripts_info.csv` into `outdir`.
pub fn write_sequence_info(
    outdir: &Path,
    queries: &SequenceTable,
    targets: &SequenceTable,
) -> Result<()> {
    std::fs::create_dir_all(outdir)?;
    queries.write_info(outdir.join(config::QUERY_INFO))?;
    targets.write_info(outdir.join(config::TARGET_INFO))?;

    info!("Sequence info tables written to {}", outdir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_fasta_multiline_and_rna() {
        let fasta = ">tRF-1 some description\nacgt\nTTGA\n\n>tRF-2\nGGCC\n";
        let table = SequenceTable::from_fasta(fasta, SequenceKind::Query).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("tRF-1").unwrap(), "ACGUUUGA");
        assert_eq!(table.get(" tRF-2 ").unwrap(), "GGCC");
    }

    #[test]
    fn test_fasta_duplicate_id() {
        let fasta = ">a\nACGU\n>a\nGGGG\n";
        assert!(SequenceTable::from_fasta(fasta, SequenceKind::Target).is_err());
    }

    #[test]
    fn test_fasta_invalid() {
        assert!(SequenceTable::from_fasta("ACGU\n>a\nACGU\n", SequenceKind::Target).is_err());
        assert!(SequenceTable::from_fasta("\n\n", SequenceKind::Target).is_err());
        assert!(SequenceTable::from_fasta("", SequenceKind::Target).is_err());
        assert!(SequenceTable::from_fasta(">\nACGU\n", SequenceKind::Target).is_err());
        assert!(SequenceTable::from_fasta(">a\nAC\u{e9}GU\n", SequenceKind::Target).is_err());
    }

    #[test]
    fn test_unknown_sequence() {
        let table = SequenceTable::from_fasta(">a\nACGU\n", SequenceKind::Target).unwrap();
        match table.get("b") {
            Err(HybridError::UnknownSequence(id)) => assert_eq!(id, "b"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_info_table_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let fasta = dir.path().join("transcripts.fa");
        let mut file = std::fs::File::create(&fasta).unwrap();
        write!(file, ">ENST1\nAUGGCU\n>ENST0\nCCCA\n").unwrap();

        let table = SequenceTable::from_path(&fasta, SequenceKind::Target).unwrap();
        let info = dir.path().join(config::TARGET_INFO);
        table.write_info(&info).unwrap();

        let written = std::fs::read_to_string(&info).unwrap();
        assert!(written.starts_with("Trans_ID,Trans_Seq,Trans_Length\nENST0,CCCA,4\n"));

        let back = SequenceTable::from_path(&info, SequenceKind::Target).unwrap();
        assert_eq!(back.get("ENST1").unwrap(), "AUGGCU");
    }
}
