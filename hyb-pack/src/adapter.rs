use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use config::{get_progress_bar, write_json, write_objs, SKIPPED, STATS};
use dashmap::DashMap;
use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::coords::resolve;
use crate::dedup::drop_duplicates;
use crate::error::HybridError;
use crate::record::{sort_records, Duplex, Interaction, Tool};
use crate::render::{render, Region};
use crate::runs::{longest_run, DiagramLayout};
use crate::sequence::{to_rna, SequenceTable};
use crate::table::write_table;

/// What a tool reports for one interaction, before coordinates and the
/// diagram are derived.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawHit {
    pub query_id: String,
    pub target_id: String,
    pub free_energy: f64,
    pub p_value: Option<f64>,
    pub subsequence: Duplex,
    pub structure: Duplex,
    /// approximate 1-based target position printed by the tool
    pub target_hint: Option<usize>,
    /// exact spans, when the tool prints them
    pub target_span: Option<(usize, usize)>,
    pub query_span: Option<(usize, usize)>,
    /// longest paired run counted on the tool's own diagram
    pub reported_run: Option<usize>,
}

impl RawHit {
    pub fn locus(&self) -> String {
        format!("{}/{}", self.query_id, self.target_id)
    }
}

/// A hit that could not be turned into a record.
#[derive(Debug)]
pub struct Skipped {
    pub locus: String,
    pub reason: HybridError,
}

impl Skipped {
    pub fn new<S: Into<String>>(locus: S, reason: HybridError) -> Self {
        Self {
            locus: locus.into(),
            reason,
        }
    }
}

impl fmt::Display for Skipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.locus, self.reason)
    }
}

/// Turns one tool's captured output into raw hits.
pub trait ToolAdapter: Sync {
    fn tool(&self) -> Tool;

    /// Splits one captured output into hits; unreadable hits come back as
    /// [`Skipped`] in place so the rest of the output is still used.
    fn read_hits(&self, raw: &str) -> Vec<Result<RawHit, Skipped>>;

    /// Pre-filter applied before any coordinate work.
    fn accept(&self, _hit: &RawHit) -> bool {
        true
    }
}

fn check_span(full: &str, sub: &str, span: (usize, usize), side: &str) -> Result<(), HybridError> {
    let (start, end) = span;
    let slice = if start >= 1 && start <= end {
        full.get(start - 1..end)
    } else {
        None
    };

    match slice {
        Some(slice) if slice == sub => Ok(()),
        _ => Err(HybridError::DiagramConsistency(format!(
            "{} span {}..{} does not hold {}",
            side, start, end, sub
        ))),
    }
}

/// Resolves coordinates, renders the diagram and extracts the longest run.
pub fn normalize(
    hit: &RawHit,
    tool: Tool,
    queries: &SequenceTable,
    targets: &SequenceTable,
) -> Result<Interaction, HybridError> {
    let target_seq = targets.get(&hit.target_id)?;
    let query_seq = queries.get(&hit.query_id)?;

    let subsequence = Duplex::new(to_rna(&hit.subsequence.target), to_rna(&hit.subsequence.query));

    let (start_target, end_target) = match hit.target_span {
        Some(span) => {
            check_span(target_seq, &subsequence.target, span, "target")?;
            span
        }
        None => resolve(target_seq, &subsequence.target, hit.target_hint)?,
    };
    let (start_query, end_query) = match hit.query_span {
        Some(span) => {
            check_span(query_seq, &subsequence.query, span, "query")?;
            span
        }
        None => resolve(query_seq, &subsequence.query, None)?,
    };

    let diagram = render(
        Region::new(target_seq, start_target, end_target),
        Region::new(query_seq, start_query, end_query),
        &subsequence,
        &hit.structure,
    )?;
    let run = longest_run(&diagram, DiagramLayout::Rendered)?;

    Ok(Interaction {
        query_id: hit.query_id.trim().to_string(),
        target_id: hit.target_id.trim().to_string(),
        free_energy: hit.free_energy,
        p_value: hit.p_value,
        diagram,
        max_run_length: run.length,
        start_query,
        end_query,
        start_target,
        end_target,
        tool,
        structure: hit.structure.to_string(),
        subsequence: subsequence.to_string(),
        max_run_subsequence: run.to_string(),
    })
}

/// Outcome counts of one normalization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub tool: String,
    pub hits: u32,
    pub rejected: u32,
    pub malformed: u32,
    pub unresolved: u32,
    pub normalized: u32,
    pub duplicates: u32,
    pub written: u32,
}

struct ParallelCounter {
    hits: AtomicU32,
    rejected: AtomicU32,
    malformed: AtomicU32,
    unresolved: AtomicU32,
}

impl ParallelCounter {
    fn new() -> Self {
        Self {
            hits: AtomicU32::new(0),
            rejected: AtomicU32::new(0),
            malformed: AtomicU32::new(0),
            unresolved: AtomicU32::new(0),
        }
    }

    fn inc_hits(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_skipped(&self, reason: &HybridError) {
        if reason.is_malformed() {
            self.malformed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.unresolved.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn stats(&self, tool: Tool, normalized: usize) -> RunStats {
        RunStats {
            tool: tool.to_string(),
            hits: self.hits.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            unresolved: self.unresolved.load(Ordering::Relaxed),
            normalized: normalized as u32,
            ..Default::default()
        }
    }
}

/// Normalized records of one tool plus everything that was skipped.
pub struct Batch {
    pub tool: Tool,
    pub records: Vec<Interaction>,
    /// skipped-hit report lines keyed by hit ordinal
    pub skipped: DashMap<usize, String>,
    pub stats: RunStats,
}

impl Batch {
    /// Sorts and deduplicates the records, then writes the result table,
    /// the skipped-hit report and the run statistics into `outdir`.
    pub fn finish(mut self, outdir: &Path, fname: &str, with_p_value: bool) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(outdir)?;

        sort_records(&mut self.records);
        let (records, duplicates) = drop_duplicates(self.records);
        info!("{} duplicated sites removed: {}", self.tool, duplicates);

        let table = outdir.join(fname);
        self.stats.duplicates = duplicates as u32;
        self.stats.written = write_table(&table, &records, with_p_value)? as u32;

        let prefix = self.tool.prefix();
        write_objs(&self.skipped, &outdir.join(format!("{}.{}", prefix, SKIPPED)))?;
        write_json(&self.stats, &outdir.join(format!("{}.{}", prefix, STATS)))?;

        Ok(table)
    }
}

/// Reads every captured output with `adapter` and normalizes the hits in
/// parallel. Failing hits are logged and collected, never fatal.
pub fn normalize_all<A: ToolAdapter>(
    adapter: &A,
    raws: &[String],
    queries: &SequenceTable,
    targets: &SequenceTable,
) -> Batch {
    let tool = adapter.tool();
    let hits = raws
        .par_iter()
        .flat_map_iter(|raw| adapter.read_hits(raw))
        .collect::<Vec<Result<RawHit, Skipped>>>();

    let counter = ParallelCounter::new();
    let skipped = DashMap::new();
    let report = |idx: usize, skip: Skipped| {
        warn!("Skipping {} hit {}", tool, skip);
        counter.inc_skipped(&skip.reason);
        skipped.insert(idx, skip.to_string());
    };

    let pb = get_progress_bar(hits.len() as u64, "Normalizing hits");
    let records = hits
        .into_par_iter()
        .enumerate()
        .filter_map(|(idx, hit)| {
            pb.inc(1);
            counter.inc_hits();

            let hit = match hit {
                Ok(hit) => hit,
                Err(skip) => {
                    report(idx, skip);
                    return None;
                }
            };

            if !adapter.accept(&hit) {
                counter.inc_rejected();
                return None;
            }

            normalize(&hit, tool, queries, targets)
                .map_err(|reason| report(idx, Skipped::new(hit.locus(), reason)))
                .ok()
        })
        .collect::<Vec<Interaction>>();
    pb.finish_and_clear();

    let stats = counter.stats(tool, records.len());
    info!(
        "{} hits: {}, normalized: {}, rejected: {}, skipped: {}",
        tool,
        stats.hits,
        stats.normalized,
        stats.rejected,
        skipped.len()
    );

    Batch {
        tool,
        records,
        skipped,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::SequenceKind;

    struct LineAdapter;

    // "query target energy subseq structure" per line
    impl ToolAdapter for LineAdapter {
        fn tool(&self) -> Tool {
            Tool::IntaRNA
        }

        fn read_hits(&self, raw: &str) -> Vec<Result<RawHit, Skipped>> {
            raw.lines()
                .map(|line| {
                    let fields = line.split_whitespace().collect::<Vec<&str>>();
                    if fields.len() != 5 {
                        return Err(Skipped::new(line, HybridError::malformed("field count")));
                    }
                    Ok(RawHit {
                        query_id: fields[0].to_string(),
                        target_id: fields[1].to_string(),
                        free_energy: fields[2].parse().unwrap(),
                        subsequence: Duplex::parse(fields[3]).unwrap(),
                        structure: Duplex::parse(fields[4]).unwrap(),
                        ..Default::default()
                    })
                })
                .collect()
        }

        fn accept(&self, hit: &RawHit) -> bool {
            hit.free_energy < 0.0
        }
    }

    fn tables() -> (SequenceTable, SequenceTable) {
        let queries =
            SequenceTable::from_fasta(">q1\nGUAUCCGA\n", SequenceKind::Query).unwrap();
        let targets =
            SequenceTable::from_fasta(">t1\nATGCGGATACCGT\n", SequenceKind::Target).unwrap();
        (queries, targets)
    }

    #[test]
    fn test_normalize_resolves_and_renders() {
        let (queries, targets) = tables();
        let hit = RawHit {
            query_id: "q1".to_string(),
            target_id: "t1".to_string(),
            free_energy: -12.5,
            subsequence: Duplex::parse("CGGATA&TATCCG").unwrap(),
            structure: Duplex::parse("((((((&))))))").unwrap(),
            target_hint: Some(3),
            ..Default::default()
        };

        let record = normalize(&hit, Tool::RNAhybrid, &queries, &targets).unwrap();
        assert_eq!((record.start_target, record.end_target), (4, 9));
        assert_eq!((record.start_query, record.end_query), (2, 7));
        assert_eq!(record.subsequence, "CGGAUA&UAUCCG");
        assert_eq!(record.max_run_length, 6);
        assert_eq!(record.max_run_subsequence, "CGGAUA&UAUCCG");
        assert!(record.diagram.lines().nth(3).unwrap().starts_with("target  "));
    }

    #[test]
    fn test_normalize_checks_reported_spans() {
        let (queries, targets) = tables();
        let mut hit = RawHit {
            query_id: "q1".to_string(),
            target_id: "t1".to_string(),
            subsequence: Duplex::parse("CGGAUA&UAUCCG").unwrap(),
            structure: Duplex::parse("((((((&))))))").unwrap(),
            target_span: Some((4, 9)),
            query_span: Some((2, 7)),
            ..Default::default()
        };
        assert!(normalize(&hit, Tool::IntaRNA, &queries, &targets).is_ok());

        hit.target_span = Some((5, 10));
        assert!(matches!(
            normalize(&hit, Tool::IntaRNA, &queries, &targets),
            Err(HybridError::DiagramConsistency(_))
        ));
    }

    #[test]
    fn test_normalize_all_skips_and_counts() {
        let (queries, targets) = tables();
        let raws = vec![
            [
                "q1 t1 -10.0 CGGAUA&UAUCCG ((((((&))))))",
                "q1 t1 3.0 CGGAUA&UAUCCG ((((((&))))))",
                "q1 t9 -10.0 CGGAUA&UAUCCG ((((((&))))))",
            ]
            .join("\n"),
            [
                "q1 t1 -9.0 CGGAUA&UAUCAG ((((((&))))))",
                "broken line",
            ]
            .join("\n"),
        ];

        let batch = normalize_all(&LineAdapter, &raws, &queries, &targets);
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.records[0].tool, Tool::IntaRNA);
        assert_eq!(batch.skipped.len(), 3);
        assert_eq!(
            batch.skipped.get(&2).unwrap().as_str(),
            "q1/t9: sequence t9 is missing from the sequence table"
        );
        assert_eq!(
            batch.stats,
            RunStats {
                tool: "IntaRNA".to_string(),
                hits: 5,
                rejected: 1,
                malformed: 2,
                unresolved: 1,
                normalized: 1,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_batch_finish_writes_outputs() {
        let (queries, targets) = tables();
        let raws = vec![[
            "q1 t1 -10.0 CGGAUA&UAUCCG ((((((&))))))",
            "q1 t1 -12.0 CGGAUA&UAUCCG ((((((&))))))",
            "q1 t9 -10.0 CGGAUA&UAUCCG ((((((&))))))",
        ]
        .join("\n")];

        let dir = tempfile::tempdir().unwrap();
        let batch = normalize_all(&LineAdapter, &raws, &queries, &targets);
        let table = batch
            .finish(dir.path(), config::INTARNA_RESULTS, true)
            .unwrap();

        let records = crate::table::read_table(&table).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].free_energy, -12.0);

        let stats = std::fs::read_to_string(dir.path().join("intarna.stats.json")).unwrap();
        assert!(stats.contains("\"duplicates\": 1"));
        assert!(stats.contains("\"written\": 1"));

        let skipped = std::fs::read_to_string(dir.path().join("intarna.skipped.txt")).unwrap();
        assert!(skipped.starts_with("q1/t9: "));
    }

    #[test]
    fn test_skipped_report_keeps_identical_failures() {
        let (queries, targets) = tables();
        let raws = vec![
            [
                "q1 t9 -10.0 CGGAUA&UAUCCG ((((((&))))))",
                "bad",
                "q1 t1 -10.0 CGGAUA&UAUCCG ((((((&))))))",
            ]
            .join("\n"),
            [
                "q1 t9 -10.0 CGGAUA&UAUCCG ((((((&))))))",
                "bad",
            ]
            .join("\n"),
        ];

        let dir = tempfile::tempdir().unwrap();
        let batch = normalize_all(&LineAdapter, &raws, &queries, &targets);
        assert_eq!(batch.stats.unresolved, 2);
        assert_eq!(batch.stats.malformed, 2);
        assert_eq!(
            batch.skipped.len() as u32,
            batch.stats.unresolved + batch.stats.malformed
        );

        batch
            .finish(dir.path(), config::INTARNA_RESULTS, false)
            .unwrap();
        let report = std::fs::read_to_string(dir.path().join("intarna.skipped.txt")).unwrap();
        let missing = "q1/t9: sequence t9 is missing from the sequence table";
        let malformed = "bad: malformed input: field count";
        assert_eq!(
            report.lines().collect::<Vec<&str>>(),
            vec![missing, malformed, missing, malformed]
        );
    }
}
