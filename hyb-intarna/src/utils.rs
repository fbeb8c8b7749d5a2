use hybpack::{Duplex, HybridError, RawHit, Skipped, Tool, ToolAdapter};
use serde::Deserialize;

const DELIMITER: u8 = b';';

/// One row of IntaRNA's `--outMode=C` table; other columns are ignored.
#[derive(Debug, Deserialize)]
pub struct IntaRnaRow {
    pub id1: String,
    pub id2: String,
    #[serde(rename = "E")]
    pub energy: f64,
    pub start1: usize,
    pub end1: usize,
    pub start2: usize,
    pub end2: usize,
    #[serde(rename = "subseqDP")]
    pub subseq_dp: String,
    #[serde(rename = "hybridDP")]
    pub hybrid_dp: String,
}

impl TryFrom<IntaRnaRow> for RawHit {
    type Error = HybridError;

    fn try_from(row: IntaRnaRow) -> Result<Self, Self::Error> {
        let subsequence = Duplex::parse(&row.subseq_dp)?;
        let structure = Duplex::parse(&row.hybrid_dp)?;

        Ok(RawHit {
            query_id: row.id2.trim().to_string(),
            target_id: row.id1.trim().to_string(),
            free_energy: row.energy,
            p_value: None,
            subsequence,
            structure,
            target_hint: None,
            target_span: Some((row.start1, row.end1)),
            query_span: Some((row.start2, row.end2)),
            reported_run: None,
        })
    }
}

/// IntaRNA already prints exact spans, so every hit is accepted as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntaRnaAdapter;

impl ToolAdapter for IntaRnaAdapter {
    fn tool(&self) -> Tool {
        Tool::IntaRNA
    }

    fn read_hits(&self, raw: &str) -> Vec<Result<RawHit, Skipped>> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(DELIMITER)
            .trim(csv::Trim::All)
            .from_reader(raw.as_bytes());

        rdr.deserialize::<IntaRnaRow>()
            .enumerate()
            .map(|(i, row)| {
                // INFO: header is line 1
                let locus = format!("row {}", i + 2);
                let row = row.map_err(|e| Skipped::new(&locus, HybridError::malformed(e.to_string())))?;
                let pair = format!("{}/{}", row.id2.trim(), row.id1.trim());

                RawHit::try_from(row).map_err(|reason| Skipped::new(pair, reason))
            })
            .collect()
    }
}
