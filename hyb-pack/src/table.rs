use anyhow::{Context, Result};
use log::info;

use std::path::Path;

use crate::record::{Interaction, Tool};

pub const COLUMNS: [&str; 14] = [
    "tRF_ID",
    "Transcript_ID",
    "MFE",
    "P_Val",
    "Demo",
    "Max_Hit_Len",
    "Start_tRF",
    "End_tRF",
    "Start_Target",
    "End_Target",
    "Tool",
    "HybridDP",
    "SubseqDP",
    "Max_Hit_DP",
];
const P_VAL_COLUMN: usize = 3;

fn header(with_p_value: bool) -> Vec<&'static str> {
    COLUMNS
        .iter()
        .enumerate()
        .filter(|(i, _)| with_p_value || *i != P_VAL_COLUMN)
        .map(|(_, c)| *c)
        .collect()
}

fn fields(record: &Interaction, with_p_value: bool) -> Vec<String> {
    let mut row = vec![
        record.query_id.clone(),
        record.target_id.clone(),
        record.free_energy.to_string(),
    ];
    if with_p_value {
        row.push(record.p_value.map(|p| p.to_string()).unwrap_or_default());
    }
    row.extend([
        record.diagram.clone(),
        record.max_run_length.to_string(),
        record.start_query.to_string(),
        record.end_query.to_string(),
        record.start_target.to_string(),
        record.end_target.to_string(),
        record.tool.to_string(),
        record.structure.clone(),
        record.subsequence.clone(),
        record.max_run_subsequence.clone(),
    ]);

    row
}

/// Writes interaction records in table column order; `P_Val` only on request.
pub fn write_table<'a, P, I>(path: P, records: I, with_p_value: bool) -> Result<usize>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = &'a Interaction>,
{
    let path = path.as_ref();
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("cannot create {}", path.display()))?;

    wtr.write_record(header(with_p_value))?;
    let mut count = 0;
    for record in records {
        wtr.write_record(fields(record, with_p_value))?;
        count += 1;
    }
    wtr.flush()?;

    info!("Records written to {}: {}", path.display(), count);
    Ok(count)
}

/// Reads a table written by [`write_table`], with or without `P_Val`.
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<Vec<Interaction>> {
    let path = path.as_ref();
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("cannot open {}", path.display()))?;

    let records = rdr
        .deserialize::<Interaction>()
        .enumerate()
        .map(|(i, row)| row.with_context(|| format!("{}: bad row {}", path.display(), i + 2)))
        .collect::<Result<Vec<Interaction>>>()?;

    info!("Records read from {}: {}", path.display(), records.len());
    Ok(records)
}

/// Per-query agreement between two tools.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsensusSummary {
    pub query_id: String,
    pub first: usize,
    pub second: usize,
    /// records in consensus, two per matched pair
    pub consensus: usize,
}

impl ConsensusSummary {
    fn fraction(consensus: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            consensus as f64 / 2.0 / total as f64
        }
    }

    pub fn first_fraction(&self) -> f64 {
        Self::fraction(self.consensus, self.first)
    }

    pub fn second_fraction(&self) -> f64 {
        Self::fraction(self.consensus, self.second)
    }
}

pub fn write_summary<P: AsRef<Path>>(
    path: P,
    tools: (Tool, Tool),
    rows: &[ConsensusSummary],
) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("cannot create {}", path.display()))?;

    wtr.write_record([
        "tRF_ID".to_string(),
        format!("#{}", tools.0),
        format!("#{}", tools.1),
        "#Consensus".to_string(),
        format!("Pr_{}", tools.0),
        format!("Pr_{}", tools.1),
    ])?;
    for row in rows {
        wtr.write_record([
            row.query_id.clone(),
            row.first.to_string(),
            row.second.to_string(),
            row.consensus.to_string(),
            row.first_fraction().to_string(),
            row.second_fraction().to_string(),
        ])?;
    }
    wtr.flush()?;

    info!("Summary rows written to {}: {}", path.display(), rows.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::site;

    fn sample() -> Interaction {
        let mut record = site("tRF-5", "ENST0001", 4, 9, -25.3);
        record.diagram = "line one\nline \"two\", quoted".to_string();
        record.max_run_length = 6;
        record.start_query = 2;
        record.end_query = 7;
        record.structure = "((((((&))))))".to_string();
        record.subsequence = "CGGAUA&UAUCCG".to_string();
        record.max_run_subsequence = "CGGAUA&UAUCCG".to_string();
        record
    }

    #[test]
    fn test_table_without_p_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(config::RNAHYBRID_RESULTS);
        let mut record = sample();
        record.p_value = Some(0.01);

        write_table(&path, [&record], false).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("tRF_ID,Transcript_ID,MFE,Demo,Max_Hit_Len,"));

        let back = read_table(&path).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].p_value, None);
        assert_eq!(back[0].diagram, record.diagram);
        assert_eq!(back[0].free_energy, -25.3);
    }

    #[test]
    fn test_table_with_p_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(config::CONSENSUS_RESULTS);
        let mut with_p = sample();
        with_p.p_value = Some(0.5);
        let mut without_p = sample();
        without_p.tool = Tool::IntaRNA;

        write_table(&path, [&with_p, &without_p], true).unwrap();
        let back = read_table(&path).unwrap();

        assert_eq!(back, vec![with_p, without_p]);
    }

    #[test]
    fn test_summary_fractions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(config::CONSENSUS_STATS);
        let rows = vec![
            ConsensusSummary {
                query_id: "tRF-1".to_string(),
                first: 4,
                second: 2,
                consensus: 2,
            },
            ConsensusSummary {
                query_id: "tRF-2".to_string(),
                first: 0,
                second: 3,
                consensus: 0,
            },
        ];

        write_summary(&path, (Tool::RNAhybrid, Tool::IntaRNA), &rows).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "tRF_ID,#RNAhybrid,#IntaRNA,#Consensus,Pr_RNAhybrid,Pr_IntaRNA\ntRF-1,4,2,2,0.25,0.5\ntRF-2,0,3,0,0,0\n"
        );
    }
}
