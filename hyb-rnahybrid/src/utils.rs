use hybpack::{
    longest_run, parse_diagram, DiagramLayout, HybridError, RawHit, Skipped, Tool, ToolAdapter,
};

const BLOCK_SEPARATOR: &str = "\n\n\n";
const PART_SEPARATOR: &str = "\n\n";
const MIN_HEADER_LINES: usize = 4;

/// Reads RNAhybrid's default (non-compact) output.
///
/// One block per hit: a header naming target and query, an energy part, and
/// a `position` line followed by the four-row diagram.
#[derive(Debug, Clone, Default)]
pub struct RnaHybridAdapter {
    pub min_run: usize,
    pub max_mfe: Option<f64>,
}

impl RnaHybridAdapter {
    pub fn new(min_run: usize, max_mfe: Option<f64>) -> Self {
        Self { min_run, max_mfe }
    }
}

impl ToolAdapter for RnaHybridAdapter {
    fn tool(&self) -> Tool {
        Tool::RNAhybrid
    }

    fn read_hits(&self, raw: &str) -> Vec<Result<RawHit, Skipped>> {
        split_blocks(raw)
            .enumerate()
            .map(|(i, block)| parse_block(block, i + 1))
            .collect()
    }

    fn accept(&self, hit: &RawHit) -> bool {
        let long_enough = hit.reported_run.map_or(true, |run| run >= self.min_run);
        let stable_enough = self.max_mfe.map_or(true, |max| hit.free_energy <= max);

        long_enough && stable_enough
    }
}

pub fn split_blocks(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(BLOCK_SEPARATOR)
        .map(|block| block.trim_matches('\n'))
        .filter(|block| !block.trim().is_empty())
}

/// value after the first `:` of a `label: value` line
fn labelled<'a>(line: &'a str, label: &str) -> Result<&'a str, HybridError> {
    let (key, value) = line
        .split_once(':')
        .ok_or_else(|| HybridError::malformed(format!("expected '{}: ...', got {:?}", label, line)))?;

    if key.trim() != label {
        return Err(HybridError::malformed(format!(
            "expected label {:?}, got {:?}",
            label,
            key.trim()
        )));
    }

    Ok(value.trim())
}

fn number<T: std::str::FromStr>(value: Option<&str>, what: &str) -> Result<T, HybridError> {
    value
        .and_then(|v| v.parse::<T>().ok())
        .ok_or_else(|| HybridError::malformed(format!("cannot read {} from {:?}", what, value)))
}

/// (target id, query id) from the header part; free-text notes may precede
/// the four label lines, so they are read from the end.
fn read_header(part: &str) -> Result<(String, String), HybridError> {
    let lines = part.lines().collect::<Vec<&str>>();
    if lines.len() < MIN_HEADER_LINES {
        return Err(HybridError::malformed(format!(
            "header has {} lines, expected at least {}",
            lines.len(),
            MIN_HEADER_LINES
        )));
    }

    let n = lines.len();
    let target = labelled(lines[n - 4], "target")?;
    let query = labelled(lines[n - 2], "miRNA")?;

    if target.is_empty() || query.is_empty() {
        return Err(HybridError::malformed("empty sequence identifier"));
    }

    Ok((target.to_string(), query.to_string()))
}

/// (mfe, p-value) from the energy part
fn read_energy(part: &str) -> Result<(f64, Option<f64>), HybridError> {
    let mut mfe = None;
    let mut p_value = None;

    for line in part.lines() {
        if let Ok(value) = labelled(line, "mfe") {
            mfe = Some(number::<f64>(value.split_whitespace().next(), "mfe")?);
        } else if let Ok(value) = labelled(line, "p-value") {
            p_value = Some(number::<f64>(value.split_whitespace().next(), "p-value")?);
        }
    }

    match mfe {
        Some(mfe) => Ok((mfe, p_value)),
        None => Err(HybridError::malformed("block without an mfe line")),
    }
}

/// Parses one block; `index` is only used to locate unreadable blocks.
pub fn parse_block(block: &str, index: usize) -> Result<RawHit, Skipped> {
    let parts = block.split(PART_SEPARATOR).collect::<Vec<&str>>();
    let anonymous = |reason| Skipped::new(format!("block {}", index), reason);

    if parts.len() < 3 {
        return Err(anonymous(HybridError::malformed(format!(
            "block has {} parts, expected 3",
            parts.len()
        ))));
    }

    let (target_id, query_id) = read_header(parts[0]).map_err(anonymous)?;
    let in_place = |reason| Skipped::new(format!("{}/{}", query_id, target_id), reason);

    let (free_energy, p_value) = read_energy(parts[1]).map_err(in_place)?;

    let (position, diagram) = parts[2]
        .trim_start_matches('\n')
        .split_once('\n')
        .ok_or_else(|| in_place(HybridError::malformed("missing diagram after position line")))?;
    let position = number::<usize>(
        position
            .strip_prefix("position")
            .and_then(|p| p.split_whitespace().next()),
        "position",
    )
    .map_err(in_place)?;

    let (subsequence, structure) = parse_diagram(diagram).map_err(in_place)?;
    let reported_run = longest_run(diagram.trim_matches('\n'), DiagramLayout::Raw)
        .map_err(in_place)?
        .length;

    Ok(RawHit {
        query_id,
        target_id,
        free_energy,
        p_value,
        subsequence,
        structure,
        target_hint: Some(position),
        target_span: None,
        query_span: None,
        reported_run: Some(reported_run),
    })
}
