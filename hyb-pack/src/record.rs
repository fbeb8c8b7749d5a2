use serde::{Deserialize, Serialize};

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::HybridError;

pub const DUPLEX_SEPARATOR: char = '&';
pub const TIE_SEPARATOR: char = '|';

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tool {
    #[serde(rename = "RNAhybrid")]
    RNAhybrid,
    #[serde(rename = "IntaRNA")]
    IntaRNA,
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Tool::RNAhybrid => "RNAhybrid",
            Tool::IntaRNA => "IntaRNA",
        }
    }

    /// lower-case prefix used for per-tool side files
    pub fn prefix(&self) -> &'static str {
        match self {
            Tool::RNAhybrid => "rnahybrid",
            Tool::IntaRNA => "intarna",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Tool {
    type Err = HybridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "RNAhybrid" => Ok(Tool::RNAhybrid),
            "IntaRNA" => Ok(Tool::IntaRNA),
            other => Err(HybridError::malformed(format!("unknown tool {:?}", other))),
        }
    }
}

/// A target/query pair of equally meaningful strings written as `T&Q`.
///
/// Used for both the dot-bracket structure and the aligned sub-sequences;
/// both halves read 5'->3'.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Duplex {
    pub target: String,
    pub query: String,
}

impl Duplex {
    pub fn new<T: Into<String>, Q: Into<String>>(target: T, query: Q) -> Self {
        Self {
            target: target.into(),
            query: query.into(),
        }
    }

    pub fn parse(line: &str) -> Result<Self, HybridError> {
        let (target, query) = line.trim().split_once(DUPLEX_SEPARATOR).ok_or_else(|| {
            HybridError::malformed(format!("{:?} is not a '&'-joined pair", line))
        })?;

        if query.contains(DUPLEX_SEPARATOR) {
            return Err(HybridError::malformed(format!(
                "{:?} has more than one '&'",
                line
            )));
        }

        Ok(Self::new(target, query))
    }
}

impl fmt::Display for Duplex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.target, DUPLEX_SEPARATOR, self.query)
    }
}

/// One normalized tRF-transcript interaction.
///
/// Column names follow the published result tables; `P_Val` is optional so
/// tables written with or without it read back the same way.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Interaction {
    #[serde(rename = "tRF_ID")]
    pub query_id: String,
    #[serde(rename = "Transcript_ID")]
    pub target_id: String,
    #[serde(rename = "MFE")]
    pub free_energy: f64,
    #[serde(rename = "P_Val", default)]
    pub p_value: Option<f64>,
    #[serde(rename = "Demo")]
    pub diagram: String,
    #[serde(rename = "Max_Hit_Len")]
    pub max_run_length: usize,
    #[serde(rename = "Start_tRF")]
    pub start_query: usize,
    #[serde(rename = "End_tRF")]
    pub end_query: usize,
    #[serde(rename = "Start_Target")]
    pub start_target: usize,
    #[serde(rename = "End_Target")]
    pub end_target: usize,
    #[serde(rename = "Tool")]
    pub tool: Tool,
    #[serde(rename = "HybridDP")]
    pub structure: String,
    #[serde(rename = "SubseqDP")]
    pub subsequence: String,
    #[serde(rename = "Max_Hit_DP", default)]
    pub max_run_subsequence: String,
}

impl Interaction {
    pub fn locus(&self) -> String {
        format!(
            "{}/{}:{}-{}",
            self.query_id, self.target_id, self.start_target, self.end_target
        )
    }
}

/// Anything located on a target transcript for a given query.
pub trait BindingSite {
    fn query_id(&self) -> &str;
    fn target_id(&self) -> &str;
    fn target_span(&self) -> (usize, usize);

    fn same_pair<S: BindingSite + ?Sized>(&self, other: &S) -> bool {
        self.query_id() == other.query_id() && self.target_id() == other.target_id()
    }
}

impl BindingSite for Interaction {
    fn query_id(&self) -> &str {
        &self.query_id
    }

    fn target_id(&self) -> &str {
        &self.target_id
    }

    fn target_span(&self) -> (usize, usize) {
        (self.start_target, self.end_target)
    }
}

impl<T: BindingSite> BindingSite for &T {
    fn query_id(&self) -> &str {
        (*self).query_id()
    }

    fn target_id(&self) -> &str {
        (*self).target_id()
    }

    fn target_span(&self) -> (usize, usize) {
        (*self).target_span()
    }
}

/// query, target, energy ascending, longest run first
pub fn record_order(a: &Interaction, b: &Interaction) -> Ordering {
    a.query_id
        .cmp(&b.query_id)
        .then_with(|| a.target_id.cmp(&b.target_id))
        .then_with(|| a.free_energy.total_cmp(&b.free_energy))
        .then_with(|| b.max_run_length.cmp(&a.max_run_length))
}

pub fn sort_records(records: &mut [Interaction]) {
    records.sort_by(record_order);
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn site(query: &str, target: &str, start: usize, end: usize, mfe: f64) -> Interaction {
        Interaction {
            query_id: query.to_string(),
            target_id: target.to_string(),
            free_energy: mfe,
            p_value: None,
            diagram: String::new(),
            max_run_length: 0,
            start_query: 1,
            end_query: 1,
            start_target: start,
            end_target: end,
            tool: Tool::RNAhybrid,
            structure: String::new(),
            subsequence: String::new(),
            max_run_subsequence: String::new(),
        }
    }

    #[test]
    fn test_duplex_parse() {
        let duplex = Duplex::parse("((..&))").unwrap();
        assert_eq!(duplex.target, "((..");
        assert_eq!(duplex.query, "))");
        assert_eq!(duplex.to_string(), "((..&))");
    }

    #[test]
    fn test_duplex_parse_rejects() {
        assert!(Duplex::parse("(((").unwrap_err().is_malformed());
        assert!(Duplex::parse("((&))&").is_err());
    }

    #[test]
    fn test_tool_roundtrip() {
        assert_eq!("IntaRNA".parse::<Tool>().unwrap(), Tool::IntaRNA);
        assert_eq!(Tool::RNAhybrid.to_string(), "RNAhybrid");
        assert!("miranda".parse::<Tool>().is_err());
    }

    #[test]
    fn test_sort_records() {
        let mut records = vec![
            site("q2", "t1", 1, 10, -20.0),
            site("q1", "t2", 1, 10, -30.0),
            site("q1", "t1", 1, 10, -10.0),
            site("q1", "t1", 5, 15, -25.0),
        ];
        let mut longer = site("q1", "t1", 40, 60, -10.0);
        longer.max_run_length = 9;
        records.push(longer);

        sort_records(&mut records);
        let keys = records
            .iter()
            .map(|r| (r.query_id.as_str(), r.target_id.as_str(), r.start_target))
            .collect::<Vec<_>>();

        assert_eq!(
            keys,
            vec![
                ("q1", "t1", 5),
                ("q1", "t1", 40),
                ("q1", "t1", 1),
                ("q1", "t2", 1),
                ("q2", "t1", 1)
            ]
        );
    }
}
