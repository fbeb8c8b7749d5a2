use dashmap::DashMap;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use thiserror::Error;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::SEQUENCE_EXTENSIONS;

// os
#[cfg(not(windows))]
const TICK_SETTINGS: (&str, u64) = ("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ", 80);
#[cfg(windows)]
const TICK_SETTINGS: (&str, u64) = (r"+-x| ", 200);

/// return a pre-configured progress bar
pub fn get_progress_bar(length: u64, msg: &str) -> ProgressBar {
    let progressbar_style = ProgressStyle::default_spinner()
        .tick_chars(TICK_SETTINGS.0)
        .template(" {spinner} {msg:<30} {wide_bar} ETA {eta_precise} ")
        .expect("no template error");

    let progress_bar = ProgressBar::new(length);

    progress_bar.set_style(progressbar_style);
    progress_bar.enable_steady_tick(Duration::from_millis(TICK_SETTINGS.1));
    progress_bar.set_message(msg.to_owned());

    progress_bar
}

/// write a DashMap keyed by ordinal to a file, one entry per line in key order
pub fn write_objs<T>(data: &DashMap<usize, T>, fname: &Path) -> Result<(), CliError>
where
    T: AsRef<str> + Sync + Send,
{
    log::info!("Entries in {}: {:?}. Writing...", fname.display(), data.len());
    let mut lines = data
        .iter()
        .map(|entry| (*entry.key(), entry.value().as_ref().to_owned()))
        .collect::<Vec<(usize, String)>>();
    lines.sort_unstable_by_key(|(idx, _)| *idx);

    let mut writer = BufWriter::new(File::create(fname)?);
    for (_, line) in lines.iter() {
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;

    Ok(())
}

/// write any serializable summary as pretty JSON
pub fn write_json<T: Serialize>(data: &T, fname: &Path) -> Result<(), CliError> {
    let writer = BufWriter::new(File::create(fname)?);
    serde_json::to_writer_pretty(writer, data)
        .map_err(|e| CliError::InvalidInput(format!("cannot serialize {:?}: {}", fname, e)))?;

    Ok(())
}

/// argument checker for all tools
pub trait ArgCheck {
    fn check(&self) -> Result<(), CliError> {
        self.validate_args()
    }

    fn validate_args(&self) -> Result<(), CliError> {
        self.check_sequences()?;
        self.check_inputs()?;
        self.check_outdir()
    }

    fn check_sequences(&self) -> Result<(), CliError> {
        for seqs in self.get_sequences() {
            validate(seqs, &SEQUENCE_EXTENSIONS)?;
        }
        Ok(())
    }

    fn check_inputs(&self) -> Result<(), CliError> {
        if self.get_inputs().is_empty() {
            let err = "No tool output files provided".to_string();
            return Err(CliError::InvalidInput(err));
        }
        for input in self.get_inputs() {
            validate(input, self.input_extensions())?;
        }

        Ok(())
    }

    fn check_outdir(&self) -> Result<(), CliError> {
        let outdir = self.get_outdir();
        if outdir.exists() && !outdir.is_dir() {
            return Err(CliError::InvalidInput(format!(
                "{:?} exists and is not a directory",
                outdir
            )));
        }
        Ok(())
    }

    fn get_sequences(&self) -> Vec<&PathBuf>;
    fn get_inputs(&self) -> Vec<&PathBuf>;
    fn input_extensions(&self) -> &[&str];
    fn get_outdir(&self) -> &PathBuf;
}

/// error handling for CLI
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// argument validation; an empty extension list accepts any file name
pub fn validate(arg: &PathBuf, extensions: &[&str]) -> Result<(), CliError> {
    if !arg.exists() {
        return Err(CliError::InvalidInput(format!("{:?} does not exist", arg)));
    }

    if !arg.is_file() {
        return Err(CliError::InvalidInput(format!("{:?} is not a file", arg)));
    }

    let fname = arg
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or_default();
    if !extensions.is_empty() && !extensions.iter().any(|ext| fname.ends_with(ext)) {
        return Err(CliError::InvalidInput(format!(
            "file {:?} has none of the expected extensions {:?}",
            arg, extensions
        )));
    }

    match std::fs::metadata(arg) {
        Ok(metadata) if metadata.len() == 0 => {
            Err(CliError::InvalidInput(format!("file {:?} is empty", arg)))
        }
        Ok(_) => Ok(()),
        Err(e) => Err(CliError::IoError(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FASTA_EXTENSIONS, TABLE_EXTENSIONS};
    use std::io::Write;

    #[test]
    fn test_validate_accepts_gz_fasta() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trfs.fa.gz");
        let mut file = File::create(&path).unwrap();
        write!(file, "not really gzip").unwrap();

        assert!(validate(&path, &FASTA_EXTENSIONS).is_ok());
    }

    #[test]
    fn test_validate_rejects_wrong_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.tsv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "a\tb").unwrap();

        let err = validate(&path, &TABLE_EXTENSIONS).unwrap_err();
        assert!(err.to_string().contains("expected extensions"));
    }

    #[test]
    fn test_validate_rejects_empty_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.csv");
        File::create(&empty).unwrap();

        assert!(validate(&empty, &TABLE_EXTENSIONS).is_err());
        assert!(validate(&dir.path().join("missing.csv"), &[]).is_err());
        assert!(validate(&dir.path().to_path_buf(), &[]).is_err());
    }

    #[test]
    fn test_write_objs_in_key_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(crate::SKIPPED);
        let map = DashMap::new();
        map.insert(7, "b".to_string());
        map.insert(2, "b".to_string());
        map.insert(4, "a".to_string());

        write_objs(&map, &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "b\na\nb\n");
    }
}
