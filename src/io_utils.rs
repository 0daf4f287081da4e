//! CSV reader/writer construction, delimiter resolution, and atomic output.
//!
//! Delimiters default from the file extension (`.tsv` → tab, anything else →
//! comma) unless overridden on the command line. Output files are written to
//! a temporary file in the destination directory and renamed into place once
//! complete, so an interrupted run never leaves a truncated dataset behind.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use csv::QuoteStyle;
use tempfile::NamedTempFile;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| delimiter_for_extension(path).unwrap_or(DEFAULT_CSV_DELIMITER))
}

pub fn resolve_output_delimiter(path: &Path, provided: Option<u8>, fallback: u8) -> u8 {
    provided
        .or_else(|| delimiter_for_extension(path))
        .unwrap_or(fallback)
}

fn delimiter_for_extension(path: &Path) -> Option<u8> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => Some(DEFAULT_TSV_DELIMITER),
        Some(ext) if ext.eq_ignore_ascii_case("csv") => Some(DEFAULT_CSV_DELIMITER),
        _ => None,
    }
}

pub fn open_csv_reader<R: Read>(reader: R, delimiter: u8) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(false)
        .from_reader(reader)
}

pub fn open_csv_reader_from_path(path: &Path, delimiter: u8) -> Result<csv::Reader<BufReader<File>>> {
    let file = File::open(path).with_context(|| format!("Opening input file {path:?}"))?;
    Ok(open_csv_reader(BufReader::new(file), delimiter))
}

/// Writes a CSV file through `write`, replacing `path` only after every row
/// has been flushed successfully.
pub fn write_csv_atomically<F>(path: &Path, delimiter: u8, write: F) -> Result<()>
where
    F: FnOnce(&mut csv::Writer<BufWriter<&mut File>>) -> Result<()>,
{
    let directory = parent_dir(path);
    let mut temp = NamedTempFile::new_in(&directory)
        .with_context(|| format!("Creating temporary output in {directory:?}"))?;
    {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .quote_style(QuoteStyle::Necessary)
            .double_quote(true)
            .from_writer(BufWriter::new(temp.as_file_mut()));
        write(&mut writer)?;
        writer.flush().context("Flushing output writer")?;
    }
    temp.as_file()
        .sync_all()
        .context("Syncing temporary output")?;
    temp.persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("Moving output into place at {path:?}"))?;
    Ok(())
}

/// True when both paths name the same file on disk. `candidate` need not exist.
pub fn is_same_file(existing: &Path, candidate: &Path) -> bool {
    let Ok(existing) = existing.canonicalize() else {
        return false;
    };
    match candidate.canonicalize() {
        Ok(resolved) => resolved == existing,
        Err(_) => match (
            parent_dir(candidate).canonicalize(),
            candidate.file_name(),
        ) {
            (Ok(parent), Some(name)) => parent.join(name) == existing,
            _ => false,
        },
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
