//! File location and CSV reader/writer construction.
//!
//! All file I/O flows through this module:
//!
//! - **Input expansion**: positional arguments may be files or directories;
//!   directories expand to their immediate `.csv` files (case-insensitive
//!   extension match) sorted by filename ascending.
//! - **Reader/writer construction**: the exchange format is fixed —
//!   comma-separated, UTF-8, CRLF line terminator, no quoting and no escape
//!   character on output.

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use csv::{QuoteStyle, Terminator};

pub const DATA_FILE_EXTENSION: &str = "csv";

/// Expands the positional arguments into the ordered list of input files.
/// A path that does not exist aborts before any parsing.
pub fn collect_input_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if !path.exists() {
            return Err(anyhow!("File {path:?} does not exist"));
        }
        if path.is_dir() {
            files.extend(list_data_files(path)?);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn list_data_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Listing directory {dir:?}"))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Listing directory {dir:?}"))?
            .path();
        if path.is_file() && has_data_extension(&path) {
            files.push(path);
        }
    }
    files.sort_by_key(|path| path.file_name().map(|name| name.to_os_string()));
    Ok(files)
}

fn has_data_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DATA_FILE_EXTENSION))
}

/// Flexible readers defer the cell-count check to the parser, which reports
/// the offending file, row, and expected width itself.
pub fn open_csv_reader(path: &Path) -> Result<csv::Reader<BufReader<File>>> {
    let file = File::open(path).with_context(|| format!("Opening input file {path:?}"))?;
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(true).delimiter(b',').flexible(true);
    Ok(builder.from_reader(BufReader::new(file)))
}

pub fn open_csv_writer(path: &Path) -> Result<csv::Writer<BufWriter<File>>> {
    let file = File::create(path).with_context(|| format!("Creating output file {path:?}"))?;
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(b',')
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::CRLF);
    Ok(builder.from_writer(BufWriter::new(file)))
}
