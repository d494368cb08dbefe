//! Parses one telemetry CSV export into a typed [`DataSet`].

use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::{
    data::{DataSet, Row, parse_cell},
    io_utils,
    schema::{self, Column},
};

/// Reads the header row, classifies every column from its name, then parses
/// each data row into typed cells. Any row-shape or cell-parse failure
/// aborts the file's parse; errors name the file, the 1-based file line,
/// and the column.
pub fn parse_file(path: &Path) -> Result<DataSet> {
    let mut reader = io_utils::open_csv_reader(path)?;
    let headers = reader
        .headers()
        .with_context(|| format!("Reading header row in {path:?}"))?
        .clone();
    let columns: Vec<Column> = headers.iter().map(schema::classify).collect();
    schema::validate_columns(&columns)
        .with_context(|| format!("Classifying header row in {path:?}"))?;

    let mut rows = Vec::new();
    for (row_idx, record) in reader.records().enumerate() {
        let record =
            record.with_context(|| format!("Reading row {} in {path:?}", row_idx + 2))?;
        let row = parse_row(&record, &columns)
            .with_context(|| format!("Row {} in {path:?}", row_idx + 2))?;
        rows.push(row);
    }

    Ok(DataSet { columns, rows })
}

fn parse_row(record: &csv::StringRecord, columns: &[Column]) -> Result<Row> {
    if record.len() != columns.len() {
        bail!(
            "Invalid number of columns: expected {}, found {}",
            columns.len(),
            record.len()
        );
    }

    let mut row = Row::with_capacity(columns.len());
    for (column, value) in columns.iter().zip(record.iter()) {
        let cell = parse_cell(value, column.kind)
            .with_context(|| format!("Column '{}'", column.name))?;
        row.insert(column.name.clone(), cell);
    }
    Ok(row)
}
