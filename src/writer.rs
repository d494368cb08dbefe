//! Renders a merged dataset back to telemetry CSV.

use std::{collections::HashMap, path::Path};

use anyhow::{Context, Result, anyhow};
use rust_decimal::Decimal;

use crate::{
    data::{Cell, DataSet, format_cell},
    io_utils,
};

/// Writes the dataset with the fixed exchange format (comma, CRLF, no
/// quoting). Decimal cells of a column with a supplied factor are scaled at
/// write time; everything else is rendered unscaled.
pub fn write_dataset(
    dataset: &DataSet,
    path: &Path,
    factors: &HashMap<String, Decimal>,
) -> Result<()> {
    let mut writer = io_utils::open_csv_writer(path)?;
    writer
        .write_record(dataset.columns.iter().map(|column| column.name.as_str()))
        .context("Writing header row")?;

    for (row_idx, row) in dataset.rows.iter().enumerate() {
        let mut record = Vec::with_capacity(dataset.columns.len());
        for column in &dataset.columns {
            let cell = row.get(&column.name).ok_or_else(|| {
                anyhow!("Row {} is missing column '{}'", row_idx + 1, column.name)
            })?;
            record.push(render_cell(cell, factors.get(&column.name)));
        }
        writer
            .write_record(&record)
            .with_context(|| format!("Writing row {}", row_idx + 1))?;
    }

    writer.flush().context("Flushing output")?;
    Ok(())
}

fn render_cell(cell: &Cell, factor: Option<&Decimal>) -> String {
    match (cell, factor) {
        (Cell::Decimal(value), Some(factor)) => (value * factor).to_string(),
        _ => format_cell(cell),
    }
}
