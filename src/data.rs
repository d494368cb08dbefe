use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::schema::{Column, ColumnKind};

/// Accepts an optional fractional-seconds suffix of up to 6 digits.
pub const TIMESTAMP_READ_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
/// Output always carries the 6-digit fraction.
pub const TIMESTAMP_WRITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Decimal(Decimal),
    Timestamp(NaiveDateTime),
}

impl Cell {
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Cell::Decimal(value) => Some(*value),
            Cell::Timestamp(_) => None,
        }
    }
}

/// One sample, keyed by column name. Display order lives in the dataset's
/// column sequence, not here.
pub type Row = HashMap<String, Cell>;

/// A parsed recording. Built once by the reader (or the merger) and only
/// read afterwards; row order is the chronological order within the file
/// and is preserved verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

pub fn parse_cell(value: &str, kind: ColumnKind) -> Result<Cell> {
    match kind {
        ColumnKind::Numeric | ColumnKind::GlobalTime => {
            let parsed: Decimal = value
                .parse()
                .with_context(|| format!("Failed to parse '{value}' as decimal"))?;
            Ok(Cell::Decimal(parsed))
        }
        ColumnKind::DateTime => {
            let parsed = NaiveDateTime::parse_from_str(value, TIMESTAMP_READ_FORMAT)
                .with_context(|| format!("Failed to parse '{value}' as timestamp"))?;
            Ok(Cell::Timestamp(parsed))
        }
    }
}

pub fn format_cell(cell: &Cell) -> String {
    match cell {
        Cell::Decimal(value) => value.to_string(),
        Cell::Timestamp(value) => value.format(TIMESTAMP_WRITE_FORMAT).to_string(),
    }
}
