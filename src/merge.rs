//! Order-sensitive merge of parsed telemetry recordings.
//!
//! The recording device resets its cumulative counters whenever a new file
//! starts, so concatenating files verbatim would make odometers and elapsed
//! timers appear to jump back to zero at every boundary. The merge keeps
//! those counters continuous and recomputes running extrema over the whole
//! corpus:
//!
//! - **Incremental** columns are rebased at each file boundary onto a
//!   baseline captured from the tail of the merged-so-far sequence: the last
//!   observed value plus the last observed per-sample step. The step is
//!   added once per column (not re-accumulated per row) to bridge the gap
//!   between the last sample of one file and the first sample of the next.
//! - **Min/Max** columns are overwritten on every row with the single
//!   global extreme observed across all input rows.
//! - **None** columns pass through untouched.
//!
//! Merging is an ordered fold: each dataset's transform depends on the fully
//! transformed result of all prior datasets, so the sequence is processed
//! strictly in input order. Repeated invocation on the same ordered input is
//! deterministic; reordering the input changes the result.

use std::collections::HashMap;

use anyhow::{Result, anyhow, bail};
use rust_decimal::Decimal;

use crate::{
    data::{Cell, DataSet, Row},
    schema::{self, Aggregation, Column, ColumnKind},
};

/// Global extrema per Min/Max column, computed once over all input rows
/// before any row transform.
struct Extrema {
    min_values: HashMap<String, Decimal>,
    max_values: HashMap<String, Decimal>,
}

impl Extrema {
    fn min(&self, name: &str) -> Result<Cell> {
        self.min_values
            .get(name)
            .copied()
            .map(Cell::Decimal)
            .ok_or_else(|| anyhow!("No global minimum recorded for column '{name}'"))
    }

    fn max(&self, name: &str) -> Result<Cell> {
        self.max_values
            .get(name)
            .copied()
            .map(Cell::Decimal)
            .ok_or_else(|| anyhow!("No global maximum recorded for column '{name}'"))
    }
}

/// Continuation state captured once per file boundary from the last two
/// rows of the merged-so-far sequence. Holds every decimal-valued column;
/// timestamp columns carry no baseline.
struct Baseline {
    last_values: HashMap<String, Decimal>,
    last_steps: HashMap<String, Decimal>,
}

impl Baseline {
    fn from_tail(merged: &[Row]) -> Result<Self> {
        if merged.len() < 2 {
            bail!(
                "Cannot continue into the next file: the merged sequence holds {} row(s) \
                 but the continuation baseline needs at least two",
                merged.len()
            );
        }
        let last = &merged[merged.len() - 1];
        let previous = &merged[merged.len() - 2];

        let mut last_values = HashMap::new();
        let mut last_steps = HashMap::new();
        for (name, cell) in last {
            let Some(value) = cell.as_decimal() else {
                continue;
            };
            last_values.insert(name.clone(), value);
            if let Some(prior) = previous.get(name).and_then(|cell| cell.as_decimal()) {
                last_steps.insert(name.clone(), value - prior);
            }
        }
        Ok(Self {
            last_values,
            last_steps,
        })
    }

    fn continue_value(&self, name: &str, raw: Decimal) -> Result<Decimal> {
        let last = self
            .last_values
            .get(name)
            .ok_or_else(|| anyhow!("No continuation value recorded for column '{name}'"))?;
        let step = self
            .last_steps
            .get(name)
            .ok_or_else(|| anyhow!("No continuation step recorded for column '{name}'"))?;
        Ok(last + step + raw)
    }
}

/// Merges recordings ordered earliest-first into one continuous dataset.
pub fn merge(datasets: &[DataSet]) -> Result<DataSet> {
    let first = datasets
        .first()
        .ok_or_else(|| anyhow!("At least one dataset is required"))?;
    let columns = merged_columns(datasets)?;
    schema::validate_columns(&columns)?;
    let extrema = compute_extrema(datasets, &columns)?;

    let total_rows = datasets.iter().map(|dataset| dataset.rows.len()).sum();
    let mut merged: Vec<Row> = Vec::with_capacity(total_rows);

    for row in &first.rows {
        merged.push(transform_first(row, &columns, &extrema)?);
    }

    for dataset in &datasets[1..] {
        let baseline = Baseline::from_tail(&merged)?;
        for row in &dataset.rows {
            merged.push(transform_continued(row, &columns, &extrema, &baseline)?);
        }
    }

    Ok(DataSet {
        columns,
        rows: merged,
    })
}

/// The first dataset's columns become the merged schema; every other
/// dataset must carry the same column count and name set.
fn merged_columns(datasets: &[DataSet]) -> Result<Vec<Column>> {
    let mut iter = datasets.iter();
    let baseline = iter
        .next()
        .ok_or_else(|| anyhow!("At least one dataset is required"))?;
    for dataset in iter {
        schema::ensure_matching_columns(&baseline.columns, &dataset.columns)?;
    }
    Ok(baseline.columns.clone())
}

fn compute_extrema(datasets: &[DataSet], columns: &[Column]) -> Result<Extrema> {
    let mut min_values = HashMap::new();
    let mut max_values = HashMap::new();

    for column in columns {
        if column.kind != ColumnKind::Numeric {
            continue;
        }
        let target = match column.aggregation {
            Aggregation::Min => &mut min_values,
            Aggregation::Max => &mut max_values,
            _ => continue,
        };

        let mut extreme: Option<Decimal> = None;
        for row in datasets.iter().flat_map(|dataset| &dataset.rows) {
            let value = decimal_value(row, &column.name)?;
            extreme = Some(match (extreme, column.aggregation) {
                (None, _) => value,
                (Some(current), Aggregation::Min) => current.min(value),
                (Some(current), _) => current.max(value),
            });
        }
        let extreme = extreme.ok_or_else(|| {
            anyhow!(
                "No rows available to compute the global extreme for column '{}'",
                column.name
            )
        })?;
        target.insert(column.name.clone(), extreme);
    }

    Ok(Extrema {
        min_values,
        max_values,
    })
}

fn transform_first(row: &Row, columns: &[Column], extrema: &Extrema) -> Result<Row> {
    let mut out = Row::with_capacity(columns.len());
    for column in columns {
        let cell = row_cell(row, &column.name)?;
        let value = match column.aggregation {
            Aggregation::None | Aggregation::Incremental => cell.clone(),
            Aggregation::Min => extrema.min(&column.name)?,
            Aggregation::Max => extrema.max(&column.name)?,
        };
        out.insert(column.name.clone(), value);
    }
    Ok(out)
}

fn transform_continued(
    row: &Row,
    columns: &[Column],
    extrema: &Extrema,
    baseline: &Baseline,
) -> Result<Row> {
    let mut out = Row::with_capacity(columns.len());
    for column in columns {
        let cell = row_cell(row, &column.name)?;
        let value = match column.aggregation {
            Aggregation::None => cell.clone(),
            Aggregation::Incremental => {
                let raw = cell.as_decimal().ok_or_else(|| {
                    anyhow!(
                        "Column '{}' cannot be continued across files: cell is not a decimal",
                        column.name
                    )
                })?;
                Cell::Decimal(baseline.continue_value(&column.name, raw)?)
            }
            Aggregation::Min => extrema.min(&column.name)?,
            Aggregation::Max => extrema.max(&column.name)?,
        };
        out.insert(column.name.clone(), value);
    }
    Ok(out)
}

fn row_cell<'a>(row: &'a Row, name: &str) -> Result<&'a Cell> {
    row.get(name)
        .ok_or_else(|| anyhow!("Row is missing column '{name}'"))
}

fn decimal_value(row: &Row, name: &str) -> Result<Decimal> {
    row_cell(row, name)?
        .as_decimal()
        .ok_or_else(|| anyhow!("Column '{name}' does not hold a decimal value"))
}
