//! Near-equality diff of two parsed datasets.
//!
//! Decimals are compared after rescaling to 10 fractional digits with
//! half-up rounding, so write-time rounding noise does not flag a mismatch;
//! timestamps must match exactly.

use anyhow::{Context, Result, bail};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
    data::{Cell, DataSet},
    schema,
};

const COMPARE_SCALE: u32 = 10;

/// Fails on the first difference: row count, column-name set, or any cell
/// beyond tolerance. Errors carry the data row number and column name.
pub fn compare(left: &DataSet, right: &DataSet) -> Result<()> {
    schema::ensure_matching_columns(&left.columns, &right.columns)?;

    if left.rows.len() != right.rows.len() {
        bail!(
            "Number of data rows does not match ({} vs {})",
            left.rows.len(),
            right.rows.len()
        );
    }

    for (row_idx, (left_row, right_row)) in left.rows.iter().zip(&right.rows).enumerate() {
        for column in &left.columns {
            let left_cell = left_row
                .get(&column.name)
                .with_context(|| format!("Row {} is missing column '{}'", row_idx + 1, column.name))?;
            let right_cell = right_row
                .get(&column.name)
                .with_context(|| format!("Row {} is missing column '{}'", row_idx + 1, column.name))?;
            compare_cells(left_cell, right_cell)
                .with_context(|| format!("Row {}, column '{}'", row_idx + 1, column.name))?;
        }
    }

    Ok(())
}

fn compare_cells(left: &Cell, right: &Cell) -> Result<()> {
    match (left, right) {
        (Cell::Decimal(a), Cell::Decimal(b)) => {
            if rounded(*a) != rounded(*b) {
                bail!("Decimal values do not match ({a} != {b})");
            }
        }
        (Cell::Timestamp(a), Cell::Timestamp(b)) => {
            if a != b {
                bail!("Timestamps do not match ({a} != {b})");
            }
        }
        _ => bail!("Cell kinds do not match"),
    }
    Ok(())
}

fn rounded(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(COMPARE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}
