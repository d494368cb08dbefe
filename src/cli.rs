use std::{collections::HashMap, path::PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use rust_decimal::Decimal;

#[derive(Debug, Parser)]
#[command(
    name = "telemetry-csv-merger",
    version,
    about = "Merge chronologically ordered telemetry CSV recordings into one continuous dataset",
    long_about = None
)]
pub struct Cli {
    /// Input CSV files, or directories containing CSV files
    #[arg(required = true, value_name = "input")]
    pub inputs: Vec<PathBuf>,
    /// Output file
    #[arg(short = 'o', long = "output", default_value = "merged.csv")]
    pub output: PathBuf,
    /// Output factor for a field of the form `field=factor`. Can be used
    /// multiple times for different fields.
    #[arg(short = 'f', long = "factor", value_name = "field=factor", action = clap::ArgAction::Append)]
    pub factors: Vec<String>,
}

#[derive(Debug, Parser)]
#[command(
    name = "telemetry-compare",
    version,
    about = "Compare two telemetry CSV files for near-equality",
    long_about = None
)]
pub struct CompareCli {
    /// First telemetry CSV file
    #[arg(value_name = "file1")]
    pub left: PathBuf,
    /// Second telemetry CSV file
    #[arg(value_name = "file2")]
    pub right: PathBuf,
}

pub fn parse_factors(specs: &[String]) -> Result<HashMap<String, Decimal>> {
    let mut factors = HashMap::with_capacity(specs.len());
    for spec in specs {
        let (field, factor) = spec
            .split_once('=')
            .ok_or_else(|| anyhow!("Invalid factor '{spec}', expected field=factor"))?;
        let parsed: Decimal = factor
            .parse()
            .with_context(|| format!("Failed to parse '{factor}' as decimal factor"))?;
        factors.insert(field.to_string(), parsed);
    }
    Ok(factors)
}
