pub mod cli;
pub mod compare;
pub mod data;
pub mod io_utils;
pub mod merge;
pub mod reader;
pub mod schema;
pub mod writer;

use std::{env, path::PathBuf, sync::OnceLock, thread};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, CompareCli},
    data::DataSet,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("telemetry_csv_merger", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let factors = cli::parse_factors(&cli.factors)?;
    let inputs = io_utils::collect_input_files(&cli.inputs)?;
    if inputs.is_empty() {
        return Err(anyhow!("No input files found"));
    }
    debug!("Input files: {:?}", inputs);

    let datasets = parse_all(&inputs)?;
    info!("Parsed {} file(s)", datasets.len());

    let merged = merge::merge(&datasets)?;
    writer::write_dataset(&merged, &cli.output, &factors)
        .with_context(|| format!("Writing merged output to {:?}", cli.output))?;
    info!("Wrote {} data row(s) to {:?}", merged.rows.len(), cli.output);
    Ok(())
}

/// Files parse independently, one scoped thread each; results are joined
/// back in input order before the order-sensitive merge begins.
fn parse_all(inputs: &[PathBuf]) -> Result<Vec<DataSet>> {
    thread::scope(|scope| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|path| scope.spawn(move || reader::parse_file(path)))
            .collect();
        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(result) => result,
                Err(_) => Err(anyhow!("Parser thread panicked")),
            })
            .collect()
    })
}

pub fn run_compare() -> Result<()> {
    init_logging();
    let cli = CompareCli::parse();

    let left = reader::parse_file(&cli.left)?;
    let right = reader::parse_file(&cli.right)?;
    compare::compare(&left, &right)
        .with_context(|| format!("Comparing {:?} and {:?}", cli.left, cli.right))?;

    println!("Files are equal.");
    Ok(())
}
