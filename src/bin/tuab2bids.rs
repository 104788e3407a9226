//! tuab2bids: convert the TUAB corpus into a BIDS dataset.
//!
//! With no arguments it reads `sourcedata/v3.0.1/edf` and writes `rawdata`
//! relative to the working directory. The destination is deleted first.
//!
//! Set `RUST_LOG=debug` for per-file output.
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use tuab_bids::{run, ConvertConfig};

#[derive(Parser, Debug)]
#[command(name = "tuab2bids", about = "Convert TUAB EDF recordings to BIDS")]
struct Args {
    /// Directory holding the `train/` and `eval/` trees.
    #[arg(long, default_value = "sourcedata/v3.0.1/edf")]
    source: PathBuf,

    /// BIDS output directory (deleted before conversion).
    #[arg(long, default_value = "rawdata")]
    output: PathBuf,

    /// Seed of the validation sampler.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Fraction of official-train subjects moved to validation.
    #[arg(long, default_value_t = 0.1)]
    val_fraction: f64,

    /// Ages above this are replaced with n/a.
    #[arg(long, default_value_t = 120)]
    max_age: u32,

    /// Mains frequency for the EEG sidecars (Hz).
    #[arg(long)]
    line_freq: Option<u32>,

    /// Count every row of multi-run scans tables instead of failing.
    #[arg(long)]
    count_all_scans: bool,

    /// Disable the progress bar.
    #[arg(long)]
    no_progress: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let cfg = ConvertConfig {
        source_root: args.source,
        bids_root: args.output,
        seed: args.seed,
        val_fraction: args.val_fraction,
        max_age: args.max_age,
        line_freq: args.line_freq,
        count_all_scans: args.count_all_scans,
        show_progress: !args.no_progress,
        ..ConvertConfig::default()
    };

    let report = run(&cfg)?;

    println!(
        "BIDS conversion completed. {}/{} files were successfully processed.",
        report.succeeded(),
        report.total
    );
    if !report.failures.is_empty() {
        println!("Errors occurred for the following files:");
        for failed in &report.failures {
            println!("{}", failed.path.display());
        }
    }
    Ok(())
}
