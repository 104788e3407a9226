//! Post-conversion curation of `participants.tsv`.
//!
//! * ages above the configured maximum (the corpus uses `999` for unknown)
//!   become `n/a`;
//! * each subject gets `n_normal_recordings` / `n_abnormal_recordings`,
//!   counted from the `normality` column of every scans table below
//!   `sub-<ID>/`.
//!
//! Any malformed scans table aborts curation.
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use walkdir::WalkDir;

use crate::bids::{TsvTable, NA};
use crate::config::ConvertConfig;
use crate::path::Normality;

pub const N_NORMAL_COLUMN: &str = "n_normal_recordings";
pub const N_ABNORMAL_COLUMN: &str = "n_abnormal_recordings";

/// Replace every `age` above `max_age` with `n/a`. Returns how many were nulled.
pub fn null_implausible_ages(table: &mut TsvTable, max_age: u32) -> Result<usize> {
    let ages: Vec<String> = table.column("age")?.into_iter().map(str::to_string).collect();
    let mut nulled = 0;
    for (row, age) in ages.iter().enumerate() {
        if age == NA {
            continue;
        }
        let value: f64 = age.parse().with_context(|| format!("invalid age '{age}' in row {row}"))?;
        if value > max_age as f64 {
            table.set(row, "age", NA)?;
            nulled += 1;
        }
    }
    Ok(nulled)
}

/// Every `*_scans.tsv` below `subject_dir`, sorted.
pub fn scans_tables(subject_dir: &Path) -> Result<Vec<PathBuf>> {
    if !subject_dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    for entry in WalkDir::new(subject_dir).sort_by_file_name() {
        let entry = entry?;
        let is_scans = entry.file_name().to_str().is_some_and(|n| n.ends_with("_scans.tsv"));
        if entry.file_type().is_file() && is_scans {
            out.push(entry.into_path());
        }
    }
    Ok(out)
}

/// Normality labels of one scans table.
///
/// Unless `count_all` is set the table must hold exactly one row.
pub fn read_normalities(scans_tsv: &Path, count_all: bool) -> Result<Vec<Normality>> {
    let table = TsvTable::read(scans_tsv)?;
    let labels = table
        .column("normality")
        .with_context(|| format!("reading {}", scans_tsv.display()))?;
    if !count_all {
        ensure!(
            labels.len() == 1,
            "{} holds {} recordings; expected exactly one",
            scans_tsv.display(),
            labels.len()
        );
    }
    labels
        .into_iter()
        .map(|l| l.parse::<Normality>().with_context(|| format!("in {}", scans_tsv.display())))
        .collect()
}

/// Fill the per-subject recording counters from the scans tables.
pub fn count_recordings(table: &mut TsvTable, bids_root: &Path, count_all: bool) -> Result<()> {
    table.ensure_column(N_NORMAL_COLUMN, "0");
    table.ensure_column(N_ABNORMAL_COLUMN, "0");

    let ids: Vec<String> = table.column("participant_id")?.into_iter().map(str::to_string).collect();
    for (row, id) in ids.iter().enumerate() {
        let (mut normal, mut abnormal) = (0usize, 0usize);
        for scans in scans_tables(&bids_root.join(id))? {
            for label in read_normalities(&scans, count_all)? {
                match label {
                    Normality::Normal => normal += 1,
                    Normality::Abnormal => abnormal += 1,
                }
            }
        }
        table.set(row, N_NORMAL_COLUMN, &normal.to_string())?;
        table.set(row, N_ABNORMAL_COLUMN, &abnormal.to_string())?;
    }
    Ok(())
}

/// Read `participants.tsv`, clean ages and add recording counts.
///
/// The curated table is returned, not written.
pub fn curate_participants(cfg: &ConvertConfig) -> Result<TsvTable> {
    let mut table = TsvTable::read(cfg.participants_tsv())?;
    let nulled = null_implausible_ages(&mut table, cfg.max_age)?;
    if nulled > 0 {
        log::info!("nulled {nulled} ages above {}", cfg.max_age);
    }
    count_recordings(&mut table, &cfg.bids_root, cfg.count_all_scans)?;
    Ok(table)
}
