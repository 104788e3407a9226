//! The per-file conversion pass.
//!
//! # Algorithm
//! 1. Delete the destination tree.
//! 2. Collect every `*.edf` below the source root (sorted).
//! 3. For each file: parse its path, read the patient field, open the EDF,
//!    retype then rename its channels, write it into the BIDS tree, and
//!    record age/sex/official split in `participants.tsv` and the
//!    normality label in the session scans table.
//! 4. A failure anywhere in step 3 is logged, the file is added to the
//!    report's failure list, and the pass moves on. Nothing is rolled back,
//!    so a failed file may leave partial output behind.
//!
//! Both tables are read and rewritten in full for every file.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use walkdir::WalkDir;

use crate::bids::{write_raw_bids, BidsPath, TsvTable, WriteOptions, NA};
use crate::channels::{CHANNEL_NAME_MAP, CHANNEL_TYPE_MAP};
use crate::config::ConvertConfig;
use crate::demographics::{extract_demographics, Demographics};
use crate::edf::open_raw;
use crate::path::{parse_recording_path, Normality, RecordingPath};

/// A source file that could not be converted.
#[derive(Debug)]
pub struct FailedFile {
    pub path:  PathBuf,
    pub error: anyhow::Error,
}

/// Outcome of [`convert_dataset`].
#[derive(Debug, Default)]
pub struct ConversionReport {
    /// Number of source files found.
    pub total:     usize,
    pub converted: Vec<RecordingPath>,
    pub failures:  Vec<FailedFile>,
}

impl ConversionReport {
    pub fn succeeded(&self) -> usize {
        self.total - self.failures.len()
    }
}

/// Remove `bids_root` if it exists so every run starts from an empty tree.
pub fn reset_output(bids_root: &Path) -> Result<()> {
    if bids_root.exists() {
        log::info!("Deleting existing BIDS directory: {}", bids_root.display());
        fs::remove_dir_all(bids_root)
            .with_context(|| format!("delete {}", bids_root.display()))?;
    }
    Ok(())
}

/// All `*.edf` files below `source_root`, in lexicographic path order.
///
/// Symbolic links are followed, so annexed datasets whose data files are
/// links into an object store are found too.
pub fn discover_recordings(source_root: &Path) -> Result<Vec<PathBuf>> {
    if !source_root.is_dir() {
        bail!("source directory {} does not exist", source_root.display());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(source_root).follow_links(true).sort_by_file_name() {
        let entry = entry.with_context(|| format!("scan {}", source_root.display()))?;
        let is_edf = entry.path().extension().is_some_and(|e| e == "edf");
        if entry.file_type().is_file() && is_edf {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Convert one source file. Any error is a per-file failure.
pub fn convert_recording(file: &Path, cfg: &ConvertConfig, opts: &WriteOptions) -> Result<RecordingPath> {
    let rec = parse_recording_path(&cfg.source_root, file)?;
    let demographics = extract_demographics(file)?;

    let bids_path = BidsPath::new(&cfg.bids_root, &rec.subject, &rec.session, &rec.run, &cfg.task);

    let mut raw = open_raw(file)?;
    raw.set_channel_types(CHANNEL_TYPE_MAP);
    raw.rename_channels(CHANNEL_NAME_MAP)?;

    write_raw_bids(&raw, &bids_path, opts)?;

    update_participant(&cfg.participants_tsv(), &bids_path.participant_id(), &rec, &demographics)?;
    update_scan(&bids_path, rec.normality)?;
    Ok(rec)
}

/// Record age, sex and official split for one subject.
fn update_participant(
    participants_tsv: &Path,
    participant_id: &str,
    rec: &RecordingPath,
    demographics: &Demographics,
) -> Result<()> {
    let mut table = TsvTable::read(participants_tsv)?;
    let age = demographics.age.map_or_else(|| NA.to_string(), |a| a.to_string());
    let sex = demographics.sex.map_or_else(|| NA.to_string(), String::from);
    table.set_where("participant_id", participant_id, "age", &age)?;
    table.set_where("participant_id", participant_id, "sex", &sex)?;
    table.set_where("participant_id", participant_id, "official_split", rec.split.as_str())?;
    table.write(participants_tsv)
}

/// Record the normality label of one recording in its session scans table.
///
/// TUAB contains subjects with both normal and abnormal recordings, so the
/// label lives with the recording rather than with the participant.
fn update_scan(bids_path: &BidsPath, normality: Normality) -> Result<()> {
    let path = bids_path.scans_tsv();
    let mut table = TsvTable::read(&path)?;
    table.set_where("filename", &bids_path.scans_entry(), "normality", normality.as_str())?;
    table.write(&path)
}

fn progress_bar(len: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] {wide_bar} {pos}/{len} ({eta})",
    ) {
        pb.set_style(style);
    }
    pb
}

/// Run the conversion pass over the whole source tree.
///
/// Only dataset-level problems (unreadable source root, undeletable
/// destination) are returned as `Err`; per-file problems end up in
/// [`ConversionReport::failures`].
pub fn convert_dataset(cfg: &ConvertConfig) -> Result<ConversionReport> {
    reset_output(&cfg.bids_root)?;
    let files = discover_recordings(&cfg.source_root)?;
    log::info!("found {} EDF files below {}", files.len(), cfg.source_root.display());

    let opts = WriteOptions {
        overwrite: true,
        dataset_name: cfg.dataset_name.clone(),
        line_freq: cfg.line_freq,
    };

    let mut report = ConversionReport { total: files.len(), ..Default::default() };
    let pb = progress_bar(files.len() as u64, cfg.show_progress);
    for file in files {
        match convert_recording(&file, cfg, &opts) {
            Ok(rec) => report.converted.push(rec),
            Err(error) => {
                pb.suspend(|| log::error!("Error processing file {}: {error:#}", file.display()));
                report.failures.push(FailedFile { path: file, error });
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(report)
}
