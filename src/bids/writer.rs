//! Writing one recording into a BIDS dataset.
//!
//! [`write_raw_bids`] is the counterpart of `mne_bids.write_raw_bids`: it
//! creates the dataset-level files on first use, registers the subject in
//! `participants.tsv`, registers the recording in its session's scans table,
//! and writes the EDF copy with its `channels.tsv` and `eeg.json` sidecars.
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Serialize;

use super::path::BidsPath;
use super::table::{TsvTable, NA};
use crate::channels::ChannelType;
use crate::edf::RawEdf;

/// BIDS version written to `dataset_description.json`.
pub const BIDS_VERSION: &str = "1.8.0";

/// Columns of a freshly created `participants.tsv`.
pub const PARTICIPANT_COLUMNS: &[&str] = &["participant_id", "age", "sex", "hand"];
/// Columns of a freshly created scans table.
pub const SCANS_COLUMNS: &[&str] = &["filename", "acq_time"];

/// Dataset-wide settings that do not vary per recording.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub overwrite:    bool,
    pub dataset_name: String,
    pub line_freq:    Option<u32>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self { overwrite: true, dataset_name: "[Unspecified]".to_string(), line_freq: None }
    }
}

// ── Sidecar documents ─────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DatasetDescription<'a> {
    name:         &'a str,
    #[serde(rename = "BIDSVersion")]
    bids_version: &'a str,
    dataset_type: &'a str,
    authors:      Vec<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct EegSidecar<'a> {
    task_name:              &'a str,
    manufacturer:           &'a str,
    power_line_frequency:   serde_json::Value,
    sampling_frequency:     f64,
    software_filters:       &'a str,
    recording_duration:     f64,
    recording_type:         &'a str,
    #[serde(rename = "EEGReference")]
    eeg_reference:          &'a str,
    #[serde(rename = "EEGGround")]
    eeg_ground:             &'a str,
    #[serde(rename = "EEGPlacementScheme")]
    eeg_placement_scheme:   &'a str,
    #[serde(rename = "EEGChannelCount")]
    eeg_channel_count:      usize,
    #[serde(rename = "EOGChannelCount")]
    eog_channel_count:      usize,
    #[serde(rename = "ECGChannelCount")]
    ecg_channel_count:      usize,
    #[serde(rename = "EMGChannelCount")]
    emg_channel_count:      usize,
    misc_channel_count:     usize,
    trigger_channel_count:  usize,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ColumnDescription<'a> {
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    levels:      Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    units:       Option<&'a str>,
}

// ── Entry point ───────────────────────────────────────────────────────────

/// Write `raw` at `bids_path` and update the dataset tables.
///
/// Returns the path of the written EDF file.
pub fn write_raw_bids(raw: &RawEdf, bids_path: &BidsPath, opts: &WriteOptions) -> Result<PathBuf> {
    let root = &bids_path.root;
    fs::create_dir_all(bids_path.datatype_dir())
        .with_context(|| format!("create {}", bids_path.datatype_dir().display()))?;

    write_dataset_description(root, &opts.dataset_name)?;
    write_readme(root, &opts.dataset_name)?;
    write_participants_json(root)?;
    register_participant(root, &bids_path.participant_id())?;

    let edf_path = bids_path.fpath("eeg", "edf");
    if edf_path.exists() && !opts.overwrite {
        bail!("{} already exists (overwrite disabled)", edf_path.display());
    }
    raw.write_edf(&edf_path)?;
    write_channels_tsv(&bids_path.fpath("channels", "tsv"), raw)?;
    write_eeg_sidecar(&bids_path.fpath("eeg", "json"), raw, &bids_path.task, opts.line_freq)?;
    register_scan(bids_path, raw, opts.overwrite)?;

    log::debug!("wrote {}", edf_path.display());
    Ok(edf_path)
}

// ── Dataset-level files ───────────────────────────────────────────────────

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json + "\n").with_context(|| format!("write {}", path.display()))
}

fn write_dataset_description(root: &Path, name: &str) -> Result<()> {
    let path = root.join("dataset_description.json");
    if path.exists() {
        return Ok(());
    }
    write_json(&path, &DatasetDescription {
        name,
        bids_version: BIDS_VERSION,
        dataset_type: "raw",
        authors: vec!["[Unspecified]"],
    })
}

fn write_readme(root: &Path, name: &str) -> Result<()> {
    let path = root.join("README");
    if path.exists() {
        return Ok(());
    }
    let text = format!(
        "# {name}\n\nBIDS conversion of the TUH EEG Abnormal Corpus (TUAB).\n\n\
         Per-recording normal/abnormal labels are stored in the `normality` column\n\
         of each session's scans table.\n"
    );
    fs::write(&path, text).with_context(|| format!("write {}", path.display()))
}

fn write_participants_json(root: &Path) -> Result<()> {
    let path = root.join("participants.json");
    if path.exists() {
        return Ok(());
    }
    let levels = |pairs: &[(&str, &str)]| -> Option<serde_json::Value> {
        let map: serde_json::Map<String, serde_json::Value> = pairs
            .iter()
            .map(|&(k, v)| (k.to_string(), serde_json::Value::from(v)))
            .collect();
        Some(serde_json::Value::Object(map))
    };
    let plain = |description: &'static str| ColumnDescription { description, levels: None, units: None };
    let doc: BTreeMap<&str, ColumnDescription> = BTreeMap::from([
        ("participant_id", plain("Unique participant identifier")),
        ("age", ColumnDescription {
            description: "Age of the participant at time of testing",
            levels: None,
            units: Some("year"),
        }),
        ("sex", ColumnDescription {
            description: "Biological sex of the participant",
            levels: levels(&[("F", "female"), ("M", "male")]),
            units: None,
        }),
        ("hand", ColumnDescription {
            description: "Handedness of the participant",
            levels: levels(&[("R", "right"), ("L", "left"), ("A", "ambidextrous")]),
            units: None,
        }),
        ("official_split", ColumnDescription {
            description: "Partition the subject was published in",
            levels: levels(&[("train", "official training set"), ("eval", "official evaluation set")]),
            units: None,
        }),
        ("n_normal_recordings", plain("Number of recordings labelled normal")),
        ("n_abnormal_recordings", plain("Number of recordings labelled abnormal")),
        ("train_val_test_split", ColumnDescription {
            description: "Reproducible split derived from the official split",
            levels: levels(&[("train", "training"), ("val", "validation"), ("test", "test"), ("none", "not assigned")]),
            units: None,
        }),
    ]);
    write_json(&path, &doc)
}

/// Add `participant_id` to `participants.tsv` unless already present.
fn register_participant(root: &Path, participant_id: &str) -> Result<()> {
    let path = root.join("participants.tsv");
    let mut table = TsvTable::read_or_new(&path, PARTICIPANT_COLUMNS)?;
    if table.find_rows("participant_id", participant_id).is_empty() {
        table.push_row(&[("participant_id", participant_id)])?;
        table.write(&path)?;
    }
    Ok(())
}

// ── Recording-level files ─────────────────────────────────────────────────

fn bids_units(unit: &str) -> &str {
    match unit {
        "" => NA,
        "uV" | "UV" => "µV",
        other => other,
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map_or_else(|| NA.to_string(), |x| x.to_string())
}

fn write_channels_tsv(path: &Path, raw: &RawEdf) -> Result<()> {
    let mut table = TsvTable::new(&[
        "name", "type", "units", "low_cutoff", "high_cutoff",
        "description", "sampling_frequency", "status", "status_description",
    ]);
    for ch in &raw.channels {
        let low = fmt_opt(ch.highpass);
        let high = fmt_opt(ch.lowpass);
        let sfreq = ch.sfreq.to_string();
        table.push_row(&[
            ("name", ch.name.as_str()),
            ("type", ch.kind.bids_type()),
            ("units", bids_units(&ch.unit)),
            ("low_cutoff", low.as_str()),
            ("high_cutoff", high.as_str()),
            ("description", ch.kind.description()),
            ("sampling_frequency", sfreq.as_str()),
            ("status", "good"),
        ])?;
    }
    table.write(path)
}

fn write_eeg_sidecar(path: &Path, raw: &RawEdf, task: &str, line_freq: Option<u32>) -> Result<()> {
    let count = |kind: ChannelType| raw.channels.iter().filter(|c| c.kind == kind).count();
    write_json(path, &EegSidecar {
        task_name: task,
        manufacturer: NA,
        power_line_frequency: line_freq.map_or_else(|| NA.into(), Into::into),
        sampling_frequency: raw.sfreq(),
        software_filters: NA,
        recording_duration: raw.duration_secs(),
        recording_type: "continuous",
        eeg_reference: NA,
        eeg_ground: NA,
        eeg_placement_scheme: NA,
        eeg_channel_count: count(ChannelType::Eeg),
        eog_channel_count: count(ChannelType::Eog),
        ecg_channel_count: count(ChannelType::Ecg),
        emg_channel_count: count(ChannelType::Emg),
        misc_channel_count: count(ChannelType::Misc),
        trigger_channel_count: count(ChannelType::Stim),
    })
}

/// Add (or replace) this recording's row in the session scans table.
fn register_scan(bids_path: &BidsPath, raw: &RawEdf, overwrite: bool) -> Result<()> {
    let path = bids_path.scans_tsv();
    let entry = bids_path.scans_entry();
    let mut table = TsvTable::read_or_new(&path, SCANS_COLUMNS)?;

    if table.remove_where("filename", &entry) > 0 && !overwrite {
        bail!("{entry} is already listed in {}", path.display());
    }
    let acq_time = raw
        .meas_date()
        .map_or_else(|| NA.to_string(), |t| t.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string());
    table.push_row(&[("filename", entry.as_str()), ("acq_time", acq_time.as_str())])?;
    table.write(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_are_bids_spelled() {
        assert_eq!(bids_units("uV"), "µV");
        assert_eq!(bids_units(""), NA);
        assert_eq!(bids_units("mV"), "mV");
    }
}
