//! # tuab-bids — TUAB → BIDS conversion in pure Rust
//!
//! `tuab-bids` turns the TUH EEG Abnormal Corpus (raw EDF recordings laid
//! out as `<split>/<normality>/<montage>/<subject>_<session>_<run>.edf`) into
//! a BIDS dataset with harmonised channel names, subject demographics taken
//! from the EDF header, and a reproducible train/val/test split.
//!
//! ## Pipeline overview
//!
//! ```text
//! sourcedata/v3.0.1/edf/**.edf
//!   │
//!   ├─ convert::reset_output()        rawdata/ deleted
//!   ├─ for each file
//!   │    ├─ path::parse_recording_path()     split, normality, sub, ses, run
//!   │    ├─ demographics::extract_demographics()   age, sex (bytes 8..88)
//!   │    ├─ edf::open_raw()                   header + channels
//!   │    ├─ set_channel_types / rename_channels   channels::CHANNEL_*_MAP
//!   │    ├─ bids::write_raw_bids()            EDF copy + sidecars + tables
//!   │    └─ participants.tsv / scans.tsv updated
//!   │     (errors → report.failures, continue)
//!   ├─ curate::curate_participants()  ages > 120 → n/a, recording counts
//!   ├─ split::assign_splits()         eval → test, 10 % of train → val
//!   └─ participants.tsv written
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use tuab_bids::{run, ConvertConfig};
//!
//! let cfg = ConvertConfig {
//!     source_root: "/data/tuab/v3.0.1/edf".into(),
//!     bids_root:   "/data/tuab-bids".into(),
//!     ..ConvertConfig::default()
//! };
//! let report = run(&cfg).unwrap();
//! println!("{}/{} files converted", report.succeeded(), report.total);
//! ```
//!
//! ## Errors
//!
//! Per-file problems (unexpected path shape, unreadable header, write
//! failure) are collected in [`ConversionReport::failures`]. Dataset-level
//! problems (overlapping official splits, malformed scans tables during
//! curation) abort [`run`] with an error.

pub mod bids;
pub mod channels;
pub mod config;
pub mod convert;
pub mod curate;
pub mod demographics;
pub mod edf;
pub mod path;
pub mod split;

use anyhow::Result;

// ── Crate-root re-exports ─────────────────────────────────────────────────

// config
pub use config::ConvertConfig;

// channels
pub use channels::{channel_type, harmonize, standard_name, ChannelType, CHANNEL_NAME_MAP, CHANNEL_TYPE_MAP};

// path
pub use path::{parse_recording_path, Normality, OfficialSplit, PathError, RecordingPath};

// demographics
pub use demographics::{extract_demographics, parse_demographics, Demographics};

// edf
pub use edf::{open_raw, Channel, EdfHeader, RawEdf, SignalHeader};

// bids
pub use bids::{write_raw_bids, BidsPath, TsvTable, WriteOptions, NA};

// convert
pub use convert::{convert_dataset, convert_recording, discover_recordings, ConversionReport, FailedFile};

// curate
pub use curate::{curate_participants, N_ABNORMAL_COLUMN, N_NORMAL_COLUMN};

// split
pub use split::{apply_splits, assign_splits, DatasetSplit, SplitAssignment, SPLIT_COLUMN};

/// Run the **whole conversion**: per-file pass, curation, split assignment.
///
/// # Steps
///
/// 1. [`convert_dataset`] — delete [`ConvertConfig::bids_root`], convert every
///    EDF file, collect per-file failures.
/// 2. [`curate_participants`] — null ages above [`ConvertConfig::max_age`],
///    count normal/abnormal recordings per subject.
/// 3. [`assign_splits`] + [`apply_splits`] — add `train_val_test_split`.
/// 4. Write the curated `participants.tsv`.
///
/// # Errors
///
/// Returns an error only for dataset-level failures; see the crate docs.
pub fn run(cfg: &ConvertConfig) -> Result<ConversionReport> {
    let report = convert_dataset(cfg)?;

    let mut participants = curate_participants(cfg)?;
    let assignment = assign_splits(&participants, cfg.val_fraction, cfg.seed)?;
    apply_splits(&mut participants, &assignment)?;
    participants.write(cfg.participants_tsv())?;

    log::info!(
        "converted {}/{} files into {}",
        report.succeeded(),
        report.total,
        cfg.bids_root.display()
    );
    Ok(report)
}
