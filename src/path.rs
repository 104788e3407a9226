//! Recording identity from the TUAB directory layout.
//!
//! ```text
//! <root>/<split>/<normality>/<montage>/<subject>_<session>_<run>.edf
//!         train    abnormal   01_tcp_ar  aaaaamde_s001_t000.edf
//! ```
//!
//! The montage directory is ignored. Session and run tokens lose their
//! `s` / `t` letters (`s001 → 001`, `t000 → 000`).
use std::fmt;
use std::path::{Component, Path};
use std::str::FromStr;

use thiserror::Error;

/// Why a source path could not be decomposed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("{path} is not below the source root")]
    OutsideRoot { path: String },

    #[error("expected <split>/<normality>/<montage>/<file>, got {count} components in {path}")]
    ComponentCount { path: String, count: usize },

    #[error("non UTF-8 path component in {path}")]
    NotUtf8 { path: String },

    #[error("file name '{name}' does not have the form <subject>_<session>_<run>.edf")]
    FileName { name: String },

    #[error("unknown official split '{0}' (expected train or eval)")]
    Split(String),

    #[error("unknown normality label '{0}' (expected normal or abnormal)")]
    Normality(String),
}

/// Official TUAB partition a recording was published in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OfficialSplit {
    Train,
    Eval,
}

impl OfficialSplit {
    pub fn as_str(self) -> &'static str {
        match self {
            OfficialSplit::Train => "train",
            OfficialSplit::Eval => "eval",
        }
    }
}

impl fmt::Display for OfficialSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OfficialSplit {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, PathError> {
        match s {
            "train" => Ok(OfficialSplit::Train),
            "eval" => Ok(OfficialSplit::Eval),
            other => Err(PathError::Split(other.to_string())),
        }
    }
}

/// Curator-assigned label of a single recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normality {
    Normal,
    Abnormal,
}

impl Normality {
    pub fn as_str(self) -> &'static str {
        match self {
            Normality::Normal => "normal",
            Normality::Abnormal => "abnormal",
        }
    }
}

impl fmt::Display for Normality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Normality {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, PathError> {
        match s {
            "normal" => Ok(Normality::Normal),
            "abnormal" => Ok(Normality::Abnormal),
            other => Err(PathError::Normality(other.to_string())),
        }
    }
}

/// Identity of one source recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingPath {
    pub split: OfficialSplit,
    pub normality: Normality,
    pub subject: String,
    pub session: String,
    pub run: String,
}

/// Decompose `file` (absolute or relative, but below `source_root`).
pub fn parse_recording_path(source_root: &Path, file: &Path) -> Result<RecordingPath, PathError> {
    let display = || file.display().to_string();

    let rel = file
        .strip_prefix(source_root)
        .map_err(|_| PathError::OutsideRoot { path: display() })?;

    let parts = rel
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .map(|c| c.as_os_str().to_str().ok_or_else(|| PathError::NotUtf8 { path: display() }))
        .collect::<Result<Vec<&str>, _>>()?;

    let [split, normality, _montage, fname] = parts[..] else {
        return Err(PathError::ComponentCount { path: display(), count: parts.len() });
    };

    let (subject, session, run) = split_file_name(fname)?;

    Ok(RecordingPath {
        split: split.parse()?,
        normality: normality.parse()?,
        subject: subject.to_string(),
        session: session.replace('s', ""),
        run: run.replace('t', ""),
    })
}

/// `aaaaamde_s001_t000.edf` → `("aaaaamde", "s001", "t000")`.
fn split_file_name(fname: &str) -> Result<(&str, &str, &str), PathError> {
    let err = || PathError::FileName { name: fname.to_string() };
    let stem = fname.strip_suffix(".edf").ok_or_else(err)?;
    let tokens: Vec<&str> = stem.split('_').collect();
    match tokens[..] {
        [subject, session, run] => Ok((subject, session, run)),
        _ => Err(err()),
    }
}
