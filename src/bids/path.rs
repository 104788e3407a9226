//! BIDS entity paths for one EEG recording.
//!
//! ```text
//! <root>/sub-<S>/ses-<T>/eeg/sub-<S>_ses-<T>_task-<task>_run-<R>_<suffix>.<ext>
//! <root>/sub-<S>/ses-<T>/sub-<S>_ses-<T>_scans.tsv
//! ```
use std::path::{Path, PathBuf};

/// Datatype directory used for every recording.
pub const DATATYPE: &str = "eeg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidsPath {
    pub root:    PathBuf,
    pub subject: String,
    pub session: String,
    pub run:     String,
    pub task:    String,
}

impl BidsPath {
    pub fn new(root: &Path, subject: &str, session: &str, run: &str, task: &str) -> Self {
        Self {
            root:    root.to_path_buf(),
            subject: subject.to_string(),
            session: session.to_string(),
            run:     run.to_string(),
            task:    task.to_string(),
        }
    }

    /// `sub-<S>`, the key of the participant table.
    pub fn participant_id(&self) -> String {
        format!("sub-{}", self.subject)
    }

    pub fn subject_dir(&self) -> PathBuf {
        self.root.join(self.participant_id())
    }

    pub fn session_dir(&self) -> PathBuf {
        self.subject_dir().join(format!("ses-{}", self.session))
    }

    pub fn datatype_dir(&self) -> PathBuf {
        self.session_dir().join(DATATYPE)
    }

    /// `sub-<S>_ses-<T>_task-<task>_run-<R>`.
    pub fn basename(&self) -> String {
        format!(
            "sub-{}_ses-{}_task-{}_run-{}",
            self.subject, self.session, self.task, self.run
        )
    }

    /// File inside the datatype directory, e.g. `fpath("channels", "tsv")`.
    pub fn fpath(&self, suffix: &str, extension: &str) -> PathBuf {
        self.datatype_dir().join(format!("{}_{suffix}.{extension}", self.basename()))
    }

    /// Session-level scans table.
    pub fn scans_tsv(&self) -> PathBuf {
        self.session_dir()
            .join(format!("sub-{}_ses-{}_scans.tsv", self.subject, self.session))
    }

    /// Value of the `filename` column of the scans table for this recording.
    pub fn scans_entry(&self) -> String {
        format!("{DATATYPE}/{}_eeg.edf", self.basename())
    }
}
