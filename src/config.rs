//! Conversion configuration.
//!
//! [`ConvertConfig`] holds every tunable parameter of the TUAB → BIDS pass.
//! All fields have defaults that reproduce the layout and constants of the
//! published conversion of the dataset.
use std::path::PathBuf;

/// Configuration for a full conversion run.
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use tuab_bids::ConvertConfig;
///
/// let cfg = ConvertConfig {
///     source_root: "/data/tuab/edf".into(),
///     bids_root:   "/data/tuab-bids".into(),
///     ..ConvertConfig::default()
/// };
/// assert_eq!(cfg.seed, 42);
/// ```
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Root of the raw corpus, i.e. the directory holding `train/` and `eval/`.
    ///
    /// Default: `sourcedata/v3.0.1/edf`.
    pub source_root: PathBuf,

    /// Destination of the BIDS dataset.
    ///
    /// **Deleted wholesale** at the start of every run.
    ///
    /// Default: `rawdata`.
    pub bids_root: PathBuf,

    /// BIDS `task` entity used for every recording.
    ///
    /// Default: `"rest"`.
    pub task: String,

    /// `Name` written to `dataset_description.json`.
    ///
    /// Default: `"TUH EEG Abnormal Corpus"`.
    pub dataset_name: String,

    /// Mains frequency written as `PowerLineFrequency` in the EEG sidecar.
    /// `None` writes `"n/a"`.
    ///
    /// Default: `None`.
    pub line_freq: Option<u32>,

    /// Ages strictly above this value are treated as sentinels and nulled.
    ///
    /// The corpus uses `999` for unknown ages.
    ///
    /// Default: `120`.
    pub max_age: u32,

    /// Fraction of the official train split moved to validation.
    ///
    /// The number of validation subjects is
    /// `round_half_even(val_fraction × n_train)`.
    ///
    /// Default: `0.1`.
    pub val_fraction: f64,

    /// Seed of the validation sampler.
    ///
    /// Default: `42`.
    pub seed: u64,

    /// Count every row of a scans table instead of requiring exactly one.
    ///
    /// With `false` a session holding several runs aborts curation.
    ///
    /// Default: `false`.
    pub count_all_scans: bool,

    /// Draw an `indicatif` progress bar over the file list.
    ///
    /// Default: `true`.
    pub show_progress: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("sourcedata/v3.0.1/edf"),
            bids_root: PathBuf::from("rawdata"),
            task: "rest".to_string(),
            dataset_name: "TUH EEG Abnormal Corpus".to_string(),
            line_freq: None,
            max_age: 120,
            val_fraction: 0.1,
            seed: 42,
            count_all_scans: false,
            show_progress: true,
        }
    }
}

impl ConvertConfig {
    /// Path of the participant table inside [`ConvertConfig::bids_root`].
    ///
    /// ```
    /// use tuab_bids::ConvertConfig;
    /// let cfg = ConvertConfig::default();
    /// assert!(cfg.participants_tsv().ends_with("rawdata/participants.tsv"));
    /// ```
    pub fn participants_tsv(&self) -> PathBuf {
        self.bids_root.join("participants.tsv")
    }
}
