//! Channel harmonisation for TUAB recordings.
//!
//! TUAB stores every electrode against a common reference using labels such
//! as `EEG FP1-REF`. Two static tables map these raw labels to standard
//! 10-20 names (old temporal names are mapped to their 10-10 equivalents,
//! e.g. `T3 → T7`, `T5 → P7`) and to a physiological channel type.
//!
//! Lookups are exact string matches. A label absent from a table is left
//! untouched; there is no error path.
use std::fmt;
use std::str::FromStr;

use anyhow::bail;

/// Signal class of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelType {
    /// Scalp electroencephalogram.
    #[default]
    Eeg,
    /// Electrocardiogram.
    Ecg,
    /// Electromyogram.
    Emg,
    /// Electrooculogram.
    Eog,
    /// Stimulus / trigger marker.
    Stim,
    /// Anything else (derived traces, rates, burst flags).
    Misc,
}

impl ChannelType {
    /// Lower-case MNE name (`"eeg"`, `"stim"`, …).
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelType::Eeg => "eeg",
            ChannelType::Ecg => "ecg",
            ChannelType::Emg => "emg",
            ChannelType::Eog => "eog",
            ChannelType::Stim => "stim",
            ChannelType::Misc => "misc",
        }
    }

    /// Value of the `type` column of a BIDS `channels.tsv`.
    pub fn bids_type(self) -> &'static str {
        match self {
            ChannelType::Eeg => "EEG",
            ChannelType::Ecg => "ECG",
            ChannelType::Emg => "EMG",
            ChannelType::Eog => "EOG",
            ChannelType::Stim => "TRIG",
            ChannelType::Misc => "MISC",
        }
    }

    /// Value of the `description` column of a BIDS `channels.tsv`.
    pub fn description(self) -> &'static str {
        match self {
            ChannelType::Eeg => "ElectroEncephaloGram",
            ChannelType::Ecg => "ElectroCardioGram",
            ChannelType::Emg => "ElectroMyoGram",
            ChannelType::Eog => "ElectroOculoGram",
            ChannelType::Stim => "Trigger",
            ChannelType::Misc => "Miscellaneous",
        }
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Ok(match s {
            "eeg" => ChannelType::Eeg,
            "ecg" => ChannelType::Ecg,
            "emg" => ChannelType::Emg,
            "eog" => ChannelType::Eog,
            "stim" => ChannelType::Stim,
            "misc" => ChannelType::Misc,
            other => bail!("unknown channel type '{other}'"),
        })
    }
}

// ── Lookup tables ─────────────────────────────────────────────────────────

/// Raw TUAB label → standard channel name.
pub const CHANNEL_NAME_MAP: &[(&str, &str)] = &[
    ("EEG A1-REF", "A1"),
    ("EEG A2-REF", "A2"),
    ("EEG CZ-REF", "Cz"),
    ("EEG C3-REF", "C3"),
    ("EEG C4-REF", "C4"),
    ("EEG FP1-REF", "Fp1"),
    ("EEG FP2-REF", "Fp2"),
    ("EEG F3-REF", "F3"),
    ("EEG F4-REF", "F4"),
    ("EEG F7-REF", "F7"),
    ("EEG F8-REF", "F8"),
    ("EEG FZ-REF", "Fz"),
    ("EEG O1-REF", "O1"),
    ("EEG O2-REF", "O2"),
    ("EEG OZ-REF", "Oz"),
    ("EEG P3-REF", "P3"),
    ("EEG P4-REF", "P4"),
    ("EEG PZ-REF", "Pz"),
    ("EEG T3-REF", "T7"),
    ("EEG T4-REF", "T8"),
    ("EEG T5-REF", "P7"),
    ("EEG T6-REF", "P8"),
    ("EEG T1-REF", "T1"),
    ("EEG T2-REF", "T2"),
    ("EEG C3P-REF", "CP3"),
    ("EEG C4P-REF", "CP4"),
    ("EEG PG1-REF", "PG1"),
    ("EEG PG2-REF", "PG2"),
    ("EEG SP1-REF", "SP1"),
    ("EEG SP2-REF", "SP2"),
    ("EEG 26-REF", "EEG 26"),
    ("EEG 27-REF", "EEG 27"),
    ("EEG 28-REF", "EEG 28"),
    ("EEG 29-REF", "EEG 29"),
    ("EEG 30-REF", "EEG 30"),
    ("EEG 31-REF", "EEG 31"),
    ("EEG 32-REF", "EEG 32"),
    ("ECG EKG-REF", "ECG"),
    ("EEG EKG1-REF", "ECG"),
    ("EMG-REF", "EMG"),
    ("EEG LOC-REF", "LOC"),
    ("EEG ROC-REF", "ROC"),
    ("BURSTS", "BURSTS"),
    ("SUPPR", "SUPPR"),
    ("PHOTIC-REF", "PHOTIC"),
    ("IBI", "IBI"),
    ("PULSE RATE", "PULSE"),
];

/// Raw TUAB label → channel type.
pub const CHANNEL_TYPE_MAP: &[(&str, ChannelType)] = &[
    ("EEG A1-REF", ChannelType::Eeg),
    ("EEG A2-REF", ChannelType::Eeg),
    ("EEG CZ-REF", ChannelType::Eeg),
    ("EEG C3-REF", ChannelType::Eeg),
    ("EEG C4-REF", ChannelType::Eeg),
    ("EEG FP1-REF", ChannelType::Eeg),
    ("EEG FP2-REF", ChannelType::Eeg),
    ("EEG F3-REF", ChannelType::Eeg),
    ("EEG F4-REF", ChannelType::Eeg),
    ("EEG F7-REF", ChannelType::Eeg),
    ("EEG F8-REF", ChannelType::Eeg),
    ("EEG FZ-REF", ChannelType::Eeg),
    ("EEG O1-REF", ChannelType::Eeg),
    ("EEG O2-REF", ChannelType::Eeg),
    ("EEG OZ-REF", ChannelType::Eeg),
    ("EEG P3-REF", ChannelType::Eeg),
    ("EEG P4-REF", ChannelType::Eeg),
    ("EEG PZ-REF", ChannelType::Eeg),
    ("EEG T3-REF", ChannelType::Eeg),
    ("EEG T4-REF", ChannelType::Eeg),
    ("EEG T5-REF", ChannelType::Eeg),
    ("EEG T6-REF", ChannelType::Eeg),
    ("EEG T1-REF", ChannelType::Eeg),
    ("EEG T2-REF", ChannelType::Eeg),
    ("EEG C3P-REF", ChannelType::Eeg),
    ("EEG C4P-REF", ChannelType::Eeg),
    ("EEG PG1-REF", ChannelType::Eeg),
    ("EEG PG2-REF", ChannelType::Eeg),
    ("EEG SP1-REF", ChannelType::Eeg),
    ("EEG SP2-REF", ChannelType::Eeg),
    ("EEG 26-REF", ChannelType::Eeg),
    ("EEG 27-REF", ChannelType::Eeg),
    ("EEG 28-REF", ChannelType::Eeg),
    ("EEG 29-REF", ChannelType::Eeg),
    ("EEG 30-REF", ChannelType::Eeg),
    ("EEG 31-REF", ChannelType::Eeg),
    ("EEG 32-REF", ChannelType::Eeg),
    ("ECG EKG-REF", ChannelType::Ecg),
    ("EEG EKG1-REF", ChannelType::Ecg),
    ("EMG-REF", ChannelType::Emg),
    ("EEG LOC-REF", ChannelType::Eog),
    ("EEG ROC-REF", ChannelType::Eog),
    ("BURSTS", ChannelType::Misc),
    ("SUPPR", ChannelType::Misc),
    ("PHOTIC-REF", ChannelType::Stim),
    ("IBI", ChannelType::Misc),
    ("PULSE RATE", ChannelType::Misc),
];

/// Standard name for a raw label, if the label is known.
pub fn standard_name(label: &str) -> Option<&'static str> {
    CHANNEL_NAME_MAP
        .iter()
        .find(|(raw, _)| *raw == label)
        .map(|&(_, name)| name)
}

/// Channel type for a raw label, if the label is known.
pub fn channel_type(label: &str) -> Option<ChannelType> {
    CHANNEL_TYPE_MAP
        .iter()
        .find(|(raw, _)| *raw == label)
        .map(|&(_, kind)| kind)
}

/// Harmonised `(name, type)` of a raw label.
///
/// Unknown labels come back unchanged with no type, meaning "keep whatever
/// the reader assigned".
pub fn harmonize(label: &str) -> (String, Option<ChannelType>) {
    let name = standard_name(label).unwrap_or(label).to_string();
    (name, channel_type(label))
}
