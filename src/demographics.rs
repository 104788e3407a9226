//! Subject age and sex from the EDF patient-identification field.
//!
//! TUAB fills the 80-byte patient field (bytes 8..88 of the file) with a
//! free-form string such as
//!
//! ```text
//! 00000021 M 01-JAN-1978 00000021 Age:45
//! ```
//!
//! Age is the digit run after `Age:`; sex is a lone `M` or `F` between
//! whitespace. Either may be missing, which is not an error. A file shorter
//! than 88 bytes or a field that is not valid UTF-8 is.
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;

/// Bytes preceding the patient field (the EDF version string).
pub const PATIENT_FIELD_OFFSET: u64 = 8;
/// Length of the patient field.
pub const PATIENT_FIELD_LEN: usize = 80;

/// What the patient field tells us about the subject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Demographics {
    pub age: Option<u32>,
    pub sex: Option<char>,
}

fn age_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Age:(\d+)").expect("static regex"))
}

fn sex_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s([MF])\s").expect("static regex"))
}

/// Read the patient field of `path` and parse it.
pub fn extract_demographics<P: AsRef<Path>>(path: P) -> Result<Demographics> {
    let path = path.as_ref();
    let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    file.seek(SeekFrom::Start(PATIENT_FIELD_OFFSET))?;

    let mut buf = [0u8; PATIENT_FIELD_LEN];
    file.read_exact(&mut buf)
        .with_context(|| format!("read patient field of {}", path.display()))?;
    let field = std::str::from_utf8(&buf)
        .with_context(|| format!("patient field of {} is not UTF-8", path.display()))?;

    Ok(parse_demographics(field))
}

/// Parse an already decoded patient field.
///
/// A digit run too long for `u32` saturates to `u32::MAX`; curation treats
/// it like any other implausible age.
pub fn parse_demographics(field: &str) -> Demographics {
    let age = age_re()
        .captures(field)
        .map(|caps| caps[1].parse::<u32>().unwrap_or(u32::MAX));
    let sex = sex_re()
        .captures(field)
        .and_then(|caps| caps[1].chars().next());
    Demographics { age, sex }
}
