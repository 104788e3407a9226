/// Shared helpers: synthetic EDF files and TUAB-shaped source trees.
use std::fs;
use std::path::{Path, PathBuf};

/// Labels used by most synthetic recordings: two mapped EEG electrodes, a
/// stimulus channel, and one label the harmonisation tables do not know.
#[allow(unused)]
pub const LABELS: &[&str] = &["EEG FP1-REF", "EEG T3-REF", "PHOTIC-REF", "EEG XX-REF"];

/// Physical range −3276.8 … 3276.7 µV over the full i16 range → gain 0.1.
#[allow(unused)]
pub const GAIN: f64 = 0.1;

#[allow(unused)]
pub const PREFILTER: &str = "HP:0.5Hz LP:70Hz N:60Hz";

/// Recording parameters for [`edf_bytes`].
#[allow(unused)]
#[derive(Clone)]
pub struct EdfSpec<'a> {
    pub patient:   &'a str,
    pub labels:    &'a [&'a str],
    pub spr:       usize,
    pub n_records: usize,
    /// Written into the header's record-count field; `None` writes the real count.
    pub header_records: Option<i64>,
    pub start_date: &'a str,
}

impl Default for EdfSpec<'_> {
    fn default() -> Self {
        Self {
            patient: "00000021 M 01-JAN-1978 00000021 Age:45",
            labels: LABELS,
            spr: 4,
            n_records: 3,
            header_records: None,
            start_date: "01.01.11",
        }
    }
}

#[allow(unused)]
fn pad(out: &mut Vec<u8>, s: &str, len: usize) {
    let mut field = s.as_bytes().to_vec();
    field.resize(len, b' ');
    out.extend_from_slice(&field[..len]);
}

/// Digital value of sample `k` of record `r` of signal `c`.
#[allow(unused)]
pub fn digital(c: usize, r: usize, k: usize, spr: usize) -> i16 {
    (c as i16) * 1000 + (r * spr + k) as i16
}

/// Build a complete EDF file in memory.
#[allow(unused)]
pub fn edf_bytes(spec: &EdfSpec) -> Vec<u8> {
    let ns = spec.labels.len();
    let mut out = Vec::new();
    pad(&mut out, "0", 8);
    pad(&mut out, spec.patient, 80);
    pad(&mut out, "Startdate 01-JAN-2011 X X X", 80);
    pad(&mut out, spec.start_date, 8);
    pad(&mut out, "12.30.00", 8);
    pad(&mut out, &(256 + ns * 256).to_string(), 8);
    pad(&mut out, "", 44);
    let records = spec.header_records.unwrap_or(spec.n_records as i64);
    pad(&mut out, &records.to_string(), 8);
    pad(&mut out, "1", 8);
    pad(&mut out, &ns.to_string(), 4);

    for l in spec.labels { pad(&mut out, l, 16); }
    for _ in 0..ns { pad(&mut out, "AgAgCl electrode", 80); }
    for _ in 0..ns { pad(&mut out, "uV", 8); }
    for _ in 0..ns { pad(&mut out, "-3276.8", 8); }
    for _ in 0..ns { pad(&mut out, "3276.7", 8); }
    for _ in 0..ns { pad(&mut out, "-32768", 8); }
    for _ in 0..ns { pad(&mut out, "32767", 8); }
    for _ in 0..ns { pad(&mut out, PREFILTER, 80); }
    for _ in 0..ns { pad(&mut out, &spec.spr.to_string(), 8); }
    for _ in 0..ns { pad(&mut out, "", 32); }
    assert_eq!(out.len(), 256 + ns * 256);

    for r in 0..spec.n_records {
        for c in 0..ns {
            for k in 0..spec.spr {
                out.extend_from_slice(&digital(c, r, k, spec.spr).to_le_bytes());
            }
        }
    }
    out
}

/// Write an EDF file, creating parent directories.
#[allow(unused)]
pub fn write_edf(path: &Path, spec: &EdfSpec) -> PathBuf {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, edf_bytes(spec)).unwrap();
    path.to_path_buf()
}

/// Write a recording at `<root>/<split>/<normality>/01_tcp_ar/<name>`.
#[allow(unused)]
pub fn add_recording(root: &Path, split: &str, normality: &str, name: &str, patient: &str) -> PathBuf {
    let path = root.join(split).join(normality).join("01_tcp_ar").join(name);
    write_edf(&path, &EdfSpec { patient, ..EdfSpec::default() })
}
