//! EDF header records.
//!
//! On-disk layout (ASCII, space padded, no terminators):
//!
//! ```text
//! ┌──────────────────────── main header, 256 bytes ─────────────────────────┐
//! │ 8 version │ 80 patient │ 80 recording │ 8 startdate │ 8 starttime │      │
//! │ 8 header bytes │ 44 reserved │ 8 n_records │ 8 duration │ 4 ns       │
//! ├──────────────────────── signal headers, ns × 256 bytes ─────────────────┤
//! │ ns×16 label │ ns×80 transducer │ ns×8 phys dim │ ns×8 phys min │ …     │
//! │ … ns×8 phys max │ ns×8 dig min │ ns×8 dig max │ ns×80 prefilter │       │
//! │ ns×8 samples/record │ ns×32 reserved                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Fields are stored column-wise: all labels first, then all transducers, …
use std::io::Read;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// Length of the fixed main header.
pub const MAIN_HEADER_LEN: usize = 256;
/// Length of one signal's share of the signal header block.
pub const SIGNAL_HEADER_LEN: usize = 256;
/// Width of the per-signal label field.
pub const LABEL_LEN: usize = 16;
/// Bytes per sample in the data records (little-endian `i16`).
pub const BYTES_PER_SAMPLE: usize = 2;

/// Per-signal header.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalHeader {
    pub label:              String,
    pub transducer:         String,
    pub physical_dimension: String,
    pub physical_min:       f64,
    pub physical_max:       f64,
    pub digital_min:        i32,
    pub digital_max:        i32,
    pub prefiltering:       String,
    pub samples_per_record: usize,
    pub reserved:           String,
}

impl SignalHeader {
    /// Physical units per digital step.
    #[inline]
    pub fn gain(&self) -> f64 {
        (self.physical_max - self.physical_min) / (self.digital_max - self.digital_min) as f64
    }

    /// Physical value of digital zero.
    #[inline]
    pub fn offset(&self) -> f64 {
        self.physical_max - self.gain() * self.digital_max as f64
    }

    /// Convert one digital sample to physical units.
    #[inline]
    pub fn to_physical(&self, digital: i16) -> f64 {
        self.gain() * digital as f64 + self.offset()
    }

    /// Sampling rate in Hz for a given data-record duration.
    #[inline]
    pub fn sfreq(&self, record_duration: f64) -> f64 {
        self.samples_per_record as f64 / record_duration
    }
}

/// Main header plus all signal headers.
#[derive(Debug, Clone, PartialEq)]
pub struct EdfHeader {
    pub version:         String,
    pub patient_id:      String,
    pub recording_id:    String,
    pub start_date:      String,
    pub start_time:      String,
    pub header_bytes:    usize,
    pub reserved:        String,
    /// `-1` when the writer did not know the count.
    pub n_records:       i64,
    /// Seconds per data record.
    pub record_duration: f64,
    pub signals:         Vec<SignalHeader>,
}

impl EdfHeader {
    #[inline]
    pub fn n_signals(&self) -> usize {
        self.signals.len()
    }

    /// Size of one data record in bytes.
    pub fn record_bytes(&self) -> usize {
        self.signals.iter().map(|s| s.samples_per_record).sum::<usize>() * BYTES_PER_SAMPLE
    }

    /// Byte offset of signal `idx`'s label slot.
    #[inline]
    pub fn label_pos(idx: usize) -> usize {
        MAIN_HEADER_LEN + idx * LABEL_LEN
    }
}

/// Read and parse the full header (main + signal block) from `reader`,
/// which must be positioned at byte 0.
pub fn read_header<R: Read>(reader: &mut R) -> Result<EdfHeader> {
    let version      = read_field(reader, 8)?;
    let patient_id   = read_field(reader, 80)?;
    let recording_id = read_field(reader, 80)?;
    let start_date   = read_field(reader, 8)?;
    let start_time   = read_field(reader, 8)?;
    let header_bytes: usize = read_number(reader, 8, "header bytes")?;
    let reserved     = read_field(reader, 44)?;
    let n_records: i64 = read_number(reader, 8, "number of data records")?;
    let record_duration: f64 = read_number(reader, 8, "data record duration")?;
    let ns: usize = read_number(reader, 4, "number of signals")?;

    if header_bytes != MAIN_HEADER_LEN + ns * SIGNAL_HEADER_LEN {
        bail!(
            "header size {header_bytes} does not match {ns} signals (expected {})",
            MAIN_HEADER_LEN + ns * SIGNAL_HEADER_LEN
        );
    }
    if record_duration <= 0.0 {
        bail!("non-positive data record duration {record_duration}");
    }

    let labels       = read_fields(reader, ns, 16)?;
    let transducers  = read_fields(reader, ns, 80)?;
    let dims         = read_fields(reader, ns, 8)?;
    let phys_min     = read_numbers::<_, f64>(reader, ns, "physical minimum")?;
    let phys_max     = read_numbers::<_, f64>(reader, ns, "physical maximum")?;
    let dig_min      = read_numbers::<_, i32>(reader, ns, "digital minimum")?;
    let dig_max      = read_numbers::<_, i32>(reader, ns, "digital maximum")?;
    let prefilters   = read_fields(reader, ns, 80)?;
    let spr          = read_numbers::<_, usize>(reader, ns, "samples per record")?;
    let reserveds    = read_fields(reader, ns, 32)?;

    let mut signals = Vec::with_capacity(ns);
    for i in 0..ns {
        if dig_max[i] <= dig_min[i] {
            bail!("signal '{}': digital maximum {} <= minimum {}", labels[i], dig_max[i], dig_min[i]);
        }
        signals.push(SignalHeader {
            label:              labels[i].clone(),
            transducer:         transducers[i].clone(),
            physical_dimension: dims[i].clone(),
            physical_min:       phys_min[i],
            physical_max:       phys_max[i],
            digital_min:        dig_min[i],
            digital_max:        dig_max[i],
            prefiltering:       prefilters[i].clone(),
            samples_per_record: spr[i],
            reserved:           reserveds[i].clone(),
        });
    }

    log::debug!("EDF header: {ns} signals, {n_records} records of {record_duration} s");

    Ok(EdfHeader {
        version,
        patient_id,
        recording_id,
        start_date,
        start_time,
        header_bytes,
        reserved,
        n_records,
        record_duration,
        signals,
    })
}

// ── Field helpers ─────────────────────────────────────────────────────────

/// Read `len` bytes as Latin-1 and trim the padding.
fn read_field<R: Read>(reader: &mut R, len: usize) -> Result<String> {
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).context("truncated EDF header")?;
    Ok(buf.iter().map(|&b| b as char).collect::<String>().trim().to_string())
}

fn read_fields<R: Read>(reader: &mut R, n: usize, len: usize) -> Result<Vec<String>> {
    (0..n).map(|_| read_field(reader, len)).collect()
}

fn read_number<R: Read, T>(reader: &mut R, len: usize, what: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let s = read_field(reader, len)?;
    s.parse::<T>().with_context(|| format!("invalid {what} '{s}'"))
}

fn read_numbers<R: Read, T>(reader: &mut R, n: usize, what: &str) -> Result<Vec<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    (0..n).map(|_| read_number(reader, 8, what)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(dmin: i32, dmax: i32, pmin: f64, pmax: f64) -> SignalHeader {
        SignalHeader {
            label: "EEG FP1-REF".into(),
            transducer: String::new(),
            physical_dimension: "uV".into(),
            physical_min: pmin,
            physical_max: pmax,
            digital_min: dmin,
            digital_max: dmax,
            prefiltering: String::new(),
            samples_per_record: 250,
            reserved: String::new(),
        }
    }

    #[test]
    fn symmetric_calibration_has_zero_offset() {
        let s = signal(-32768, 32767, -32768.0, 32767.0);
        approx::assert_abs_diff_eq!(s.gain(), 1.0, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(s.offset(), 0.0, epsilon = 1e-9);
        approx::assert_abs_diff_eq!(s.to_physical(-5), -5.0, epsilon = 1e-9);
    }

    #[test]
    fn asymmetric_calibration_maps_extremes() {
        let s = signal(-2048, 2047, -500.0, 500.0);
        approx::assert_abs_diff_eq!(s.to_physical(-2048), -500.0, epsilon = 1e-9);
        approx::assert_abs_diff_eq!(s.to_physical(2047), 500.0, epsilon = 1e-9);
    }

    #[test]
    fn truncated_header_is_an_error() {
        let bytes = vec![b' '; 100];
        assert!(read_header(&mut &bytes[..]).is_err());
    }
}
