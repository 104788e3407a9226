//! Raw EDF recording: channel metadata, sample decoding and header-patched
//! copies.
//!
//! # Data layout
//! ```text
//! record 0: [sig 0: spr_0 × i16][sig 1: spr_1 × i16] … [sig ns-1]
//! record 1: …
//! ```
//! Samples are little-endian `i16`. Physical values are
//! `gain × digital + offset` with the per-signal calibration from the header.
//!
//! Channel edits (`set_channel_types`, `rename_channels`) only touch the
//! in-memory channel list; [`RawEdf::write_edf`] carries the current names
//! into the written file.
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use ndarray::{s, Array1, Array2};
use regex::Regex;

use super::header::{read_header, EdfHeader, SignalHeader, BYTES_PER_SAMPLE, LABEL_LEN};
use crate::channels::ChannelType;

// ── Channel ───────────────────────────────────────────────────────────────

/// One signal of the recording, as seen after any channel edits.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    /// Current name.
    pub name:     String,
    /// Label as stored in the source file.
    pub label:    String,
    pub kind:     ChannelType,
    /// Physical dimension from the header (`uV`, `mV`, …), possibly empty.
    pub unit:     String,
    pub sfreq:    f64,
    /// High-pass cut-off in Hz parsed from the prefiltering field.
    pub highpass: Option<f64>,
    /// Low-pass cut-off in Hz parsed from the prefiltering field.
    pub lowpass:  Option<f64>,
}

impl Channel {
    fn from_signal(sig: &SignalHeader, record_duration: f64) -> Self {
        Channel {
            name:     sig.label.clone(),
            label:    sig.label.clone(),
            kind:     ChannelType::default(),
            unit:     sig.physical_dimension.clone(),
            sfreq:    sig.sfreq(record_duration),
            highpass: parse_cutoff(&sig.prefiltering, "HP"),
            lowpass:  parse_cutoff(&sig.prefiltering, "LP"),
        }
    }
}

/// Extract `HP:0.5Hz` / `LP:70Hz` style cut-offs.
fn parse_cutoff(prefilter: &str, key: &str) -> Option<f64> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?i)\b(HP|LP):\s*([0-9]*\.?[0-9]+)\s*Hz").expect("static regex")
    });
    re.captures_iter(prefilter)
        .find(|c| c[1].eq_ignore_ascii_case(key))
        .and_then(|c| c[2].parse().ok())
}

// ── RawEdf ────────────────────────────────────────────────────────────────

/// An opened EDF recording. Samples are read lazily from [`RawEdf::path`].
#[derive(Debug, Clone)]
pub struct RawEdf {
    pub header:    EdfHeader,
    pub channels:  Vec<Channel>,
    /// Number of complete data records actually present.
    pub n_records: usize,
    pub path:      PathBuf,
}

impl RawEdf {
    /// Current channel names in file order.
    pub fn ch_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name.as_str()).collect()
    }

    /// Highest per-signal sampling rate (what MNE reports as `sfreq`).
    pub fn sfreq(&self) -> f64 {
        self.channels.iter().map(|c| c.sfreq).fold(0.0, f64::max)
    }

    /// Recording length in seconds.
    #[inline]
    pub fn duration_secs(&self) -> f64 {
        self.n_records as f64 * self.header.record_duration
    }

    /// Number of samples of signal `idx` in the whole file, `None` if there
    /// is no such signal.
    pub fn n_times(&self, idx: usize) -> Option<usize> {
        self.header.signals.get(idx).map(|s| s.samples_per_record * self.n_records)
    }

    /// Acquisition start, if the header's date and time fields are valid.
    ///
    /// Two-digit years follow the EDF clipping rule: 85–99 → 19xx, else 20xx.
    pub fn meas_date(&self) -> Option<NaiveDateTime> {
        let d: Vec<u32> = self.header.start_date.split('.').filter_map(|p| p.parse().ok()).collect();
        let t: Vec<u32> = self.header.start_time.split('.').filter_map(|p| p.parse().ok()).collect();
        let (&[day, month, yy], &[h, m, sec]) = (&d[..], &t[..]) else {
            return None;
        };
        let year = if yy >= 85 { 1900 + yy } else { 2000 + yy };
        let date = NaiveDate::from_ymd_opt(year as i32, month, day)?;
        let time = NaiveTime::from_hms_opt(h, m, sec)?;
        Some(date.and_time(time))
    }

    /// Override channel types for every mapping key present in the recording.
    ///
    /// Keys are matched against current channel names; absent keys are skipped.
    pub fn set_channel_types(&mut self, mapping: &[(&str, ChannelType)]) {
        for ch in &mut self.channels {
            if let Some(&(_, kind)) = mapping.iter().find(|(k, _)| *k == ch.name) {
                ch.kind = kind;
            }
        }
    }

    /// Rename every channel whose current name is a mapping key.
    ///
    /// Fails without modifying anything if the result would contain
    /// duplicate names.
    pub fn rename_channels(&mut self, mapping: &[(&str, &str)]) -> Result<()> {
        let renamed: Vec<String> = self
            .channels
            .iter()
            .map(|ch| {
                mapping
                    .iter()
                    .find(|(k, _)| *k == ch.name)
                    .map_or_else(|| ch.name.clone(), |&(_, v)| v.to_string())
            })
            .collect();

        let mut seen = HashSet::new();
        for name in &renamed {
            if !seen.insert(name.as_str()) {
                bail!("renaming would create duplicate channel name '{name}'");
            }
        }
        for (ch, name) in self.channels.iter_mut().zip(renamed) {
            ch.name = name;
        }
        Ok(())
    }

    /// Decode signal `idx` to physical units.
    pub fn read_signal(&self, idx: usize) -> Result<Array1<f64>> {
        let Some(sig) = self.header.signals.get(idx) else {
            bail!("signal index {idx} out of range ({} signals)", self.header.n_signals());
        };
        let spr = sig.samples_per_record;
        let within = self.header.signals[..idx]
            .iter()
            .map(|s| s.samples_per_record)
            .sum::<usize>()
            * BYTES_PER_SAMPLE;

        let mut reader = self.open()?;
        let mut out = Array1::<f64>::zeros(spr * self.n_records);
        let mut buf = vec![0u8; spr * BYTES_PER_SAMPLE];
        for r in 0..self.n_records {
            reader.seek(SeekFrom::Start(self.record_pos(r) + within as u64))?;
            reader.read_exact(&mut buf)
                .with_context(|| format!("read record {r} of signal {idx}"))?;
            for (k, b) in buf.chunks_exact(BYTES_PER_SAMPLE).enumerate() {
                out[r * spr + k] = sig.to_physical(i16::from_le_bytes([b[0], b[1]]));
            }
        }
        Ok(out)
    }

    /// Read **all** signals into a `[n_chan, n_times]` array in physical units.
    ///
    /// Requires every signal to share the same sampling rate.
    pub fn read_all_data(&self) -> Result<Array2<f64>> {
        let spr = self.uniform_spr()?;
        self.read_records(0, self.n_records, spr)
    }

    /// Read a half-open sample range `[start, end)` of all signals.
    pub fn read_slice(&self, start: usize, end: usize) -> Result<Array2<f64>> {
        let spr = self.uniform_spr()?;
        let n_t = spr * self.n_records;
        if start > end || end > n_t {
            bail!("slice [{start}, {end}) out of range (0..{n_t})");
        }
        if start == end {
            return Ok(Array2::zeros((self.header.n_signals(), 0)));
        }
        let first = start / spr;
        let last = (end - 1) / spr + 1;
        let block = self.read_records(first, last, spr)?;
        let off = first * spr;
        Ok(block.slice(s![.., start - off..end - off]).to_owned())
    }

    /// Copy the recording to `dest` with the current channel names written
    /// into the label slots. Data records are copied byte for byte.
    pub fn write_edf<P: AsRef<Path>>(&self, dest: P) -> Result<()> {
        let dest = dest.as_ref();
        let mut reader = self.open()?;
        let mut head = vec![0u8; self.header.header_bytes];
        reader.read_exact(&mut head).context("read source header")?;

        for (i, ch) in self.channels.iter().enumerate() {
            let pos = EdfHeader::label_pos(i);
            head[pos..pos + LABEL_LEN].copy_from_slice(&encode_label(&ch.name)?);
        }

        let file = File::create(dest).with_context(|| format!("create {}", dest.display()))?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&head)?;
        io::copy(&mut reader, &mut writer)
            .with_context(|| format!("copy data records to {}", dest.display()))?;
        writer.flush()?;
        Ok(())
    }

    // ── internals ─────────────────────────────────────────────────────────

    fn open(&self) -> Result<BufReader<File>> {
        let file = File::open(&self.path)
            .with_context(|| format!("open {}", self.path.display()))?;
        Ok(BufReader::new(file))
    }

    fn record_pos(&self, r: usize) -> u64 {
        (self.header.header_bytes + r * self.header.record_bytes()) as u64
    }

    fn uniform_spr(&self) -> Result<usize> {
        let Some(first) = self.header.signals.first() else {
            bail!("recording has no signals");
        };
        if self.header.signals.iter().any(|s| s.samples_per_record != first.samples_per_record) {
            bail!("signals have different sampling rates; use read_signal()");
        }
        Ok(first.samples_per_record)
    }

    /// Decode records `[first, last)` into `[n_chan, (last-first)·spr]`.
    fn read_records(&self, first: usize, last: usize, spr: usize) -> Result<Array2<f64>> {
        let n_ch = self.header.n_signals();
        let mut out = Array2::<f64>::zeros((n_ch, (last - first) * spr));
        let mut reader = self.open()?;
        reader.seek(SeekFrom::Start(self.record_pos(first)))?;

        let mut buf = vec![0u8; self.header.record_bytes()];
        for r in 0..last - first {
            reader.read_exact(&mut buf)
                .with_context(|| format!("read data record {}", first + r))?;
            for (c, sig) in self.header.signals.iter().enumerate() {
                let base = c * spr * BYTES_PER_SAMPLE;
                for k in 0..spr {
                    let b = &buf[base + k * BYTES_PER_SAMPLE..base + (k + 1) * BYTES_PER_SAMPLE];
                    out[[c, r * spr + k]] = sig.to_physical(i16::from_le_bytes([b[0], b[1]]));
                }
            }
        }
        Ok(out)
    }
}

/// Space-padded 16-byte ASCII label.
fn encode_label(name: &str) -> Result<[u8; LABEL_LEN]> {
    if !name.is_ascii() || name.len() > LABEL_LEN {
        bail!("channel name '{name}' does not fit a {LABEL_LEN}-byte ASCII label");
    }
    let mut slot = [b' '; LABEL_LEN];
    slot[..name.len()].copy_from_slice(name.as_bytes());
    Ok(slot)
}

// ── Reader entry point ────────────────────────────────────────────────────

/// Open an EDF file and parse its header without loading samples.
///
/// Mirrors `mne.io.read_raw_edf(fname, preload=False)`: every channel starts
/// out typed as EEG.
pub fn open_raw<P: AsRef<Path>>(path: P) -> Result<RawEdf> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let file_len = file.metadata()?.len() as usize;
    let mut reader = BufReader::new(file);

    let header = read_header(&mut reader)
        .with_context(|| format!("parse EDF header of {}", path.display()))?;

    let record_bytes = header.record_bytes();
    if record_bytes == 0 {
        bail!("{}: data records are empty", path.display());
    }
    let available = file_len.saturating_sub(header.header_bytes) / record_bytes;
    let n_records = match usize::try_from(header.n_records) {
        Ok(n) if n <= available => n,
        Ok(n) => bail!("{}: header announces {n} records, file holds {available}", path.display()),
        // -1: unknown, take what is on disk
        Err(_) => available,
    };

    let channels = header
        .signals
        .iter()
        .map(|s| Channel::from_signal(s, header.record_duration))
        .collect();

    Ok(RawEdf { header, channels, n_records, path: path.to_path_buf() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutoffs_from_prefilter() {
        assert_eq!(parse_cutoff("HP:0.5Hz LP:70Hz N:60Hz", "HP"), Some(0.5));
        assert_eq!(parse_cutoff("HP:0.5Hz LP:70Hz N:60Hz", "LP"), Some(70.0));
        assert_eq!(parse_cutoff("HP: 1 Hz", "HP"), Some(1.0));
        assert_eq!(parse_cutoff("", "LP"), None);
    }

    #[test]
    fn labels_are_space_padded() {
        assert_eq!(&encode_label("Fp1").unwrap(), b"Fp1             ");
        assert!(encode_label("a-very-long-channel-name").is_err());
        assert!(encode_label("µV").is_err());
    }
}
