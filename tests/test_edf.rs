mod common;
use common::{digital, edf_bytes, write_edf, EdfSpec, GAIN, LABELS};
use approx::assert_abs_diff_eq;
use std::fs;
use tuab_bids::edf::{open_raw, read_header};
use tuab_bids::ChannelType;

#[test]
fn header_fields_parse() {
    let bytes = edf_bytes(&EdfSpec::default());
    let h = read_header(&mut &bytes[..]).unwrap();
    assert_eq!(h.n_signals(), 4);
    assert_eq!(h.header_bytes, 256 + 4 * 256);
    assert_eq!(h.n_records, 3);
    assert_eq!(h.signals[2].label, "PHOTIC-REF");
    assert_eq!(h.signals[0].physical_dimension, "uV");
    assert_eq!(h.record_bytes(), 4 * 4 * 2);
}

#[test]
fn open_raw_channels_default_to_eeg() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_edf(&dir.path().join("a.edf"), &EdfSpec::default());
    let raw = open_raw(&path).unwrap();

    assert_eq!(raw.ch_names(), LABELS.to_vec());
    assert!(raw.channels.iter().all(|c| c.kind == ChannelType::Eeg));
    assert_abs_diff_eq!(raw.sfreq(), 4.0, epsilon = 1e-12);
    assert_abs_diff_eq!(raw.duration_secs(), 3.0, epsilon = 1e-12);
    assert_eq!(raw.channels[0].highpass, Some(0.5));
    assert_eq!(raw.channels[0].lowpass, Some(70.0));
}

#[test]
fn read_all_data_applies_calibration() {
    let dir = tempfile::tempdir().unwrap();
    let spec = EdfSpec::default();
    let path = write_edf(&dir.path().join("a.edf"), &spec);
    let raw = open_raw(&path).unwrap();

    let data = raw.read_all_data().unwrap();
    assert_eq!(data.shape(), &[4, 12]);
    for c in 0..4 {
        for r in 0..spec.n_records {
            for k in 0..spec.spr {
                let expected = digital(c, r, k, spec.spr) as f64 * GAIN;
                assert_abs_diff_eq!(data[[c, r * spec.spr + k]], expected, epsilon = 1e-6);
            }
        }
    }
}

#[test]
fn read_signal_matches_read_all_data_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_edf(&dir.path().join("a.edf"), &EdfSpec::default());
    let raw = open_raw(&path).unwrap();

    let all = raw.read_all_data().unwrap();
    let sig = raw.read_signal(2).unwrap();
    assert_eq!(Some(sig.len()), raw.n_times(2));
    for (a, b) in sig.iter().zip(all.row(2).iter()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
    }
    assert!(raw.read_signal(9).is_err());
    assert_eq!(raw.n_times(9), None);
}

#[test]
fn read_slice_crosses_record_boundaries() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_edf(&dir.path().join("a.edf"), &EdfSpec::default());
    let raw = open_raw(&path).unwrap();

    let all = raw.read_all_data().unwrap();
    let part = raw.read_slice(3, 9).unwrap();
    assert_eq!(part.shape(), &[4, 6]);
    for c in 0..4 {
        for t in 0..6 {
            assert_abs_diff_eq!(part[[c, t]], all[[c, t + 3]], epsilon = 1e-12);
        }
    }
    assert!(raw.read_slice(0, 13).is_err());
    assert_eq!(raw.read_slice(5, 5).unwrap().shape(), &[4, 0]);
}

#[test]
fn unknown_record_count_is_taken_from_file_size() {
    let dir = tempfile::tempdir().unwrap();
    let spec = EdfSpec { header_records: Some(-1), ..EdfSpec::default() };
    let path = write_edf(&dir.path().join("a.edf"), &spec);
    let raw = open_raw(&path).unwrap();
    assert_eq!(raw.n_records, 3);
}

#[test]
fn overstated_record_count_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let spec = EdfSpec { header_records: Some(10), ..EdfSpec::default() };
    let path = write_edf(&dir.path().join("a.edf"), &spec);
    assert!(open_raw(&path).is_err());
}

#[test]
fn meas_date_uses_edf_year_clipping() {
    let dir = tempfile::tempdir().unwrap();

    let path = write_edf(&dir.path().join("a.edf"), &EdfSpec::default());
    let t = open_raw(&path).unwrap().meas_date().unwrap();
    assert_eq!(t.format("%Y-%m-%d %H:%M:%S").to_string(), "2011-01-01 12:30:00");

    let spec = EdfSpec { start_date: "24.12.99", ..EdfSpec::default() };
    let path = write_edf(&dir.path().join("b.edf"), &spec);
    let t = open_raw(&path).unwrap().meas_date().unwrap();
    assert_eq!(t.format("%Y-%m-%d").to_string(), "1999-12-24");

    let spec = EdfSpec { start_date: "xx.yy.zz", ..EdfSpec::default() };
    let path = write_edf(&dir.path().join("c.edf"), &spec);
    assert!(open_raw(&path).unwrap().meas_date().is_none());
}

#[test]
fn write_edf_patches_labels_and_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_edf(&dir.path().join("src.edf"), &EdfSpec::default());
    let mut raw = open_raw(&src).unwrap();
    raw.rename_channels(&[("EEG FP1-REF", "Fp1"), ("EEG T3-REF", "T7")]).unwrap();

    let dst = dir.path().join("dst.edf");
    raw.write_edf(&dst).unwrap();

    let copy = open_raw(&dst).unwrap();
    assert_eq!(copy.ch_names(), vec!["Fp1", "T7", "PHOTIC-REF", "EEG XX-REF"]);

    let a = fs::read(&src).unwrap();
    let b = fs::read(&dst).unwrap();
    assert_eq!(a.len(), b.len());
    let header_bytes = raw.header.header_bytes;
    assert_eq!(a[header_bytes..], b[header_bytes..], "data records changed");
    // Everything outside the label slots is untouched.
    assert_eq!(a[..256], b[..256]);
    assert_eq!(a[256 + 4 * 16..header_bytes], b[256 + 4 * 16..header_bytes]);
}
