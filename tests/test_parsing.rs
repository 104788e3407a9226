mod common;
use common::{write_edf, EdfSpec};
use std::fs;
use std::path::Path;
use tuab_bids::{
    extract_demographics, parse_recording_path, Demographics, Normality, OfficialSplit, PathError,
};

#[test]
fn tuab_path_decomposes() {
    let root = Path::new("/data/edf");
    let file = root.join("train/normal/01_tcp_ar/00000021_s001_t001.edf");
    let rec = parse_recording_path(root, &file).unwrap();
    assert_eq!(rec.split, OfficialSplit::Train);
    assert_eq!(rec.normality, Normality::Normal);
    assert_eq!(rec.subject, "00000021");
    assert_eq!(rec.session, "001");
    assert_eq!(rec.run, "001");
}

#[test]
fn relative_root_works() {
    let root = Path::new("sourcedata/v3.0.1/edf");
    let file = root.join("eval/abnormal/01_tcp_ar/aaaaamde_s002_t000.edf");
    let rec = parse_recording_path(root, &file).unwrap();
    assert_eq!(rec.split, OfficialSplit::Eval);
    assert_eq!(rec.normality, Normality::Abnormal);
    assert_eq!((rec.session.as_str(), rec.run.as_str()), ("002", "000"));
}

#[test]
fn wrong_depth_is_rejected() {
    let root = Path::new("/data/edf");
    let file = root.join("train/normal/00000021_s001_t001.edf");
    assert!(matches!(
        parse_recording_path(root, &file),
        Err(PathError::ComponentCount { count: 3, .. })
    ));
}

#[test]
fn two_token_file_name_is_rejected() {
    let root = Path::new("/data/edf");
    let file = root.join("train/normal/01_tcp_ar/00000021_s001.edf");
    assert!(matches!(parse_recording_path(root, &file), Err(PathError::FileName { .. })));
}

#[test]
fn unknown_labels_are_rejected() {
    let root = Path::new("/data/edf");
    let file = root.join("dev/normal/01_tcp_ar/a_s001_t000.edf");
    assert_eq!(parse_recording_path(root, &file), Err(PathError::Split("dev".into())));
    let file = root.join("train/borderline/01_tcp_ar/a_s001_t000.edf");
    assert_eq!(parse_recording_path(root, &file), Err(PathError::Normality("borderline".into())));
}

#[test]
fn path_outside_root_is_rejected() {
    let err = parse_recording_path(Path::new("/data/edf"), Path::new("/other/a_s1_t1.edf"));
    assert!(matches!(err, Err(PathError::OutsideRoot { .. })));
}

#[test]
fn demographics_from_file_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_edf(&dir.path().join("a.edf"), &EdfSpec::default());
    let d = extract_demographics(&path).unwrap();
    assert_eq!(d, Demographics { age: Some(45), sex: Some('M') });
}

#[test]
fn demographics_absent_fields_are_none() {
    let dir = tempfile::tempdir().unwrap();
    let spec = EdfSpec { patient: "X X X X", ..EdfSpec::default() };
    let path = write_edf(&dir.path().join("a.edf"), &spec);
    assert_eq!(extract_demographics(&path).unwrap(), Demographics::default());
}

#[test]
fn short_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.edf");
    fs::write(&path, b"0       Age:45 M ").unwrap();
    assert!(extract_demographics(&path).is_err());
}

#[test]
fn non_utf8_patient_field_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_edf(&dir.path().join("a.edf"), &EdfSpec::default());
    let mut bytes = fs::read(&path).unwrap();
    bytes[20] = 0xFF;
    fs::write(&path, bytes).unwrap();
    assert!(extract_demographics(&path).is_err());
}
