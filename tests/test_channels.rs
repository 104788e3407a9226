mod common;
use common::{write_edf, EdfSpec};
use tuab_bids::{
    channel_type, harmonize, open_raw, standard_name, ChannelType, CHANNEL_NAME_MAP,
    CHANNEL_TYPE_MAP,
};

#[test]
fn every_mapped_label_harmonizes_to_table_values() {
    for &(raw, name) in CHANNEL_NAME_MAP {
        let (got_name, got_type) = harmonize(raw);
        assert_eq!(got_name, name, "name of {raw}");
        assert_eq!(got_type, channel_type(raw), "type of {raw}");
        assert!(got_type.is_some(), "{raw} has no type");
    }
}

#[test]
fn unknown_label_is_unchanged() {
    assert_eq!(harmonize("EEG XX-REF"), ("EEG XX-REF".to_string(), None));
    assert_eq!(standard_name(""), None);
}

#[test]
fn non_eeg_types() {
    assert_eq!(channel_type("ECG EKG-REF"), Some(ChannelType::Ecg));
    assert_eq!(channel_type("EEG EKG1-REF"), Some(ChannelType::Ecg));
    assert_eq!(channel_type("EMG-REF"), Some(ChannelType::Emg));
    assert_eq!(channel_type("EEG LOC-REF"), Some(ChannelType::Eog));
    assert_eq!(channel_type("EEG ROC-REF"), Some(ChannelType::Eog));
    assert_eq!(channel_type("PHOTIC-REF"), Some(ChannelType::Stim));
    assert_eq!(channel_type("PULSE RATE"), Some(ChannelType::Misc));
    assert_eq!(standard_name("PULSE RATE"), Some("PULSE"));
}

#[test]
fn recording_channels_follow_the_tables() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_edf(&dir.path().join("a.edf"), &EdfSpec::default());
    let mut raw = open_raw(&path).unwrap();

    raw.set_channel_types(CHANNEL_TYPE_MAP);
    raw.rename_channels(CHANNEL_NAME_MAP).unwrap();

    let got: Vec<(&str, ChannelType)> =
        raw.channels.iter().map(|c| (c.name.as_str(), c.kind)).collect();
    assert_eq!(got, vec![
        ("Fp1", ChannelType::Eeg),
        ("T7", ChannelType::Eeg),
        ("PHOTIC", ChannelType::Stim),
        ("EEG XX-REF", ChannelType::Eeg),
    ]);
    // The source label is kept for reference.
    assert_eq!(raw.channels[1].label, "EEG T3-REF");
}

#[test]
fn colliding_renames_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let labels = ["ECG EKG-REF", "EEG EKG1-REF"];
    let spec = EdfSpec { labels: &labels, ..EdfSpec::default() };
    let path = write_edf(&dir.path().join("a.edf"), &spec);
    let mut raw = open_raw(&path).unwrap();

    assert!(raw.rename_channels(CHANNEL_NAME_MAP).is_err());
    assert_eq!(raw.ch_names(), labels.to_vec(), "failed rename must not modify channels");
}
