//! EDF (European Data Format) reader and writer.
//!
//! Covers what the conversion needs from a format library: header parsing,
//! channel retyping/renaming, sample decoding, and copying a recording with
//! edited labels.
//!
//! # Quick start
//! ```no_run
//! use tuab_bids::edf::open_raw;
//!
//! let raw = open_raw("aaaaamde_s001_t000.edf").unwrap();
//! println!("{} channels @ {} Hz", raw.channels.len(), raw.sfreq());
//! let x = raw.read_signal(0).unwrap();  // [n_times] f64, physical units
//! ```
pub mod header;
pub mod raw;

pub use header::{read_header, EdfHeader, SignalHeader};
pub use raw::{open_raw, Channel, RawEdf};
