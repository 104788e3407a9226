//! BIDS dataset output: entity paths, TSV tables and the per-recording writer.
pub mod path;
pub mod table;
pub mod writer;

pub use path::BidsPath;
pub use table::{TsvTable, NA};
pub use writer::{write_raw_bids, WriteOptions};
