//! Reproducible train / validation / test assignment.
//!
//! * official `eval` subjects → `test`;
//! * official `train` subjects form the pool; `round_half_even(fraction × n)`
//!   of them, drawn uniformly without replacement, become `val`;
//! * the rest of the pool → `train`;
//! * anything else (e.g. a subject whose recordings all failed) → `none`.
//!
//! The pool is sorted by participant id before sampling and the RNG is
//! seeded, so the same subject set and seed always give the same partition.
use std::collections::BTreeSet;
use std::fmt;

use anyhow::{ensure, Result};
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;

use crate::bids::TsvTable;
use crate::path::OfficialSplit;

/// Name of the column written by [`apply_splits`].
pub const SPLIT_COLUMN: &str = "train_val_test_split";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetSplit {
    Train,
    Val,
    Test,
    None,
}

impl DatasetSplit {
    pub fn as_str(self) -> &'static str {
        match self {
            DatasetSplit::Train => "train",
            DatasetSplit::Val => "val",
            DatasetSplit::Test => "test",
            DatasetSplit::None => "none",
        }
    }
}

impl fmt::Display for DatasetSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Participant ids per split.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitAssignment {
    pub train: BTreeSet<String>,
    pub val:   BTreeSet<String>,
    pub test:  BTreeSet<String>,
}

impl SplitAssignment {
    pub fn split_of(&self, participant_id: &str) -> DatasetSplit {
        if self.test.contains(participant_id) {
            DatasetSplit::Test
        } else if self.val.contains(participant_id) {
            DatasetSplit::Val
        } else if self.train.contains(participant_id) {
            DatasetSplit::Train
        } else {
            DatasetSplit::None
        }
    }
}

/// Number of validation subjects for a pool of `n`.
///
/// Ties round to even, so `0.1 × 25 = 2.5 → 2`.
pub fn validation_size(n: usize, fraction: f64) -> usize {
    ((fraction * n as f64).round_ties_even() as usize).min(n)
}

/// Partition participants using the table's `official_split` column.
///
/// Fails if a participant is listed under both official splits, which
/// means the source corpus itself is inconsistent.
pub fn assign_splits(table: &TsvTable, fraction: f64, seed: u64) -> Result<SplitAssignment> {
    ensure!((0.0..=1.0).contains(&fraction), "validation fraction {fraction} outside [0, 1]");

    let ids = table.column("participant_id")?;
    let official = table.column("official_split")?;

    let mut test = BTreeSet::new();
    let mut pool = BTreeSet::new();
    for (id, split) in ids.into_iter().zip(official) {
        match split.parse::<OfficialSplit>() {
            Ok(OfficialSplit::Eval) => { test.insert(id.to_string()); }
            Ok(OfficialSplit::Train) => { pool.insert(id.to_string()); }
            Err(_) => {}
        }
    }
    ensure!(
        test.is_disjoint(&pool),
        "participants in both official splits: {:?}",
        test.intersection(&pool).collect::<Vec<_>>()
    );

    let pool: Vec<String> = pool.into_iter().collect();
    let n_val = validation_size(pool.len(), fraction);
    let mut rng = StdRng::seed_from_u64(seed);
    let picked: BTreeSet<usize> = sample(&mut rng, pool.len(), n_val).into_iter().collect();

    let mut val = BTreeSet::new();
    let mut train = BTreeSet::new();
    for (i, id) in pool.into_iter().enumerate() {
        if picked.contains(&i) { val.insert(id); } else { train.insert(id); }
    }
    ensure!(val.is_disjoint(&train), "validation and train overlap");

    log::info!("split: {} train, {} val, {} test", train.len(), val.len(), test.len());
    Ok(SplitAssignment { train, val, test })
}

/// Write the `train_val_test_split` column.
pub fn apply_splits(table: &mut TsvTable, assignment: &SplitAssignment) -> Result<()> {
    table.ensure_column(SPLIT_COLUMN, DatasetSplit::None.as_str());
    let ids: Vec<String> = table.column("participant_id")?.into_iter().map(str::to_string).collect();
    for (row, id) in ids.iter().enumerate() {
        table.set(row, SPLIT_COLUMN, assignment.split_of(id).as_str())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_size_rounds_half_to_even() {
        assert_eq!(validation_size(25, 0.1), 2);
        assert_eq!(validation_size(35, 0.1), 4);
        assert_eq!(validation_size(10, 0.1), 1);
        assert_eq!(validation_size(4, 0.1), 0);
        assert_eq!(validation_size(0, 0.1), 0);
    }

    #[test]
    fn unassigned_is_none() {
        let a = SplitAssignment::default();
        assert_eq!(a.split_of("sub-x"), DatasetSplit::None);
    }
}
