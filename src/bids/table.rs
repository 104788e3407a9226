//! Tab-separated tables (`participants.tsv`, `*_scans.tsv`, …).
//!
//! A [`TsvTable`] is an ordered list of column names plus string rows, read
//! and written with the `csv` crate. Missing values are spelled [`NA`].
//! Lookups are by exact string match on a key column, which is how
//! `participant_id` and `filename` rows are addressed.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, WriterBuilder};

/// Null marker used by BIDS tables.
pub const NA: &str = "n/a";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TsvTable {
    columns: Vec<String>,
    rows:    Vec<Vec<String>>,
}

impl TsvTable {
    /// Empty table with the given header.
    pub fn new(columns: &[&str]) -> Self {
        Self { columns: columns.iter().map(|c| c.to_string()).collect(), rows: Vec::new() }
    }

    /// Read a table with a header row.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_path(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.with_context(|| format!("malformed row in {}", path.display()))?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(Self { columns, rows })
    }

    /// Read `path` if it exists, otherwise start an empty table.
    pub fn read_or_new<P: AsRef<Path>>(path: P, columns: &[&str]) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() { Self::read(path) } else { Ok(Self::new(columns)) }
    }

    /// Write the whole table. The file is replaced atomically via a sibling
    /// `<name>.tmp`, which is removed again if anything fails.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let result = self
            .write_records(&tmp)
            .and_then(|()| {
                fs::rename(&tmp, path)
                    .with_context(|| format!("failed to replace {}", path.display()))
            });
        if result.is_err() && tmp.exists() {
            if let Err(e) = fs::remove_file(&tmp) {
                log::warn!("could not remove {}: {e}", tmp.display());
            }
        }
        result
    }

    fn write_records(&self, dest: &Path) -> Result<()> {
        let mut writer = WriterBuilder::new()
            .delimiter(b'\t')
            .from_path(dest)
            .with_context(|| format!("failed to create {}", dest.display()))?;
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .with_context(|| format!("table has no '{name}' column"))
    }

    /// All values of a column, in row order.
    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let c = self.require_column(name)?;
        Ok(self.rows.iter().map(|r| r[c].as_str()).collect())
    }

    /// Append a column filled with `default` unless it already exists.
    pub fn ensure_column(&mut self, name: &str, default: &str) {
        if self.column_index(name).is_none() {
            self.columns.push(name.to_string());
            for row in &mut self.rows {
                row.push(default.to_string());
            }
        }
    }

    /// Cell at `(row, column)`.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let c = self.column_index(column)?;
        self.rows.get(row).map(|r| r[c].as_str())
    }

    pub fn set(&mut self, row: usize, column: &str, value: &str) -> Result<()> {
        let c = self.require_column(column)?;
        let Some(r) = self.rows.get_mut(row) else {
            bail!("row {row} out of range ({} rows)", self.rows.len());
        };
        r[c] = value.to_string();
        Ok(())
    }

    /// Indices of rows whose `key_column` equals `key`.
    pub fn find_rows(&self, key_column: &str, key: &str) -> Vec<usize> {
        match self.column_index(key_column) {
            Some(c) => (0..self.rows.len()).filter(|&i| self.rows[i][c] == key).collect(),
            None => Vec::new(),
        }
    }

    /// Set `column` to `value` in every row where `key_column == key`.
    ///
    /// A missing `column` is created first and filled with [`NA`].
    /// Returns the number of rows updated.
    pub fn set_where(&mut self, key_column: &str, key: &str, column: &str, value: &str) -> Result<usize> {
        let k = self.require_column(key_column)?;
        self.ensure_column(column, NA);
        let c = self.require_column(column)?;
        let mut n = 0;
        for row in self.rows.iter_mut().filter(|r| r[k] == key) {
            row[c] = value.to_string();
            n += 1;
        }
        Ok(n)
    }

    /// Append a row given as `(column, value)` pairs; unnamed columns get [`NA`].
    pub fn push_row(&mut self, values: &[(&str, &str)]) -> Result<()> {
        let mut row = vec![NA.to_string(); self.columns.len()];
        for &(column, value) in values {
            let c = self.require_column(column)?;
            row[c] = value.to_string();
        }
        self.rows.push(row);
        Ok(())
    }

    /// Drop every row where `key_column == key`; returns how many were removed.
    pub fn remove_where(&mut self, key_column: &str, key: &str) -> usize {
        let Some(c) = self.column_index(key_column) else { return 0 };
        let before = self.rows.len();
        self.rows.retain(|r| r[c] != key);
        before - self.rows.len()
    }
}
