//! Tabulated star-formation histories.
//!
//! The `custom` SFH shape takes its rates from a two-column (age, SFR)
//! table, supplied inline or loaded from a text file. Rows may arrive in
//! any order; construction sorts by age and rejects anything that would
//! poison later interpolation (duplicates, non-finite values, ragged rows).

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// Errors raised while building or loading a tabulated history.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: expected two numeric columns, found {found}")]
    ColumnCount { line: usize, found: usize },
    #[error("line {line}: could not parse '{value}' as a number")]
    Parse { line: usize, value: String },
    #[error("table is empty")]
    Empty,
    #[error("table lengths differ: {ages} ages vs {sfrs} rates")]
    MismatchedLengths { ages: usize, sfrs: usize },
    #[error("table row {row} contains a non-finite value")]
    NonFinite { row: usize },
    #[error("table lists age {age} yr more than once")]
    DuplicateAge { age: f64 },
}

/// Two-column (age, SFR) table backing the custom SFH shape.
///
/// Ages are years, rates are solar masses per year. The columns are kept
/// sorted by age so interpolation can run directly on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct SfhTable {
    ages: Vec<f64>,
    sfrs: Vec<f64>,
}

/// Unvalidated mirror of [`SfhTable`] used during deserialization.
#[derive(Deserialize)]
struct RawTable {
    ages: Vec<f64>,
    sfrs: Vec<f64>,
}

impl TryFrom<RawTable> for SfhTable {
    type Error = TableError;

    fn try_from(raw: RawTable) -> Result<Self, TableError> {
        SfhTable::new(raw.ages, raw.sfrs)
    }
}

impl SfhTable {
    /// Build a table from parallel age and SFR columns.
    pub fn new(ages: Vec<f64>, sfrs: Vec<f64>) -> Result<Self, TableError> {
        if ages.len() != sfrs.len() {
            return Err(TableError::MismatchedLengths {
                ages: ages.len(),
                sfrs: sfrs.len(),
            });
        }
        if ages.is_empty() {
            return Err(TableError::Empty);
        }
        for (row, (&age, &sfr)) in ages.iter().zip(&sfrs).enumerate() {
            if !age.is_finite() || !sfr.is_finite() {
                return Err(TableError::NonFinite { row });
            }
        }

        let mut rows: Vec<(f64, f64)> = ages.into_iter().zip(sfrs).collect();
        rows.sort_by(|a, b| a.0.total_cmp(&b.0));
        for pair in rows.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(TableError::DuplicateAge { age: pair[0].0 });
            }
        }

        let (ages, sfrs) = rows.into_iter().unzip();
        Ok(Self { ages, sfrs })
    }

    /// Load from a whitespace-separated two-column text file.
    ///
    /// Blank lines and lines starting with `#` are skipped; everything else
    /// must parse as exactly two numbers per line.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let open_err = |source| TableError::Io {
            path: path.display().to_string(),
            source,
        };
        let file = File::open(path).map_err(open_err)?;
        let reader = BufReader::new(file);

        let mut ages = Vec::new();
        let mut sfrs = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| TableError::Io {
                path: path.display().to_string(),
                source,
            })?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = trimmed.split_whitespace().collect();
            if fields.len() != 2 {
                return Err(TableError::ColumnCount {
                    line: index + 1,
                    found: fields.len(),
                });
            }

            let mut row = [0.0f64; 2];
            for (slot, field) in row.iter_mut().zip(&fields) {
                *slot = field.parse().map_err(|_| TableError::Parse {
                    line: index + 1,
                    value: field.to_string(),
                })?;
            }
            ages.push(row[0]);
            sfrs.push(row[1]);
        }

        Self::new(ages, sfrs)
    }

    /// Ages in years, ascending.
    pub fn ages(&self) -> &[f64] {
        &self.ages
    }

    /// Star-formation rates aligned with `ages`.
    pub fn sfrs(&self) -> &[f64] {
        &self.sfrs
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.ages.len()
    }

    /// True when the table has no rows (construction forbids this).
    pub fn is_empty(&self) -> bool {
        self.ages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_rows_sorted_by_age() {
        let table = SfhTable::new(vec![1e9, 0.0, 5e8], vec![3.0, 1.0, 2.0]).unwrap();
        assert_eq!(table.ages(), &[0.0, 5e8, 1e9]);
        assert_eq!(table.sfrs(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_construction_rejects_bad_input() {
        assert!(matches!(
            SfhTable::new(vec![0.0, 1.0], vec![1.0]),
            Err(TableError::MismatchedLengths { ages: 2, sfrs: 1 })
        ));
        assert!(matches!(
            SfhTable::new(vec![], vec![]),
            Err(TableError::Empty)
        ));
        assert!(matches!(
            SfhTable::new(vec![0.0, f64::NAN], vec![1.0, 1.0]),
            Err(TableError::NonFinite { row: 1 })
        ));
        assert!(matches!(
            SfhTable::new(vec![1e9, 1e9], vec![1.0, 2.0]),
            Err(TableError::DuplicateAge { .. })
        ));
    }

    #[test]
    fn test_load_with_comments_and_blanks() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# age_yr sfr").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "0.0 5.0").unwrap();
        writeln!(file, "1e9\t5.0").unwrap();
        file.flush().unwrap();

        let table = SfhTable::load(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.ages(), &[0.0, 1e9]);
        assert_eq!(table.sfrs(), &[5.0, 5.0]);
    }

    #[test]
    fn test_load_reports_line_numbers() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0.0 5.0").unwrap();
        writeln!(file, "1e9 5.0 7.0").unwrap();
        file.flush().unwrap();

        match SfhTable::load(file.path()) {
            Err(TableError::ColumnCount { line: 2, found: 3 }) => {}
            other => panic!("expected ColumnCount at line 2, got {other:?}"),
        }

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "abc 5.0").unwrap();
        file.flush().unwrap();

        match SfhTable::load(file.path()) {
            Err(TableError::Parse { line: 1, value }) => assert_eq!(value, "abc"),
            other => panic!("expected Parse at line 1, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            SfhTable::load("/nonexistent/sfh.txt"),
            Err(TableError::Io { .. })
        ));
    }

    #[test]
    fn test_deserialization_validates() {
        let table: SfhTable =
            serde_json::from_str(r#"{"ages": [1e9, 0.0], "sfrs": [2.0, 1.0]}"#).unwrap();
        assert_eq!(table.ages(), &[0.0, 1e9]);

        let bad = serde_json::from_str::<SfhTable>(r#"{"ages": [0.0], "sfrs": []}"#);
        assert!(bad.is_err());
    }
}
