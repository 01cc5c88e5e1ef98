//! Ragged-to-rectangular pivot of a frequency table
//!
//! Every key path becomes a ranked column of `(value, count)` pairs. Columns
//! are then zipped rank by rank into rows, padding exhausted columns with
//! [`PivotCell::Empty`].

use crate::tabulate::{FrequencyTable, KeyPath, ScalarValue};

/// One `(value, count)` slot of a pivot row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PivotCell {
    Entry { value: ScalarValue, count: u64 },
    /// The key has fewer distinct values than this row's rank
    Empty,
}

impl PivotCell {
    /// The two CSV fields for this slot
    pub fn fields(&self) -> [String; 2] {
        match self {
            PivotCell::Entry { value, count } => [value.to_string(), count.to_string()],
            PivotCell::Empty => [String::new(), String::new()],
        }
    }
}

/// Values of one key, most frequent first
#[derive(Debug, Clone)]
pub struct RankedColumn {
    pub key: KeyPath,
    pub entries: Vec<(ScalarValue, u64)>,
}

impl RankedColumn {
    fn cell(&self, rank: usize) -> PivotCell {
        match self.entries.get(rank) {
            Some((value, count)) => PivotCell::Entry {
                value: value.clone(),
                count: *count,
            },
            None => PivotCell::Empty,
        }
    }
}

/// A fully derived, rectangular view of a frequency table
#[derive(Debug, Clone)]
pub struct PivotGrid {
    pub header: Vec<String>,
    pub rows: Vec<Vec<PivotCell>>,
}

impl PivotGrid {
    /// Build the grid. Column order follows first-seen key order; within a
    /// column, equal counts keep first-seen value order.
    pub fn from_table(table: &FrequencyTable) -> Self {
        let columns: Vec<RankedColumn> = table
            .iter()
            .map(|(key, histogram)| RankedColumn {
                key: key.clone(),
                entries: histogram
                    .ranked()
                    .into_iter()
                    .map(|(value, count)| (value.clone(), count))
                    .collect(),
            })
            .collect();

        let header = columns
            .iter()
            .flat_map(|column| {
                [
                    format!("{} [Value]", column.key),
                    format!("{} [Instances]", column.key),
                ]
            })
            .collect();

        let max_length = columns
            .iter()
            .map(|column| column.entries.len())
            .max()
            .unwrap_or(0);

        let rows = (0..max_length)
            .map(|rank| columns.iter().map(|column| column.cell(rank)).collect())
            .collect();

        PivotGrid { header, rows }
    }

    /// Number of key paths (column pairs)
    pub fn width(&self) -> usize {
        self.header.len() / 2
    }

    /// Number of data rows
    pub fn height(&self) -> usize {
        self.rows.len()
    }
}
