//! Pivot-CSV report
//!
//! Turns a [`FrequencyTable`](crate::tabulate::FrequencyTable) into a wide
//! CSV where every key path contributes a `[Value]` and an `[Instances]`
//! column, ranked by descending frequency.

pub mod grid;
pub mod writer;

pub use grid::{PivotCell, PivotGrid, RankedColumn};
pub use writer::{write_grid, CsvReportWriter};
