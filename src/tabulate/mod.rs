//! Flattening and frequency aggregation
//!
//! Nested records are walked into dotted key paths and every non-null scalar
//! leaf is counted in a per-key histogram. Arrays do not add a path segment,
//! so all elements of an array share the path of their container.

pub mod flattener;
pub mod types;

pub use flattener::Flattener;
pub use types::{FlattenConfig, FrequencyTable, Histogram, JsonNumber, KeyPath, ScalarValue};
