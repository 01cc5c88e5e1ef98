use crate::tabulate::types::{FlattenConfig, FrequencyTable, ScalarValue};
use serde_json::Value;
use tracing::{debug, info};

/// Walks nested JSON records and counts every scalar leaf under its dotted
/// key path
pub struct Flattener {
    config: FlattenConfig,
}

impl Flattener {
    pub fn new(config: FlattenConfig) -> Self {
        Flattener { config }
    }

    /// Tabulate a sequence of records into one shared frequency table
    pub fn tabulate<'a, I>(&self, records: I) -> FrequencyTable
    where
        I: IntoIterator<Item = &'a Value>,
    {
        info!("Processing data to build the frequency table");
        let mut table = FrequencyTable::new();
        let mut record_count = 0usize;

        for record in records {
            self.flatten(record, &mut table);
            record_count += 1;
        }

        for (path, histogram) in table.iter() {
            info!("{}: {} values", path, histogram.len());
        }
        info!(
            records = record_count,
            keys = table.len(),
            "Finished processing data"
        );

        table
    }

    /// Flatten one record into `table`.
    ///
    /// Objects extend the path with their keys, arrays are transparent and
    /// null leaves are skipped. The walk keeps its own stack of pending
    /// `(value, path)` pairs, so deeply nested input cannot exhaust the
    /// thread stack. Leaves are visited in document order.
    pub fn flatten(&self, record: &Value, table: &mut FrequencyTable) {
        // `None` is the root path; `Some("")` is a real empty key
        let mut pending: Vec<(&Value, Option<String>)> = vec![(record, None)];

        while let Some((value, path)) = pending.pop() {
            match value {
                Value::Object(obj) => {
                    for (key, child) in obj.iter().rev() {
                        pending.push((child, Some(self.child_path(path.as_deref(), key))));
                    }
                }
                Value::Array(arr) => {
                    for item in arr.iter().rev() {
                        pending.push((item, path.clone()));
                    }
                }
                Value::Null => {
                    debug!(path = path.as_deref().unwrap_or(""), "Skipping null value");
                }
                scalar => {
                    if let Some(leaf) = ScalarValue::from_json(scalar) {
                        table.record(path.as_deref().unwrap_or(""), leaf);
                    }
                }
            }
        }
    }

    fn child_path(&self, parent: Option<&str>, key: &str) -> String {
        match parent {
            None => key.to_string(),
            Some(parent) => format!("{}{}{}", parent, self.config.separator, key),
        }
    }
}

impl Default for Flattener {
    fn default() -> Self {
        Flattener::new(FlattenConfig::default())
    }
}
