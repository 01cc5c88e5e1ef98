use crate::error::ReportError;
use crate::pivot::grid::PivotGrid;
use crate::tabulate::FrequencyTable;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{error, info};

/// Writes pivot reports as CSV files into one output directory.
///
/// Each report is rendered into a temporary file next to its destination
/// and renamed into place once complete, so a failed write never leaves a
/// partial CSV at the destination path.
pub struct CsvReportWriter {
    output_dir: PathBuf,
}

impl CsvReportWriter {
    /// Create a writer for `output_dir`. The directory is created on the
    /// first report actually written.
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        CsvReportWriter {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Pivot `table` and write it to `file_name` inside the output directory.
    ///
    /// Returns [`ReportError::EmptyAggregation`] without touching the file
    /// system when the table has no keys.
    pub fn write_table(
        &self,
        table: &FrequencyTable,
        file_name: &str,
    ) -> Result<PathBuf, ReportError> {
        if table.is_empty() {
            error!("No data to write to the CSV");
            return Err(ReportError::EmptyAggregation);
        }

        let destination = self.output_dir.join(file_name);
        info!("Writing frequency counts to CSV file: {}", destination.display());

        std::fs::create_dir_all(&self.output_dir).map_err(|source| ReportError::OutputDir {
            path: self.output_dir.clone(),
            source,
        })?;

        let grid = PivotGrid::from_table(table);

        let mut staging = NamedTempFile::new_in(&self.output_dir)?;
        if let Err(e) = write_grid(&grid, &mut staging) {
            error!("Failed to write CSV {}: {}", destination.display(), e);
            return Err(e);
        }
        staging.as_file().sync_all()?;

        staging
            .persist(&destination)
            .map_err(|e| ReportError::Persist {
                path: destination.clone(),
                source: e.error,
            })?;

        info!(
            rows = grid.height(),
            keys = grid.width(),
            "Data successfully written to CSV file: {}",
            destination.display()
        );
        Ok(destination)
    }
}

/// Serialize a grid as CSV: one header row followed by the ranked rows
pub fn write_grid<W: Write>(grid: &PivotGrid, writer: W) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(&grid.header)?;
    info!("Headers written to CSV");

    for row in &grid.rows {
        wtr.write_record(row.iter().flat_map(|cell| cell.fields()))?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tabulate::Flattener;
    use serde_json::json;

    fn render(records: &[serde_json::Value]) -> String {
        let table = Flattener::default().tabulate(records);
        let mut buffer = Vec::new();
        write_grid(&PivotGrid::from_table(&table), &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_write_grid_layout() {
        let output = render(&[json!({"user": {"id": 1, "tags": ["a", "a", "b"]}})]);

        assert_eq!(
            output,
            "user.id [Value],user.id [Instances],user.tags [Value],user.tags [Instances]\n\
             1,1,a,2\n\
             ,,b,1\n"
        );
    }

    #[test]
    fn test_write_grid_quotes_and_scalars() {
        let output = render(&[json!({"s": "x,y", "q": "say \"hi\"", "b": false, "f": 2.5})]);

        let mut lines = output.lines();
        lines.next();
        assert_eq!(lines.next(), Some("\"x,y\",1,\"say \"\"hi\"\"\",1,false,1,2.5,1"));
    }

    #[test]
    fn test_write_grid_reads_back_line_breaks_and_quoted_keys() {
        let output = render(&[
            json!({"a,b": "two\nlines", "c": {"\"d\"": "crlf\r\nvalue"}}),
            json!({"a,b": 100000000000000000001u128}),
        ]);

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(output.as_bytes());
        let rows: Vec<Vec<String>> = reader
            .records()
            .map(|record| record.unwrap().iter().map(str::to_string).collect())
            .collect();

        assert_eq!(
            rows,
            vec![
                vec!["a,b [Value]", "a,b [Instances]", "c.\"d\" [Value]", "c.\"d\" [Instances]"],
                vec!["two\nlines", "1", "crlf\r\nvalue", "1"],
                vec!["100000000000000000001", "1", "", ""],
            ]
        );
    }

    #[test]
    fn test_write_grid_keeps_large_integers_exact() {
        let records: Vec<serde_json::Value> = [
            r#"{"big": 100000000000000000001}"#,
            r#"{"big": 100000000000000000002}"#,
            r#"{"big": 100000000000000000001}"#,
        ]
        .iter()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

        let output = render(&records);

        assert_eq!(
            output,
            "big [Value],big [Instances]\n\
             100000000000000000001,2\n\
             100000000000000000002,1\n"
        );
    }

    #[test]
    fn test_write_table_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let writer = CsvReportWriter::new(dir.path().join("nested").join("out"));

        let table = Flattener::default().tabulate([&json!({"x": true})]);
        let written = writer.write_table(&table, "report.csv").unwrap();

        assert!(written.is_file());
    }

    #[test]
    fn test_write_table_empty_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let writer = CsvReportWriter::new(dir.path().join("out"));

        let result = writer.write_table(&FrequencyTable::new(), "report.csv");

        assert!(matches!(result, Err(ReportError::EmptyAggregation)));
        assert!(!writer.output_dir().exists());
    }

    #[test]
    fn test_write_table_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let writer = CsvReportWriter::new(dir.path().join("out"));
        std::fs::create_dir_all(writer.output_dir()).unwrap();
        let target = writer.output_dir().join("report.csv");
        std::fs::write(&target, "stale contents that are longer than the report\n").unwrap();

        let table = Flattener::default().tabulate([&json!({"x": 5})]);
        let written = writer.write_table(&table, "report.csv").unwrap();

        assert_eq!(written, target);
        assert_eq!(
            std::fs::read_to_string(&target).unwrap(),
            "x [Value],x [Instances]\n5,1\n"
        );
        // Only the report remains; the staging file was renamed
        assert_eq!(std::fs::read_dir(writer.output_dir()).unwrap().count(), 1);
    }
}
