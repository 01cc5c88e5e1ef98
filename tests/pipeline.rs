use keytally::{build_report, PipelineConfig, RetryPolicy};
use std::error::Error;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn config_for(dir: &TempDir, input: &str) -> Result<PipelineConfig, Box<dyn Error>> {
    let input_path = dir.path().join("input.jsonl");
    fs::write(&input_path, input)?;

    Ok(PipelineConfig {
        input_path,
        output_dir: dir.path().join("out"),
        file_prefix: String::from("report"),
        retry: RetryPolicy {
            max_attempts: 1,
            delay_ms: 0,
        },
        ..PipelineConfig::default()
    })
}

fn read_rows(path: &Path) -> Result<Vec<Vec<String>>, Box<dyn Error>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

#[test]
fn nested_record_report() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let config = config_for(&dir, "{\"user\":{\"id\":1,\"tags\":[\"a\",\"a\",\"b\"]}}\n")?;

    let outcome = build_report(&config)?;
    let path = outcome.output.expect("report should be written");

    assert_eq!(outcome.records_read, 1);
    assert_eq!(outcome.keys, 2);
    assert_eq!(outcome.rows, 2);
    assert!(path.starts_with(&config.output_dir));
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("report-") && name.ends_with(".csv"));

    let rows = read_rows(&path)?;
    assert_eq!(
        rows,
        vec![
            vec!["user.id [Value]", "user.id [Instances]", "user.tags [Value]", "user.tags [Instances]"],
            vec!["1", "1", "a", "2"],
            vec!["", "", "b", "1"],
        ]
    );
    Ok(())
}

#[test]
fn malformed_line_is_skipped() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let config = config_for(&dir, "{\"x\": oops}\n{\"x\":5}\n")?;

    let outcome = build_report(&config)?;

    assert_eq!(outcome.decode_errors, 1);
    assert_eq!(outcome.records_read, 1);
    let rows = read_rows(&outcome.output.expect("report should be written"))?;
    assert_eq!(rows, vec![vec!["x [Value]", "x [Instances]"], vec!["5", "1"]]);
    Ok(())
}

#[test]
fn empty_input_writes_nothing() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let config = config_for(&dir, "")?;

    let outcome = build_report(&config)?;

    assert_eq!(outcome.records_read, 0);
    assert_eq!(outcome.keys, 0);
    assert!(outcome.output.is_none());
    assert!(!config.output_dir.exists());
    Ok(())
}

#[test]
fn null_only_key_is_absent() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let config = config_for(&dir, "{\"a\":null}\n{\"a\":null}\n{\"a\":null,\"b\":true}\n")?;

    let outcome = build_report(&config)?;

    assert_eq!(outcome.records_read, 3);
    let rows = read_rows(&outcome.output.expect("report should be written"))?;
    assert_eq!(rows[0], vec!["b [Value]", "b [Instances]"]);
    assert_eq!(rows[1], vec!["true", "1"]);
    Ok(())
}

#[test]
fn all_null_input_writes_nothing() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let config = config_for(&dir, "{\"a\":null}\n[null, {\"b\": [null]}]\n")?;

    let outcome = build_report(&config)?;

    assert_eq!(outcome.records_read, 3);
    assert!(outcome.output.is_none());
    Ok(())
}

#[test]
fn report_shape_matches_histograms() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let input = "\
[{\"k\":\"x\",\"n\":1},{\"k\":\"y\",\"n\":1}]
{\"k\":\"y\",\"n\":\"1\",\"m\":{\"deep\":[1,2,3,4]}}
{\"k\":\"z\"}
";
    let config = config_for(&dir, input)?;

    let outcome = build_report(&config)?;
    let rows = read_rows(&outcome.output.expect("report should be written"))?;

    // k, n, m.deep
    assert_eq!(rows[0].len(), 6);
    // m.deep has the most distinct values
    assert_eq!(rows.len(), 1 + 4);
    assert!(rows.iter().all(|row| row.len() == 6));

    let k_column: Vec<(&str, &str)> = rows[1..]
        .iter()
        .map(|row| (row[0].as_str(), row[1].as_str()))
        .collect();
    assert_eq!(k_column, vec![("y", "2"), ("x", "1"), ("z", "1"), ("", "")]);

    let n_column: Vec<(&str, &str)> = rows[1..]
        .iter()
        .map(|row| (row[2].as_str(), row[3].as_str()))
        .collect();
    assert_eq!(n_column, vec![("1", "2"), ("1", "1"), ("", ""), ("", "")]);
    Ok(())
}
