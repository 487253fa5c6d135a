use std::io::Write;

use anyhow::Result;
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL;

use crate::evaluation::ErrorReport;

/// Header of the CSV report
pub const CSV_HEADER: [&str; 7] = [
    "path",
    "file",
    "identifier",
    "objective",
    "reference",
    "absolute_error",
    "relative_error",
];

/// Value of the `file` column in average rows
pub const AVERAGE_ROW: &str = "AVERAGE";

/// Renders the averages, preceded by the per-file errors when `verbose`.
pub fn write_table(report: &ErrorReport, verbose: bool, mut writer: impl Write) -> Result<()> {
    if verbose {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL).set_header(CSV_HEADER);
        for e in &report.files {
            table.add_row(vec![
                e.path.display().to_string(),
                e.file.clone(),
                e.identifier.clone(),
                e.objective.to_string(),
                e.reference.to_string(),
                e.absolute_error.to_string(),
                format!("{:.4}", e.relative_error),
            ]);
        }
        writeln!(writer, "{table}")?;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(["path", "identifier", "files", "avg_absolute_error", "avg_relative_error"]);
    for a in &report.averages {
        table.add_row(vec![
            a.path.display().to_string(),
            a.identifier.clone(),
            a.n_files.to_string(),
            format!("{:.4}", a.absolute_error),
            format!("{:.4}", a.relative_error),
        ]);
    }
    writeln!(writer, "{table}")?;
    Ok(())
}

/// Writes one row per file error, then one [`AVERAGE_ROW`] per path and heuristic.
pub fn write_csv(report: &ErrorReport, mut writer: impl Write) -> Result<()> {
    writeln!(writer, "{}", CSV_HEADER.join(","))?;
    for e in &report.files {
        let row = [
            csv_field(&e.path.display().to_string()),
            csv_field(&e.file),
            csv_field(&e.identifier),
            e.objective.to_string(),
            e.reference.to_string(),
            e.absolute_error.to_string(),
            e.relative_error.to_string(),
        ];
        writeln!(writer, "{}", row.join(","))?;
    }
    for a in &report.averages {
        let row = [
            csv_field(&a.path.display().to_string()),
            AVERAGE_ROW.to_string(),
            csv_field(&a.identifier),
            String::new(),
            String::new(),
            a.absolute_error.to_string(),
            a.relative_error.to_string(),
        ];
        writeln!(writer, "{}", row.join(","))?;
    }
    writer.flush()?;
    Ok(())
}

/// Quotes fields containing separators, quotes or line breaks
fn csv_field(value: &str) -> String {
    match value.contains([',', '"', '\n', '\r']) {
        true => format!("\"{}\"", value.replace('"', "\"\"")),
        false => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::evaluation::{AverageError, FileError};

    fn report() -> ErrorReport {
        ErrorReport {
            files: vec![FileError {
                path: PathBuf::from("set1"),
                file: "a.dat".into(),
                identifier: "BestFit,FitnessFuncID:0".into(),
                objective: 3,
                reference: 2,
                absolute_error: 1,
                relative_error: 0.5,
            }],
            averages: vec![AverageError {
                path: PathBuf::from("set1"),
                identifier: "BestFit,FitnessFuncID:0".into(),
                n_files: 1,
                absolute_error: 1.0,
                relative_error: 0.5,
            }],
        }
    }

    #[test]
    fn csv_quotes_identifiers() {
        let mut out = vec![];
        write_csv(&report(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(
            lines,
            [
                "path,file,identifier,objective,reference,absolute_error,relative_error",
                "set1,a.dat,\"BestFit,FitnessFuncID:0\",3,2,1,0.5",
                "set1,AVERAGE,\"BestFit,FitnessFuncID:0\",,,1,0.5",
            ]
        );
    }

    #[test]
    fn table_lists_averages_and_optionally_files() {
        let mut quiet = vec![];
        write_table(&report(), false, &mut quiet).unwrap();
        let quiet = String::from_utf8(quiet).unwrap();
        assert!(quiet.contains("avg_absolute_error"));
        assert!(!quiet.contains("a.dat"));

        let mut verbose = vec![];
        write_table(&report(), true, &mut verbose).unwrap();
        let verbose = String::from_utf8(verbose).unwrap();
        assert!(verbose.contains("a.dat"));
        assert!(verbose.contains("0.5000"));
    }
}
