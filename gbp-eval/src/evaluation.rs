use std::collections::BTreeMap;
use std::path::PathBuf;

use gbp::Objective;
use log::debug;
use serde::Serialize;

use crate::multi_path_runner::EvalResults;

/// Error of one heuristic on one file, measured against the reference objective.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileError {
    pub path: PathBuf,
    pub file: String,
    pub identifier: String,
    pub objective: Objective,
    pub reference: Objective,
    pub absolute_error: u64,
    pub relative_error: f64,
}

/// Mean error of one heuristic over the files of one path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageError {
    pub path: PathBuf,
    pub identifier: String,
    pub n_files: usize,
    pub absolute_error: f64,
    pub relative_error: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ErrorReport {
    pub files: Vec<FileError>,
    pub averages: Vec<AverageError>,
}

impl ErrorReport {
    /// Compares every non-reference objective with the reference objective of the same file.
    /// Files without a reference objective are left out entirely.
    pub fn compute(results: &EvalResults, reference_id: &str) -> Self {
        let mut files = vec![];
        for (path, files_to_results) in results {
            for (file, objectives) in files_to_results {
                let Some(&reference) = objectives.get(reference_id) else {
                    debug!("[EVAL] no reference objective for {file}, skipping");
                    continue;
                };
                let errors = objectives
                    .iter()
                    .filter(|(identifier, _)| identifier.as_str() != reference_id)
                    .map(|(identifier, &objective)| {
                        let absolute_error = objective.abs_diff(reference);
                        FileError {
                            path: path.clone(),
                            file: file.clone(),
                            identifier: identifier.clone(),
                            objective,
                            reference,
                            absolute_error,
                            relative_error: relative_error(absolute_error, reference),
                        }
                    });
                files.extend(errors);
            }
        }

        //(sum abs, sum rel, count) per path and heuristic
        let mut sums: BTreeMap<(&PathBuf, &str), (f64, f64, usize)> = BTreeMap::new();
        for e in &files {
            let sum = sums.entry((&e.path, e.identifier.as_str())).or_default();
            sum.0 += e.absolute_error as f64;
            sum.1 += e.relative_error;
            sum.2 += 1;
        }
        let averages = sums
            .into_iter()
            .map(|((path, identifier), (abs, rel, n))| AverageError {
                path: path.clone(),
                identifier: identifier.to_string(),
                n_files: n,
                absolute_error: abs / n as f64,
                relative_error: rel / n as f64,
            })
            .collect();

        Self { files, averages }
    }
}

/// `absolute_error / reference`. A zero reference gives 0 when matched exactly, infinity otherwise.
pub fn relative_error(absolute_error: u64, reference: Objective) -> f64 {
    match (absolute_error, reference) {
        (0, _) => 0.0,
        (_, 0) => f64::INFINITY,
        (abs, r) => abs as f64 / r as f64,
    }
}
