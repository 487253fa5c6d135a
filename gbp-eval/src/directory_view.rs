use std::path::{Path, PathBuf};

use log::warn;

use crate::error::{EvalError, EvalResult};

/// The instance files found at one input path, as basenames relative to `dir`.
///
/// A single file is presented as a directory holding only that file, so the rest of
/// the pipeline does not distinguish both cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryView {
    dir: PathBuf,
    files: Vec<String>,
}

impl DirectoryView {
    /// Lists the regular files of `dir`, skipping subdirectories and every name for
    /// which `exclude` returns true. Files are sorted by name.
    pub async fn from_dir(dir: impl Into<PathBuf>, exclude: impl Fn(&str) -> bool) -> EvalResult<Self> {
        let dir = dir.into();
        let mut read_dir = tokio::fs::read_dir(&dir)
            .await
            .map_err(|source| EvalError::FileOpen {
                path: dir.clone(),
                source,
            })?;

        let mut files = vec![];
        loop {
            let entry = read_dir
                .next_entry()
                .await
                .map_err(|source| EvalError::FileRead {
                    path: dir.clone(),
                    source,
                })?;
            let Some(entry) = entry else {
                break;
            };
            //follows symlinks
            let is_dir = match tokio::fs::metadata(entry.path()).await {
                Ok(metadata) => metadata.is_dir(),
                Err(err) => {
                    warn!("[VIEW] skipping {}: {err}", entry.path().display());
                    continue;
                }
            };
            if is_dir {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) if !exclude(&name) => files.push(name),
                Ok(_) => {}
                Err(name) => warn!("[VIEW] skipping non UTF-8 file name {name:?}"),
            }
        }
        files.sort();
        Ok(Self { dir, files })
    }

    /// View over a single file: `dir` is its parent, `files` its basename.
    pub fn from_file(path: &Path) -> EvalResult<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| EvalError::PathDoesNotExist(path.to_path_buf()))?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(Self {
            dir,
            files: vec![name.to_string()],
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn path_of(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }
}
