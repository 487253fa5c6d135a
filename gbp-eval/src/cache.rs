//! Per-directory store of objectives, keyed by file name and invalidated by content hash.
//!
//! The store lives in a single JSON file, [`CACHE_FILE_NAME`], at the root of the
//! instance directory:
//! ```json
//! {"data1.dat": {"hash": "88ae80225f77e46c036310cc276a24a0", "results": {"cplex": 18}}}
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use gbp::Objective;
use log::{debug, info, warn};
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult};

pub const CACHE_FILE_NAME: &str = ".optimizer_cache";

/// Cached state of one instance file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Lowercase hex MD5 of the file contents the results were computed on
    pub hash: String,
    /// Objective per executor identifier
    #[serde(default)]
    pub results: BTreeMap<String, Objective>,
}

impl FileInfo {
    pub fn new(hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            results: BTreeMap::new(),
        }
    }
}

/// In-memory view of one directory's cache file.
///
/// Owned by a single path run: loaded at the start, mutated only by the task draining
/// results and saved at most once at the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cache {
    dir: PathBuf,
    entries: BTreeMap<String, FileInfo>,
}

impl Cache {
    /// Loads the cache of `dir`, an absent cache file yields an empty cache.
    pub async fn load(dir: impl Into<PathBuf>) -> EvalResult<Self> {
        let dir = dir.into();
        let metadata = match tokio::fs::metadata(&dir).await {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(EvalError::PathDoesNotExist(dir));
            }
            Err(source) => return Err(EvalError::FileOpen { path: dir, source }),
        };
        if !metadata.is_dir() {
            return Err(EvalError::NotADirectory(dir));
        }

        let path = dir.join(CACHE_FILE_NAME);
        let entries = match tokio::fs::read(&path).await {
            Ok(raw) => serde_json::from_slice(&raw)
                .map_err(|source| EvalError::CacheFormat { path, source })?,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("[CACHE] no cache in {}", dir.display());
                BTreeMap::new()
            }
            Err(source) => return Err(EvalError::FileRead { path, source }),
        };
        Ok(Self { dir, entries })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(CACHE_FILE_NAME)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has(&self, filename: &str) -> bool {
        self.entries.contains_key(filename)
    }

    pub fn get(&self, filename: &str) -> Option<&FileInfo> {
        self.entries.get(filename)
    }

    /// Replaces any existing entry
    pub fn put(&mut self, filename: impl Into<String>, info: FileInfo) {
        self.entries.insert(filename.into(), info);
    }

    /// Hashes `<dir>/<filename>` and installs an entry without results.
    pub async fn add_file(&mut self, filename: &str) -> EvalResult<()> {
        let hash = self.fingerprint(filename).await?;
        self.put(filename, FileInfo::new(hash));
        Ok(())
    }

    /// Rehashes `<dir>/<filename>`.
    /// Returns a fresh entry when the contents changed since the stored hash, `None` otherwise.
    /// A file without entry counts as changed.
    pub async fn verify(&self, filename: &str) -> EvalResult<Option<FileInfo>> {
        let hash = self.fingerprint(filename).await?;
        match self.entries.get(filename) {
            Some(info) if info.hash == hash => Ok(None),
            Some(info) => {
                debug!(
                    "[CACHE] {filename} changed ({} -> {hash}), dropping {} results",
                    info.hash,
                    info.results.len()
                );
                Ok(Some(FileInfo::new(hash)))
            }
            None => Ok(Some(FileInfo::new(hash))),
        }
    }

    /// MD5 of the current contents of `<dir>/<filename>`
    pub async fn fingerprint(&self, filename: &str) -> EvalResult<String> {
        let path = self.dir.join(filename);
        let raw = tokio::fs::read(&path).await.map_err(|source| match source.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => EvalError::FileOpen {
                path: path.clone(),
                source,
            },
            _ => EvalError::FileRead {
                path: path.clone(),
                source,
            },
        })?;
        Ok(content_hash(&raw))
    }

    /// Stores an objective for an existing entry. Returns false when no entry exists.
    pub fn record(&mut self, filename: &str, identifier: &str, objective: Objective) -> bool {
        match self.entries.get_mut(filename) {
            Some(info) => {
                info.results.insert(identifier.to_string(), objective);
                true
            }
            None => {
                warn!("[CACHE] no entry for {filename}, dropping result of {identifier}");
                false
            }
        }
    }

    /// Drops the entries of files not in `filenames`. Returns the number of dropped entries.
    pub fn retain_files(&mut self, filenames: &[String]) -> usize {
        let present = filenames.iter().map(String::as_str).collect::<HashSet<_>>();
        let before = self.entries.len();
        self.entries.retain(|filename, _| {
            let keep = present.contains(filename.as_str());
            if !keep {
                debug!("[CACHE] {filename} is gone, dropping its entry");
            }
            keep
        });
        before - self.entries.len()
    }

    /// Writes all entries as pretty JSON, replacing the previous cache file.
    pub async fn save(&self) -> EvalResult<()> {
        let path = self.path();
        let json = serde_json::to_vec_pretty(&self.entries).map_err(|source| {
            EvalError::CacheFormat {
                path: path.clone(),
                source,
            }
        })?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|source| EvalError::FileWrite {
                path: path.clone(),
                source,
            })?;
        info!(
            "[CACHE] saved {} entries to {}",
            self.entries.len(),
            path.display()
        );
        Ok(())
    }
}

/// Lowercase hex MD5 digest
pub fn content_hash(bytes: &[u8]) -> String {
    let digest = Md5::digest(bytes);
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        //writing to a String never fails
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}
