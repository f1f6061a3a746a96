use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Bounded most-recent-first search-history log, persisted as a JSON array
/// of strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHistory {
    path: PathBuf,
    cap: usize,
    pub entries: Vec<String>,
    /// False when the file existed but could not be read; the session then
    /// keeps operating in memory only.
    pub loaded: bool,
}

impl SearchHistory {
    pub fn load(path: &Path, cap: usize) -> Self {
        match read_entries(path) {
            Ok(mut entries) => {
                entries.truncate(cap);
                Self {
                    path: path.to_path_buf(),
                    cap,
                    entries,
                    loaded: true,
                }
            }
            Err(_) => Self {
                path: path.to_path_buf(),
                cap,
                entries: Vec::new(),
                loaded: false,
            },
        }
    }

    /// Moves the query to the head, dropping any earlier occurrence, and
    /// truncates to the cap. Blank queries are ignored.
    pub fn record(&mut self, query: &str) {
        push_entry(&mut self.entries, query, self.cap);
    }

    pub fn persist(&self) -> Result<(), HistoryError> {
        let payload = serde_json::to_vec(&self.entries).map_err(|source| HistoryError::Encode {
            path: self.path.clone(),
            source,
        })?;

        write_atomic(&self.path, &payload).map_err(|source| HistoryError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// Shared with the in-memory slice history: head insertion, de-duplication,
/// bounded length.
pub fn push_entry(entries: &mut Vec<String>, query: &str, cap: usize) {
    let query = query.trim();
    if query.is_empty() {
        return;
    }

    entries.retain(|entry| entry != query);
    entries.insert(0, query.to_string());
    entries.truncate(cap);
}

fn read_entries(path: &Path) -> Result<Vec<String>, HistoryError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path).map_err(|source| HistoryError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let entries: Vec<String> =
        serde_json::from_str(&content).map_err(|source| HistoryError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(entries
        .into_iter()
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "history path must have a parent directory",
        )
    })?;
    fs::create_dir_all(parent)?;

    let tmp_path = path.with_extension(format!("{}.tmp", std::process::id()));
    fs::write(&tmp_path, bytes)?;
    fs::rename(tmp_path, path)?;
    Ok(())
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to read history at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse history at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode history at {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to persist history at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
