use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::agent::truncate_chars;
use crate::error::StoreError;
use crate::pipeline::PipelineReport;

/// Characters of the report kept in a history entry
const REPORT_EXCERPT_CHARS: usize = 300;

/// Summary of one pipeline run, as kept in a user's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub symptoms: String,
    #[serde(default)]
    pub report_excerpt: String,
    pub symptom: String,
    pub lifestyle: String,
    pub diet: String,
    pub fitness: String,
}

impl HistoryEntry {
    pub fn from_report(symptoms: &str, report: Option<&str>, result: &PipelineReport) -> Self {
        Self {
            timestamp: Utc::now(),
            symptoms: symptoms.to_string(),
            report_excerpt: truncate_chars(report.unwrap_or(""), REPORT_EXCERPT_CHARS),
            symptom: result.symptom.clone(),
            lifestyle: result.lifestyle.clone(),
            diet: result.diet.clone(),
            fitness: result.fitness.clone(),
        }
    }
}

/// Per-user append-only history, persisted as one JSON object
/// `{user_id: [entry, ...]}`.
///
/// Reads are served from memory; every append rewrites the file.
pub struct HistoryStore {
    path: PathBuf,
    entries: DashMap<String, Vec<HistoryEntry>>,
    write_lock: Mutex<()>,
}

impl HistoryStore {
    /// Open the store at `path`, loading existing history if the file exists
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = DashMap::new();

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
            if !content.trim().is_empty() {
                let data: HashMap<String, Vec<HistoryEntry>> =
                    serde_json::from_str(&content).map_err(|e| json_error(&path, e))?;
                for (user_id, list) in data {
                    entries.insert(user_id, list);
                }
            }
        }

        tracing::debug!("Opened history store {:?} ({} users)", path, entries.len());
        Ok(Self {
            path,
            entries,
            write_lock: Mutex::new(()),
        })
    }

    /// Append an entry to a user's history, creating the list if needed.
    ///
    /// The cache only changes once the file has been written.
    pub fn append(&self, user_id: &str, entry: HistoryEntry) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut snapshot = self.snapshot();
        snapshot
            .entry(user_id.to_string())
            .or_default()
            .push(entry.clone());
        write_json(&self.path, &snapshot)?;

        self.entries
            .entry(user_id.to_string())
            .or_default()
            .push(entry);
        Ok(())
    }

    /// A user's history in append order; empty for unknown users
    pub fn fetch(&self, user_id: &str) -> Vec<HistoryEntry> {
        self.entries
            .get(user_id)
            .map(|list| list.value().clone())
            .unwrap_or_default()
    }

    fn snapshot(&self) -> HashMap<String, Vec<HistoryEntry>> {
        self.entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }
}

pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| io_error(path, e))?;
        }
    }
    let json = serde_json::to_string_pretty(value).map_err(|e| json_error(path, e))?;
    fs::write(path, json).map_err(|e| io_error(path, e))
}

pub(crate) fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

pub(crate) fn json_error(path: &Path, source: serde_json::Error) -> StoreError {
    StoreError::Json {
        path: path.display().to_string(),
        source,
    }
}
