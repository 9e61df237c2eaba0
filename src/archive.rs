//! Archive index: the `history.json` manifest behind the static site.
//!
//! The front-end reads one JSON file listing every rendered batch, newest
//! first, and builds the day → batch → question navigation from it.
//!
//! ```json
//! {
//!   "records": [
//!     {
//!       "date": "2025-01-01 01:00:00",
//!       "recordId": "20250101_010000",
//!       "count": 1,
//!       "questions": [
//!         { "number": "9", "title": "回文数", "difficulty": "easy",
//!           "file": "20250101_010000_q1.html" }
//!       ]
//!     }
//!   ],
//!   "lastUpdated": "2025-01-01 09:30:00"
//! }
//! ```
//!
//! ## Schema versions
//!
//! Older manifests used flat records (`date`, `file`, `count`, no
//! `questions`) and snake_case keys. Both are accepted on read; flat records
//! are migrated to the nested shape with their `recordId` taken from the page
//! file name. Only the nested, camelCase shape is ever written.
//!
//! ## Update modes
//!
//! - [`ArchiveIndex::rebuild_full`] replaces every record.
//! - [`ArchiveIndex::append_incremental`] prepends new records and drops
//!   older records with the same `recordId`.
//!
//! Both sort by `date` descending and refresh `lastUpdated`, even when no
//! records changed. The file is replaced atomically via a temp file in the
//! same directory.

use crate::batch::Batch;
use crate::ledger::TIMESTAMP_FORMAT;
use crate::types::Difficulty;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::info;

/// File name of the manifest inside the site directory.
pub const MANIFEST_FILENAME: &str = "history.json";

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to replace manifest: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// One question inside a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveItem {
    pub number: String,
    pub title: String,
    pub difficulty: Difficulty,
    /// Page this question is rendered on.
    pub file: String,
}

/// Manifest row for one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveRecord {
    /// `YYYY-MM-DD HH:MM:SS`; the sort key.
    pub date: String,
    /// `{YYYYMMDD}_{HHMMSS}`; every file this record renders to derives from it.
    pub record_id: String,
    pub count: usize,
    /// Merged batch page, when the batch was rendered as one page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub questions: Vec<ArchiveItem>,
}

impl ArchiveRecord {
    /// Record for a rendered batch. `count` follows the items that rendered.
    pub fn for_batch(batch: &Batch, questions: Vec<ArchiveItem>, file: Option<String>) -> Self {
        Self {
            date: batch.display_datetime(),
            record_id: batch.record_id(),
            count: questions.len(),
            file,
            questions,
        }
    }
}

/// The full manifest.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub records: Vec<ArchiveRecord>,
    pub last_updated: String,
}

impl Manifest {
    /// Sum of `count` over all records.
    pub fn total_questions(&self) -> usize {
        self.records.iter().map(|r| r.count).sum()
    }

    /// Number of distinct calendar days with at least one record.
    pub fn day_count(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.date.split(' ').next().unwrap_or(&r.date))
            .collect::<HashSet<_>>()
            .len()
    }
}

// On-disk shapes accepted when reading; see module docs.

#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    records: Vec<RawRecord>,
    #[serde(default, rename = "lastUpdated", alias = "last_updated")]
    last_updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    date: String,
    #[serde(default, rename = "recordId", alias = "record_id")]
    record_id: Option<String>,
    #[serde(default)]
    count: Option<usize>,
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    questions: Option<Vec<ArchiveItem>>,
}

impl RawRecord {
    /// Canonical record; `None` if the row carries no identity at all.
    fn into_record(self) -> Option<ArchiveRecord> {
        let file_stem = self
            .file
            .as_deref()
            .map(|f| f.strip_suffix(".html").unwrap_or(f).to_string());
        let record_id = self.record_id.or(file_stem)?;
        let questions = self.questions.unwrap_or_default();
        let count = self.count.unwrap_or(questions.len());
        Some(ArchiveRecord {
            date: self.date,
            record_id,
            count,
            file: self.file,
            questions,
        })
    }

    fn is_flat(&self) -> bool {
        self.questions.is_none()
    }
}

/// Handle to the manifest file of a site directory.
#[derive(Debug, Clone)]
pub struct ArchiveIndex {
    path: PathBuf,
}

impl ArchiveIndex {
    /// Manifest at `{site_dir}/history.json`.
    pub fn in_dir(site_dir: &Path) -> Self {
        Self {
            path: site_dir.join(MANIFEST_FILENAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the manifest, migrating old record shapes. Absent → empty.
    pub fn load(&self) -> Result<Manifest, ArchiveError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(Manifest {
                    records: Vec::new(),
                    last_updated: String::new(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        let raw: RawManifest = serde_json::from_str(&content)?;
        let flat = raw.records.iter().filter(|r| r.is_flat()).count();
        if flat > 0 {
            info!(flat, "migrating flat manifest records");
        }
        Ok(Manifest {
            records: raw
                .records
                .into_iter()
                .filter_map(RawRecord::into_record)
                .collect(),
            last_updated: raw.last_updated.unwrap_or_default(),
        })
    }

    /// Replace all records with `records`.
    pub fn rebuild_full(
        &self,
        records: Vec<ArchiveRecord>,
        now: NaiveDateTime,
    ) -> Result<Manifest, ArchiveError> {
        let manifest = Manifest {
            records: sorted_newest_first(records),
            last_updated: now.format(TIMESTAMP_FORMAT).to_string(),
        };
        self.write(&manifest)?;
        Ok(manifest)
    }

    /// Prepend `new_records`, de-duplicate by `recordId` (new wins), sort.
    pub fn append_incremental(
        &self,
        new_records: Vec<ArchiveRecord>,
        now: NaiveDateTime,
    ) -> Result<Manifest, ArchiveError> {
        let existing = self.load()?;
        let manifest = Manifest {
            records: sorted_newest_first(merge_records(new_records, existing.records)),
            last_updated: now.format(TIMESTAMP_FORMAT).to_string(),
        };
        self.write(&manifest)?;
        Ok(manifest)
    }

    fn write(&self, manifest: &Manifest) -> Result<(), ArchiveError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, manifest)?;
        tmp.write_all(b"\n")?;
        tmp.persist(&self.path)?;
        Ok(())
    }
}

/// `new` followed by `existing`, keeping the first record per `recordId`.
pub fn merge_records(
    new: Vec<ArchiveRecord>,
    existing: Vec<ArchiveRecord>,
) -> Vec<ArchiveRecord> {
    let mut seen = HashSet::new();
    new.into_iter()
        .chain(existing)
        .filter(|r| seen.insert(r.record_id.clone()))
        .collect()
}

/// Stable sort by `date` descending.
pub fn sorted_newest_first(mut records: Vec<ArchiveRecord>) -> Vec<ArchiveRecord> {
    records.sort_by(|a, b| b.date.cmp(&a.date));
    records
}
