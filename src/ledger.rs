//! History ledger of previously selected questions.
//!
//! The ledger keeps the daily picker from presenting the same question twice.
//! It is an optimization, not a source of truth: losing it only means an old
//! question may come around again. Accordingly every failure mode is soft.
//!
//! - A missing, unreadable, or corrupt file loads as an empty ledger.
//! - A failed save is logged and the run carries on.
//!
//! ## Storage
//!
//! ```json
//! {
//!   "selected_questions": ["1", "15", "206"],
//!   "last_updated": "2025-01-01 09:30:00"
//! }
//! ```
//!
//! Ids are appended in selection order and never removed. Every successful
//! [`HistoryLedger::add`] rewrites the file immediately, so a crash halfway
//! through a run keeps the picks already recorded.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Timestamp format shared by the ledger and the archive manifest.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    selected_questions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_updated: Option<String>,
}

/// Summary numbers for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerStats {
    pub total_selected: usize,
}

/// Append-only set of selected question ids backed by a JSON file.
#[derive(Debug)]
pub struct HistoryLedger {
    path: PathBuf,
    ids: Vec<String>,
    /// Membership index over `ids`. Never serialized.
    index: HashSet<String>,
    last_updated: Option<String>,
}

impl HistoryLedger {
    /// Load from `path`, or start empty if the file is absent or unreadable.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file = match read_ledger_file(&path) {
            Ok(Some(f)) => f,
            Ok(None) => LedgerFile::default(),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "failed to load history ledger, starting empty");
                LedgerFile::default()
            }
        };
        let mut ids = Vec::with_capacity(file.selected_questions.len());
        let mut index = HashSet::with_capacity(file.selected_questions.len());
        for id in file.selected_questions {
            if index.insert(id.clone()) {
                ids.push(id);
            }
        }
        Self {
            path,
            ids,
            index,
            last_updated: file.last_updated,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    /// Record a selection and flush. Returns `true` if the id was new.
    pub fn add(&mut self, id: &str) -> bool {
        self.add_at(id, Local::now().naive_local())
    }

    /// [`add`](Self::add) with an explicit timestamp.
    pub fn add_at(&mut self, id: &str, now: NaiveDateTime) -> bool {
        if !self.index.insert(id.to_string()) {
            return false;
        }
        self.ids.push(id.to_string());
        self.last_updated = Some(now.format(TIMESTAMP_FORMAT).to_string());
        if let Err(e) = self.save() {
            warn!(file = %self.path.display(), error = %e, "failed to save history ledger");
        } else {
            debug!(id, total = self.ids.len(), "recorded selection");
        }
        true
    }

    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            total_selected: self.ids.len(),
        }
    }

    /// Ids in selection order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn last_updated(&self) -> Option<&str> {
        self.last_updated.as_deref()
    }

    fn save(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let file = LedgerFile {
            selected_questions: self.ids.clone(),
            last_updated: self.last_updated.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        fs::write(&self.path, json)
    }
}

fn read_ledger_file(path: &Path) -> io::Result<Option<LedgerFile>> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    let file = serde_json::from_str(&content)?;
    Ok(Some(file))
}
