//! Document store: one Markdown file per collected question.
//!
//! The store is a flat directory. File names encode the identity tuple
//! (see [`naming`](crate::naming)), so the directory listing alone is enough
//! to group documents by date and difficulty; bodies are only read when a
//! page is rendered.
//!
//! ## Write semantics
//!
//! [`DocumentStore::write`] never overwrites. Re-running ingestion for an
//! entry that already has a document reports [`WriteResult::Skipped`] and
//! leaves the first body in place. The body is written to a temporary file in
//! the store directory and linked into place with a no-clobber rename, so a
//! document name only ever appears with its complete body.

use crate::naming::{self, DocumentName, UNKNOWN_NUMBER, UNKNOWN_TITLE};
use crate::types::{Difficulty, Entry, ParsedEntry};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Document directory not found: {0}")]
    MissingDirectory(PathBuf),
}

/// Outcome of [`DocumentStore::write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    Created,
    Skipped,
}

/// Handle to a stored document, cheap to create from a directory listing.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRef {
    path: PathBuf,
    file_name: String,
    parsed_name: DocumentName,
}

impl DocumentRef {
    /// Build a reference from a path; the name is parsed immediately.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let parsed_name = naming::parse_document_name(&stem);
        Self {
            path,
            file_name,
            parsed_name,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw file name, including the `.md` extension.
    pub fn name(&self) -> &str {
        &self.file_name
    }

    /// Collection date token (`YYYYMMDD`) encoded in the name.
    pub fn date(&self) -> Option<&str> {
        self.parsed_name.date.as_deref()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.parsed_name.difficulty
    }
}

/// Flat directory of question documents.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    dir: PathBuf,
}

impl DocumentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a given entry is (or would be) stored at.
    pub fn path_for(&self, entry: &Entry) -> PathBuf {
        self.dir.join(naming::document_file_name(entry))
    }

    /// Persist an entry unless a document with the same name already exists.
    pub fn write(&self, entry: &Entry) -> Result<WriteResult, StoreError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(entry);
        if path.exists() {
            debug!(file = %path.display(), "document exists, skipping");
            return Ok(WriteResult::Skipped);
        }

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(entry.body.as_bytes())?;
        tmp.as_file().sync_all()?;
        match tmp.persist_noclobber(&path) {
            Ok(_) => Ok(WriteResult::Created),
            // Another writer got there first.
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                debug!(file = %path.display(), "document exists, skipping");
                Ok(WriteResult::Skipped)
            }
            Err(e) => Err(e.error.into()),
        }
    }

    /// Lazily enumerate stored `.md` documents in file-name order.
    ///
    /// A missing directory is an error; unreadable individual entries are
    /// logged and skipped.
    pub fn scan(&self) -> Result<impl Iterator<Item = DocumentRef> + use<>, StoreError> {
        if !self.dir.is_dir() {
            return Err(StoreError::MissingDirectory(self.dir.clone()));
        }
        let walker = WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter();
        Ok(walker
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(err) => {
                    warn!(error = %err, "skipping unreadable store entry");
                    None
                }
            })
            .filter(|e| e.file_type().is_file() && is_markdown(e.path()))
            .map(|e| DocumentRef::from_path(e.into_path())))
    }

    /// Read a document and extract its archive fields.
    pub fn parse(&self, doc: &DocumentRef) -> Result<ParsedEntry, StoreError> {
        let body = fs::read_to_string(doc.path())?;
        Ok(parse_document(doc, body))
    }
}

/// Extract archive fields from an already-loaded body.
///
/// Never fails: a missing heading degrades to placeholder number and title.
pub fn parse_document(doc: &DocumentRef, body: String) -> ParsedEntry {
    let (number, title) = naming::parse_heading(&body)
        .unwrap_or_else(|| (UNKNOWN_NUMBER.to_string(), UNKNOWN_TITLE.to_string()));
    let url = naming::find_problem_url(&body);
    ParsedEntry {
        number,
        title,
        difficulty: doc.difficulty(),
        url,
        raw_body: body,
    }
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}
