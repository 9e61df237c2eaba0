//! Shared test utilities for the leetcode-daily test suite.
//!
//! Builders for entries and on-disk documents, plus lookups over manifests
//! and batch plans that panic with a readable message on a miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! seed_store(tmp.path(), "20250101", 9);
//!
//! let batches = batch::group(DocumentStore::new(tmp.path()).scan().unwrap(), 4);
//! assert_eq!(batch_shape(&batches), vec![("000000", 4), ("010000", 4), ("020000", 1)]);
//! ```

use chrono::NaiveDate;
use std::path::Path;

use crate::archive::{ArchiveRecord, Manifest};
use crate::batch::Batch;
use crate::types::{Difficulty, Entry};

// =========================================================================
// Builders
// =========================================================================

/// An entry collected on 2025-01-01 with `id` as both ids.
pub fn sample_entry(id: &str, difficulty: Difficulty, title: &str, body: &str) -> Entry {
    Entry {
        question_id: id.to_string(),
        frontend_id: id.to_string(),
        title: title.to_string(),
        difficulty,
        date_collected: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        body: body.to_string(),
        source_url: None,
    }
}

/// Minimal document body with a parseable heading and problem link.
pub fn document_body(number: &str, title: &str, slug: &str) -> String {
    format!(
        "# {number}. {title}\n\n**难度**: Medium\n\n**链接**: https://leetcode.cn/problems/{slug}/\n\n---\n\n## 题目描述\n\n{title} statement\n"
    )
}

/// Write a file directly into a store directory, bypassing naming.
pub fn write_document(dir: &Path, name: &str, body: &str) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join(name), body).unwrap();
}

/// Write `count` well-formed documents dated `date`, cycling difficulties.
///
/// Returns the file names in the order written.
pub fn seed_store(dir: &Path, date: &str, count: usize) -> Vec<String> {
    (1..=count)
        .map(|i| {
            let difficulty = Difficulty::ALL[i % 3];
            let name = format!("{i}_{}_题目{i}_{date}.md", difficulty.localized());
            write_document(dir, &name, &document_body(&i.to_string(), &format!("题目{i}"), &format!("q-{i}")));
            name
        })
        .collect()
}

// =========================================================================
// Lookups: panic with a clear message on miss
// =========================================================================

/// Find a manifest record by id. Panics if not found.
pub fn find_record<'a>(manifest: &'a Manifest, record_id: &str) -> &'a ArchiveRecord {
    manifest
        .records
        .iter()
        .find(|r| r.record_id == record_id)
        .unwrap_or_else(|| {
            let ids = record_ids(manifest);
            panic!("record '{record_id}' not found. Available: {ids:?}")
        })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// Record ids in manifest order.
pub fn record_ids(manifest: &Manifest) -> Vec<&str> {
    manifest.records.iter().map(|r| r.record_id.as_str()).collect()
}

/// `(time, len)` per batch, in plan order.
pub fn batch_shape(batches: &[Batch]) -> Vec<(&str, usize)> {
    batches.iter().map(|b| (b.time.as_str(), b.len())).collect()
}
