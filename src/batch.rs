//! Deterministic grouping of documents into dated batches.
//!
//! A batch is what the archive calls one "execution": up to `batch_size`
//! documents from the same collection date. The real run times are not
//! recoverable from the store, so each batch gets a synthetic time derived
//! from its position within the date:
//!
//! ```text
//! 20250101, 9 documents, batch_size = 4
//!   ordinal 0 → 20250101_000000  [doc1 doc2 doc3 doc4]
//!   ordinal 1 → 20250101_010000  [doc5 doc6 doc7 doc8]
//!   ordinal 2 → 20250101_020000  [doc9]
//! ```
//!
//! Documents are ordered by file name before chunking, so the same document
//! set always yields the same batches and identifiers regardless of the
//! order they were listed in.

use crate::naming;
use crate::store::DocumentRef;
use std::collections::BTreeMap;

/// Default number of documents per batch.
pub const DEFAULT_BATCH_SIZE: usize = 4;

/// A group of same-date documents with its synthetic identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Collection date token, `YYYYMMDD`.
    pub date: String,
    /// Synthetic time, `HH0000`.
    pub time: String,
    /// 0-based position within the date.
    pub ordinal: usize,
    /// Documents in file-name order.
    pub documents: Vec<DocumentRef>,
}

impl Batch {
    /// `{date}_{time}`.
    pub fn record_id(&self) -> String {
        naming::record_id(&self.date, &self.time)
    }

    /// `YYYY-MM-DD HH:MM:SS`, the manifest's sort key.
    pub fn display_datetime(&self) -> String {
        format!(
            "{} {}",
            naming::display_date(&self.date),
            naming::display_time(&self.time)
        )
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Group documents by date into batches of at most `batch_size`.
///
/// Documents without a valid trailing date token are left out. Dates are
/// emitted oldest first, batches within a date by ordinal.
///
/// # Panics
///
/// Panics if `batch_size` is zero; config validation rejects that value.
pub fn group<I>(documents: I, batch_size: usize) -> Vec<Batch>
where
    I: IntoIterator<Item = DocumentRef>,
{
    assert!(batch_size > 0, "batch_size must be at least 1");

    let mut by_date: BTreeMap<String, Vec<DocumentRef>> = BTreeMap::new();
    for doc in documents {
        if let Some(date) = doc.date() {
            by_date.entry(date.to_string()).or_default().push(doc);
        }
    }

    let mut batches = Vec::new();
    for (date, mut docs) in by_date {
        docs.sort_by(|a, b| a.name().cmp(b.name()));
        for (ordinal, chunk) in docs.chunks(batch_size).enumerate() {
            batches.push(Batch {
                date: date.clone(),
                time: naming::synthetic_time(ordinal),
                ordinal,
                documents: chunk.to_vec(),
            });
        }
    }
    batches
}

/// Batches of a single date, in ordinal order.
pub fn group_date<I>(documents: I, date: &str, batch_size: usize) -> Vec<Batch>
where
    I: IntoIterator<Item = DocumentRef>,
{
    group(
        documents.into_iter().filter(|d| d.date() == Some(date)),
        batch_size,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(names: &[&str]) -> Vec<DocumentRef> {
        names
            .iter()
            .map(|n| DocumentRef::from_path(format!("/store/{n}")))
            .collect()
    }

    fn nine_docs() -> Vec<DocumentRef> {
        let names: Vec<String> = (1..=9)
            .map(|i| format!("{i}_中等_q{i}_20250101.md"))
            .collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        docs(&refs)
    }

    #[test]
    fn nine_documents_make_three_batches() {
        let batches = group(nine_docs(), 4);
        let shape: Vec<(&str, usize)> = batches
            .iter()
            .map(|b| (b.time.as_str(), b.len()))
            .collect();
        assert_eq!(shape, vec![("000000", 4), ("010000", 4), ("020000", 1)]);
        assert_eq!(batches[1].record_id(), "20250101_010000");
        assert_eq!(batches[2].display_datetime(), "2025-01-01 02:00:00");
    }

    #[test]
    fn grouping_is_order_independent() {
        let forward = group(nine_docs(), 4);
        let mut reversed_input = nine_docs();
        reversed_input.reverse();
        let reversed = group(reversed_input, 4);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn documents_sorted_by_name_within_batch() {
        let batches = group(
            docs(&["b_简单_x_20250101.md", "a_简单_y_20250101.md"]),
            4,
        );
        let names: Vec<&str> = batches[0].documents.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["a_简单_y_20250101.md", "b_简单_x_20250101.md"]);
    }

    #[test]
    fn ordinals_restart_per_date() {
        let batches = group(
            docs(&[
                "1_简单_a_20250102.md",
                "2_简单_b_20250101.md",
                "3_简单_c_20250101.md",
            ]),
            1,
        );
        let ids: Vec<String> = batches.iter().map(Batch::record_id).collect();
        assert_eq!(
            ids,
            vec!["20250101_000000", "20250101_010000", "20250102_000000"]
        );
    }

    #[test]
    fn undated_documents_excluded() {
        let batches = group(
            docs(&["readme.md", "1_简单_a_2025.md", "2_简单_b_20250101.md"]),
            4,
        );
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 1);
    }

    #[test]
    fn group_date_filters_other_dates() {
        let batches = group_date(
            docs(&["1_简单_a_20250102.md", "2_简单_b_20250101.md"]),
            "20250102",
            4,
        );
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].date, "20250102");
    }

    #[test]
    fn empty_input_yields_no_batches() {
        assert!(group(Vec::new(), 4).is_empty());
    }
}
