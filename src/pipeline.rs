//! Archive rebuild: store → batches → pages → manifest → site shell → push.
//!
//! ```text
//! Idle → Scanning → Grouping → Rendering → IndexUpdating → Publishing → Idle
//! ```
//!
//! No stage rolls back an earlier one. Every stage is idempotent (pages are
//! rewritten, the manifest is replaced) so re-running after a partial failure
//! converges on the same site.
//!
//! Item-level problems (an unreadable document, a page that fails to write)
//! are logged and counted; only a missing store directory or a failed
//! manifest write stop the run.

use crate::archive::{ArchiveError, ArchiveIndex, ArchiveRecord, Manifest};
use crate::batch::{self, Batch};
use crate::config::{Config, PageStrategy};
use crate::publish::{self, PublishError, PublishOutcome, Publisher};
use crate::render::{self, ArchiveRenderer, BatchEntry, RenderError};
use crate::store::{DocumentStore, StoreError};
use chrono::NaiveDateTime;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("Source error: {0}")]
    Source(#[from] crate::source::SourceError),
}

/// Where a run currently is; carried on log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Scanning,
    Grouping,
    Rendering,
    IndexUpdating,
    Publishing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Scanning => "scanning",
            Stage::Grouping => "grouping",
            Stage::Rendering => "rendering",
            Stage::IndexUpdating => "index-updating",
            Stage::Publishing => "publishing",
        })
    }
}

/// Result of the optional publishing stage.
#[derive(Debug)]
pub enum PublishStatus {
    /// Publishing disabled, not configured, or nothing new to publish.
    Skipped,
    Done(PublishOutcome),
    /// Logged and reported; never fails the run.
    Failed(PublishError),
}

/// Counters from rendering a set of batches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub pages_written: usize,
    pub pages_failed: usize,
    /// Documents that could not be read.
    pub unreadable: usize,
}

/// What a rebuild did.
#[derive(Debug)]
pub struct RebuildSummary {
    pub documents: usize,
    pub batches: Vec<Batch>,
    pub removed_pages: usize,
    pub render: RenderStats,
    pub manifest: Manifest,
    pub publish: PublishStatus,
}

/// Scan the store and group it. Writes nothing.
pub fn plan(store: &DocumentStore, batch_size: usize) -> Result<Vec<Batch>, PipelineError> {
    info!(stage = %Stage::Scanning, dir = %store.dir().display(), "scanning documents");
    let docs = store.scan()?;
    info!(stage = %Stage::Grouping, batch_size, "grouping into batches");
    Ok(batch::group(docs, batch_size))
}

/// Read each batch's documents and write its pages. Returns manifest records
/// for the batches that produced at least one page.
pub fn render_batches(
    store: &DocumentStore,
    renderer: &ArchiveRenderer,
    site_dir: &Path,
    batches: &[Batch],
) -> (Vec<ArchiveRecord>, RenderStats) {
    info!(stage = %Stage::Rendering, batches = batches.len(), "rendering pages");
    let mut records = Vec::with_capacity(batches.len());
    let mut stats = RenderStats::default();

    for batch in batches {
        let entries: Vec<BatchEntry> = batch
            .documents
            .iter()
            .enumerate()
            .filter_map(|(idx, doc)| match store.parse(doc) {
                Ok(entry) => Some(BatchEntry {
                    position: idx + 1,
                    entry,
                }),
                Err(e) => {
                    warn!(file = %doc.name(), error = %e, "skipping unreadable document");
                    stats.unreadable += 1;
                    None
                }
            })
            .collect();

        let output = renderer.write_batch(site_dir, batch, &entries);
        stats.pages_written += output.pages_written;
        stats.pages_failed += output.pages_failed;
        match output.record {
            Some(record) => records.push(record),
            None => warn!(record_id = %batch.record_id(), "batch produced no pages"),
        }
    }
    (records, stats)
}

/// Run the publisher, turning failures into a [`PublishStatus`].
pub fn publish_site(
    publisher: Option<&dyn Publisher>,
    paths: &[PathBuf],
    message: &str,
) -> PublishStatus {
    let Some(publisher) = publisher else {
        return PublishStatus::Skipped;
    };
    info!(stage = %Stage::Publishing, "publishing site");
    match publisher.publish(paths, message) {
        Ok(outcome) => PublishStatus::Done(outcome),
        Err(e) => {
            error!(error = %e, "publish failed");
            PublishStatus::Failed(e)
        }
    }
}

/// Delete all rendered pages and regenerate the whole site from the store.
pub fn rebuild(
    config: &Config,
    root: &Path,
    strategy: PageStrategy,
    publisher: Option<&dyn Publisher>,
    now: NaiveDateTime,
) -> Result<RebuildSummary, PipelineError> {
    let store = DocumentStore::new(config.questions_path(root));
    let site_dir = config.docs_path(root);

    let batches = plan(&store, config.archive.batch_size)?;
    let documents = batches.iter().map(Batch::len).sum();

    let removed_pages = render::clean_rendered_pages(&site_dir)?;
    info!(removed_pages, "removed rendered pages");

    let renderer = ArchiveRenderer::new(strategy, &config.archive.site_title);
    let (records, render_stats) = render_batches(&store, &renderer, &site_dir, &batches);

    info!(stage = %Stage::IndexUpdating, records = records.len(), "writing manifest");
    let manifest = ArchiveIndex::in_dir(&site_dir).rebuild_full(records, now)?;
    render::write_site_shell(&site_dir, &config.archive.site_title, &config.colors)?;

    let message = publish::rebuild_commit_message(
        now,
        manifest.records.len(),
        manifest.total_questions(),
    );
    let publish = publish_site(publisher, &[site_dir], &message);

    Ok(RebuildSummary {
        documents,
        batches,
        removed_pages,
        render: render_stats,
        manifest,
        publish,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{batch_shape, find_record, record_ids, seed_store, write_document};
    use chrono::NaiveDate;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn project(docs: usize) -> (TempDir, Config) {
        let tmp = TempDir::new().unwrap();
        let config = Config::default();
        seed_store(&config.questions_path(tmp.path()), "20250101", docs);
        (tmp, config)
    }

    #[derive(Default)]
    struct RecordingPublisher {
        calls: RefCell<Vec<(Vec<PathBuf>, String)>>,
        fail: bool,
    }

    impl Publisher for RecordingPublisher {
        fn publish(&self, paths: &[PathBuf], message: &str) -> Result<PublishOutcome, PublishError> {
            self.calls.borrow_mut().push((paths.to_vec(), message.to_string()));
            if self.fail {
                return Err(PublishError::NotARepository(PathBuf::from("/nowhere")));
            }
            Ok(PublishOutcome::Committed)
        }
    }

    #[test]
    fn plan_reports_batches_without_writing() {
        let (tmp, config) = project(9);
        let store = DocumentStore::new(config.questions_path(tmp.path()));
        let batches = plan(&store, 4).unwrap();
        assert_eq!(batch_shape(&batches), vec![("000000", 4), ("010000", 4), ("020000", 1)]);
        assert!(!config.docs_path(tmp.path()).exists());
    }

    #[test]
    fn plan_missing_store_is_error() {
        let tmp = TempDir::new().unwrap();
        let store = DocumentStore::new(tmp.path().join("absent"));
        assert!(matches!(plan(&store, 4), Err(PipelineError::Store(StoreError::MissingDirectory(_)))));
    }

    #[test]
    fn rebuild_per_item() {
        let (tmp, config) = project(9);
        let summary = rebuild(&config, tmp.path(), PageStrategy::PerItem, None, now()).unwrap();

        assert_eq!(summary.documents, 9);
        assert_eq!(summary.render.pages_written, 9);
        assert_eq!(
            record_ids(&summary.manifest),
            vec!["20250101_020000", "20250101_010000", "20250101_000000"]
        );
        assert_eq!(summary.manifest.total_questions(), 9);
        assert!(matches!(summary.publish, PublishStatus::Skipped));

        let docs = config.docs_path(tmp.path());
        assert!(docs.join("20250101_020000_q1.html").exists());
        assert!(docs.join("index.html").exists());
        assert!(docs.join("css/style.css").exists());
        assert!(docs.join("js/app.js").exists());
    }

    #[test]
    fn rebuild_merged() {
        let (tmp, config) = project(5);
        let summary = rebuild(&config, tmp.path(), PageStrategy::Merged, None, now()).unwrap();
        assert_eq!(summary.render.pages_written, 2);
        let first = find_record(&summary.manifest, "20250101_000000");
        assert_eq!(first.file.as_deref(), Some("20250101_000000.html"));
        assert_eq!(first.count, 4);
    }

    #[test]
    fn rebuild_removes_stale_pages_and_is_repeatable() {
        let (tmp, config) = project(3);
        let docs = config.docs_path(tmp.path());
        fs::create_dir_all(&docs).unwrap();
        fs::write(docs.join("20240101_000000.html"), "stale").unwrap();

        let first = rebuild(&config, tmp.path(), PageStrategy::PerItem, None, now()).unwrap();
        assert_eq!(first.removed_pages, 1);
        assert!(!docs.join("20240101_000000.html").exists());

        let second = rebuild(&config, tmp.path(), PageStrategy::PerItem, None, now()).unwrap();
        assert_eq!(second.removed_pages, 3);
        assert_eq!(first.manifest, second.manifest);
    }

    #[test]
    fn rebuild_switching_strategy_leaves_no_old_pages() {
        let (tmp, config) = project(2);
        rebuild(&config, tmp.path(), PageStrategy::Merged, None, now()).unwrap();
        rebuild(&config, tmp.path(), PageStrategy::PerItem, None, now()).unwrap();
        assert!(!config.docs_path(tmp.path()).join("20250101_000000.html").exists());
    }

    #[test]
    fn undated_and_malformed_documents() {
        let (tmp, config) = project(1);
        let store_dir = config.questions_path(tmp.path());
        write_document(&store_dir, "README.md", "# notes");
        write_document(&store_dir, "2_简单_无标题_20250101.md", "no heading");

        let summary = rebuild(&config, tmp.path(), PageStrategy::PerItem, None, now()).unwrap();
        assert_eq!(summary.documents, 2);
        let record = find_record(&summary.manifest, "20250101_000000");
        assert!(record.questions.iter().any(|q| q.number == "Unknown" && q.title == "未知题目"));
    }

    #[test]
    fn unreadable_document_keeps_later_page_names() {
        let tmp = TempDir::new().unwrap();
        let config = Config::default();
        let store_dir = config.questions_path(tmp.path());
        let names = seed_store(&store_dir, "20250101", 3);
        fs::write(store_dir.join(&names[1]), [0xff, 0xfe, 0xfd]).unwrap();

        let summary = rebuild(&config, tmp.path(), PageStrategy::PerItem, None, now()).unwrap();
        assert_eq!(summary.render.unreadable, 1);
        assert_eq!(summary.render.pages_written, 2);

        let record = find_record(&summary.manifest, "20250101_000000");
        let files: Vec<(&str, &str)> = record
            .questions
            .iter()
            .map(|q| (q.number.as_str(), q.file.as_str()))
            .collect();
        assert_eq!(
            files,
            vec![
                ("1", "20250101_000000_q1.html"),
                ("3", "20250101_000000_q3.html"),
            ]
        );
        let docs = config.docs_path(tmp.path());
        assert!(!docs.join("20250101_000000_q2.html").exists());
    }

    #[test]
    fn rebuild_publishes_site_dir() {
        let (tmp, config) = project(4);
        let publisher = RecordingPublisher::default();
        let summary = rebuild(&config, tmp.path(), PageStrategy::PerItem, Some(&publisher as &dyn Publisher), now()).unwrap();
        assert!(matches!(summary.publish, PublishStatus::Done(PublishOutcome::Committed)));

        let calls = publisher.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, vec![config.docs_path(tmp.path())]);
        assert!(calls[0].1.contains("1 条记录 · 4 道题目"));
    }

    #[test]
    fn publish_failure_does_not_fail_rebuild() {
        let (tmp, config) = project(1);
        let publisher = RecordingPublisher {
            fail: true,
            ..Default::default()
        };
        let summary = rebuild(&config, tmp.path(), PageStrategy::PerItem, Some(&publisher as &dyn Publisher), now()).unwrap();
        assert!(matches!(summary.publish, PublishStatus::Failed(_)));
        assert!(ArchiveIndex::in_dir(&config.docs_path(tmp.path())).path().exists());
    }
}
