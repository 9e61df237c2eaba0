//! The daily run: pick unseen questions, write them to the store, and bring
//! the site up to date for today.
//!
//! ```text
//! list → select → for each: detail → solution → write → ledger
//!       → run log → regroup today → render → append manifest → push → notify
//! ```
//!
//! Per-question failures (detail lookup, write) are recorded in the run log
//! and never stop the loop. A failed completion only swaps the solution
//! section for a placeholder. Listing failures and manifest write failures
//! end the run. Once questions have been selected the run always ends with a
//! notification, even when every question failed.
//!
//! Progress is reported as [`DailyEvent`]s over an optional channel, formatted
//! for display by [`crate::output::format_daily_event`].

use crate::archive::{ArchiveIndex, Manifest};
use crate::batch;
use crate::completion::{Completion, PromptFields};
use crate::config::Config;
use crate::ledger::HistoryLedger;
use crate::notify::Notifier;
use crate::pipeline::{self, PipelineError, PublishStatus, RenderStats, Stage};
use crate::publish::{self, Publisher};
use crate::render::{self, ArchiveRenderer};
use crate::source::{self, QuestionDetail, QuestionSource, QuestionSummary};
use crate::store::{DocumentStore, WriteResult};
use crate::types::{Difficulty, Entry};
use chrono::{NaiveDate, NaiveDateTime};
use rand::Rng;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use tracing::{error, info, warn};

pub const NOTIFY_TITLE: &str = "LeetCode Job";
pub const NOTIFY_MESSAGE: &str = "job 执行完毕";

/// Progress of a daily run.
#[derive(Debug, Clone, PartialEq)]
pub enum DailyEvent {
    Selected {
        count: usize,
        wanted: usize,
    },
    QuestionStarted {
        index: usize,
        total: usize,
        frontend_id: String,
        title: String,
        difficulty: Difficulty,
    },
    QuestionSaved {
        index: usize,
        file: String,
        status: WriteResult,
        solved: bool,
    },
    QuestionFailed {
        index: usize,
        reason: String,
    },
}

/// Remote and side-effecting collaborators of a run.
#[derive(Clone, Copy)]
pub struct DailyDeps<'a> {
    pub source: &'a dyn QuestionSource,
    pub completion: Option<&'a dyn Completion>,
    pub publisher: Option<&'a dyn Publisher>,
    pub notifier: Option<&'a dyn Notifier>,
}

/// One line of `execution.log`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLog {
    date: NaiveDate,
    /// 1-based positions of failed questions.
    failed: Vec<usize>,
}

impl RunLog {
    pub fn new(date: NaiveDate, failed: Vec<usize>) -> Self {
        Self { date, failed }
    }

    /// `20250101 全部成功` or `20250101 第1题, 第3题失败`.
    pub fn line(&self) -> String {
        let date = self.date.format("%Y%m%d");
        if self.failed.is_empty() {
            return format!("{date} 全部成功");
        }
        let items = self
            .failed
            .iter()
            .map(|i| format!("第{i}题"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{date} {items}失败")
    }

    pub fn append(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", self.line())
    }
}

/// What a daily run did.
#[derive(Debug)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub wanted: usize,
    pub selected: usize,
    /// Entries written or already present, in selection order.
    pub entries: Vec<Entry>,
    pub created: usize,
    pub skipped: usize,
    /// 1-based positions of failed questions.
    pub failed: Vec<usize>,
    pub run_log: Option<String>,
    /// `None` when nothing new was written and the site was left alone.
    pub manifest: Option<Manifest>,
    pub render: RenderStats,
    pub publish: PublishStatus,
}

impl DailySummary {
    fn empty(date: NaiveDate, wanted: usize) -> Self {
        Self {
            date,
            wanted,
            selected: 0,
            entries: Vec::new(),
            created: 0,
            skipped: 0,
            failed: Vec::new(),
            run_log: None,
            manifest: None,
            render: RenderStats::default(),
            publish: PublishStatus::Skipped,
        }
    }
}

/// End-of-run notification; sent whether or not anything new was written.
fn notify_done(notifier: Option<&dyn Notifier>) {
    if let Some(notifier) = notifier {
        notifier.notify(NOTIFY_TITLE, NOTIFY_MESSAGE);
    }
}

fn emit(events: &Option<Sender<DailyEvent>>, event: DailyEvent) {
    if let Some(tx) = events {
        // A dropped receiver only loses display output.
        let _ = tx.send(event);
    }
}

/// Run the daily job against the project at `root`.
pub fn run_daily<R: Rng + ?Sized>(
    config: &Config,
    root: &Path,
    deps: DailyDeps<'_>,
    rng: &mut R,
    now: NaiveDateTime,
    events: Option<Sender<DailyEvent>>,
) -> Result<DailySummary, PipelineError> {
    let today = now.date();
    let wanted = config.selection.total();
    let mut ledger = HistoryLedger::load(config.history_path(root));
    info!(
        history = ledger.stats().total_selected,
        wanted, "starting daily run"
    );

    let all = deps.source.list_all()?;
    let picks = source::select_questions(&all, &config.selection, &ledger, rng);
    emit(
        &events,
        DailyEvent::Selected {
            count: picks.len(),
            wanted,
        },
    );
    let mut summary = DailySummary::empty(today, wanted);
    summary.selected = picks.len();
    if picks.is_empty() {
        warn!("no unseen questions left to select");
        return Ok(summary);
    }

    let store = DocumentStore::new(config.questions_path(root));
    let total = picks.len();
    for (i, pick) in picks.iter().enumerate() {
        let index = i + 1;
        emit(
            &events,
            DailyEvent::QuestionStarted {
                index,
                total,
                frontend_id: pick.frontend_id.clone(),
                title: pick.title.clone(),
                difficulty: pick.difficulty,
            },
        );
        match collect_one(config, &store, &mut ledger, deps, pick, now) {
            Ok((entry, status, solved)) => {
                match status {
                    WriteResult::Created => summary.created += 1,
                    WriteResult::Skipped => summary.skipped += 1,
                }
                let file = store
                    .path_for(&entry)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                emit(
                    &events,
                    DailyEvent::QuestionSaved {
                        index,
                        file,
                        status,
                        solved,
                    },
                );
                summary.entries.push(entry);
            }
            Err(reason) => {
                warn!(index, slug = %pick.title_slug, %reason, "question failed");
                emit(&events, DailyEvent::QuestionFailed { index, reason });
                summary.failed.push(index);
            }
        }
    }

    let run_log = RunLog::new(today, summary.failed.clone());
    let log_path = config.execution_log_path(root);
    if let Err(e) = run_log.append(&log_path) {
        error!(file = %log_path.display(), error = %e, "failed to append run log");
    }
    summary.run_log = Some(run_log.line());

    if summary.created == 0 {
        info!("no new documents; site left unchanged");
        notify_done(deps.notifier);
        return Ok(summary);
    }

    let site_dir = config.docs_path(root);
    let date_token = today.format("%Y%m%d").to_string();
    let batches = batch::group_date(store.scan()?, &date_token, config.archive.batch_size);
    let renderer = ArchiveRenderer::new(config.archive.strategy, &config.archive.site_title);
    let (records, render_stats) = pipeline::render_batches(&store, &renderer, &site_dir, &batches);
    summary.render = render_stats;

    info!(stage = %Stage::IndexUpdating, records = records.len(), "updating manifest");
    let manifest = ArchiveIndex::in_dir(&site_dir).append_incremental(records, now)?;
    render::write_site_shell(&site_dir, &config.archive.site_title, &config.colors)?;
    summary.manifest = Some(manifest);

    let changed: Vec<PathBuf> = vec![
        store.dir().to_path_buf(),
        site_dir,
        config.history_path(root),
    ];
    let message = publish::daily_commit_message(now, &summary.entries);
    summary.publish = pipeline::publish_site(deps.publisher, &changed, &message);

    notify_done(deps.notifier);
    Ok(summary)
}

/// Fetch, solve, and store one question. `Err` carries a display reason.
fn collect_one(
    config: &Config,
    store: &DocumentStore,
    ledger: &mut HistoryLedger,
    deps: DailyDeps<'_>,
    pick: &QuestionSummary,
    now: NaiveDateTime,
) -> Result<(Entry, WriteResult, bool), String> {
    let detail = match deps.source.detail(&pick.title_slug) {
        Ok(Some(d)) => d,
        Ok(None) => return Err(format!("no detail for {}", pick.title_slug)),
        Err(e) => return Err(e.to_string()),
    };

    let solution = solve(deps.completion, &detail);
    let solved = solution.is_some();
    let entry = detail.into_entry(&config.source.base_url, solution.as_deref(), now);

    let status = store.write(&entry).map_err(|e| e.to_string())?;
    ledger.add_at(&entry.question_id, now);
    Ok((entry, status, solved))
}

fn solve(completion: Option<&dyn Completion>, detail: &QuestionDetail) -> Option<String> {
    let completion = completion.filter(|c| c.is_available())?;
    let fields = PromptFields {
        title: detail.display_title(),
        difficulty: detail.difficulty.label(),
        content: detail.display_content(),
    };
    match completion.complete(&fields) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!(slug = %detail.title_slug, error = %e, "completion failed");
            None
        }
    }
}
