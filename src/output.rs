//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output leads with what a line is about: a question's number and title, a
//! batch's record id. File names come second, as indented `Source:` lines or
//! after a `→`. Log output (tracing, stderr) is separate; these lines are the
//! command's result on stdout.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! 2025-01-01
//!     20250101_000000 (4 documents)
//!         Source: 1_中等_题目1_20250101.md
//!         ...
//!     20250101_010000 (4 documents)
//!     20250101_020000 (1 document)
//!
//! 3 batches, 9 documents
//! ```
//!
//! ## Daily
//!
//! ```text
//! Selected 4 of 4 questions
//! [1/4] 1. 两数之和 (Easy)
//!     Saved: 1_简单_两数之和_20250101.md (solution)
//! [2/4] 2. 两数相加 (Medium)
//!     Failed: no detail for add-two-numbers
//! ...
//! Run log: 20250101 第2题失败
//! ```
//!
//! ## Rebuild
//!
//! ```text
//! 20250101_020000 (1 question)
//!     001 9. 题目9 → 20250101_020000_q1.html
//!
//! Removed 9 pages
//! Rendered 9 pages
//! Manifest: 3 records, 9 questions, 1 day
//! Publish: committed and pushed
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::archive::{ArchiveRecord, Manifest};
use crate::batch::Batch;
use crate::daily::{DailyEvent, DailySummary};
use crate::ledger::LedgerStats;
use crate::naming;
use crate::pipeline::{PublishStatus, RebuildSummary, RenderStats};
use crate::publish::PublishOutcome;
use crate::store::WriteResult;

// ============================================================================
// Shared helpers
// ============================================================================

/// `1 document` / `4 documents` / `2 batches`.
fn plural(n: usize, word: &str) -> String {
    match n {
        1 => format!("{n} {word}"),
        _ if word.ends_with("ch") => format!("{n} {word}es"),
        _ => format!("{n} {word}s"),
    }
}

/// `001 9. 回文数`: zero-padded position, then the question's own number.
pub fn question_line(position: usize, number: &str, title: &str) -> String {
    format!("{:03} {}. {}", position, number, title)
}

/// One-line description of the publish stage.
pub fn publish_line(status: &PublishStatus) -> String {
    match status {
        PublishStatus::Skipped => "Publish: skipped".to_string(),
        PublishStatus::Done(PublishOutcome::Committed) => "Publish: committed and pushed".to_string(),
        PublishStatus::Done(PublishOutcome::NothingToCommit) => {
            "Publish: nothing to commit, pushed".to_string()
        }
        PublishStatus::Failed(e) => format!("Publish: failed ({e})"),
    }
}

fn render_lines(stats: &RenderStats) -> Vec<String> {
    let mut line = format!("Rendered {}", plural(stats.pages_written, "page"));
    if stats.pages_failed > 0 {
        line.push_str(&format!(", {} failed", stats.pages_failed));
    }
    let mut lines = vec![line];
    if stats.unreadable > 0 {
        lines.push(format!(
            "Skipped {} (unreadable)",
            plural(stats.unreadable, "document")
        ));
    }
    lines
}

fn manifest_line(manifest: &Manifest) -> String {
    format!(
        "Manifest: {}, {}, {}",
        plural(manifest.records.len(), "record"),
        plural(manifest.total_questions(), "question"),
        plural(manifest.day_count(), "day")
    )
}

// ============================================================================
// Check
// ============================================================================

/// Batch plan grouped by date, with each batch's source documents.
pub fn format_batch_plan(batches: &[Batch]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_date: Option<&str> = None;

    for batch in batches {
        if current_date != Some(batch.date.as_str()) {
            if current_date.is_some() {
                lines.push(String::new());
            }
            lines.push(naming::display_date(&batch.date));
            current_date = Some(batch.date.as_str());
        }
        lines.push(format!(
            "    {} ({})",
            batch.record_id(),
            plural(batch.len(), "document")
        ));
        for doc in &batch.documents {
            lines.push(format!("        Source: {}", doc.name()));
        }
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    let documents: usize = batches.iter().map(Batch::len).sum();
    lines.push(format!(
        "{}, {}",
        plural(batches.len(), "batch"),
        plural(documents, "document")
    ));
    lines
}

pub fn print_batch_plan(batches: &[Batch]) {
    for line in format_batch_plan(batches) {
        println!("{}", line);
    }
}

// ============================================================================
// Rebuild
// ============================================================================

/// One record with its rendered pages.
pub fn format_record(record: &ArchiveRecord) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({})",
        record.record_id,
        plural(record.count, "question")
    )];
    for (i, q) in record.questions.iter().enumerate() {
        lines.push(format!(
            "    {} \u{2192} {}",
            question_line(i + 1, &q.number, &q.title),
            q.file
        ));
    }
    lines
}

pub fn format_rebuild_output(summary: &RebuildSummary) -> Vec<String> {
    let mut lines = Vec::new();
    for record in &summary.manifest.records {
        lines.extend(format_record(record));
    }
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!("Removed {}", plural(summary.removed_pages, "page")));
    lines.extend(render_lines(&summary.render));
    lines.push(manifest_line(&summary.manifest));
    lines.push(publish_line(&summary.publish));
    lines
}

pub fn print_rebuild_output(summary: &RebuildSummary) {
    for line in format_rebuild_output(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Daily
// ============================================================================

/// Format a single daily progress event as display lines.
pub fn format_daily_event(event: &DailyEvent) -> Vec<String> {
    match event {
        DailyEvent::Selected { count, wanted } => {
            vec![format!("Selected {} of {} questions", count, wanted)]
        }
        DailyEvent::QuestionStarted {
            index,
            total,
            frontend_id,
            title,
            difficulty,
        } => vec![format!(
            "[{}/{}] {}. {} ({})",
            index,
            total,
            frontend_id,
            title,
            difficulty.label()
        )],
        DailyEvent::QuestionSaved {
            file,
            status,
            solved,
            ..
        } => {
            let verb = match status {
                WriteResult::Created => "Saved",
                WriteResult::Skipped => "Exists",
            };
            let solution = if *solved { "solution" } else { "no solution" };
            vec![format!("    {}: {} ({})", verb, file, solution)]
        }
        DailyEvent::QuestionFailed { reason, .. } => vec![format!("    Failed: {}", reason)],
    }
}

pub fn format_daily_summary(summary: &DailySummary) -> Vec<String> {
    if summary.selected == 0 {
        return vec!["No unseen questions to collect".to_string()];
    }
    let mut lines = vec![String::new()];
    let mut counts = format!(
        "Collected {}: {} new, {} existing",
        plural(summary.entries.len(), "question"),
        summary.created,
        summary.skipped
    );
    if !summary.failed.is_empty() {
        counts.push_str(&format!(", {} failed", summary.failed.len()));
    }
    lines.push(counts);
    if let Some(log) = &summary.run_log {
        lines.push(format!("Run log: {}", log));
    }
    match &summary.manifest {
        Some(manifest) => {
            lines.extend(render_lines(&summary.render));
            lines.push(manifest_line(manifest));
            lines.push(publish_line(&summary.publish));
        }
        None => lines.push("Site unchanged".to_string()),
    }
    lines
}

pub fn print_daily_summary(summary: &DailySummary) {
    for line in format_daily_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// History
// ============================================================================

pub fn format_history(stats: &LedgerStats, last_updated: Option<&str>) -> Vec<String> {
    vec![
        format!("Selected: {}", plural(stats.total_selected, "question")),
        format!("Last updated: {}", last_updated.unwrap_or("never")),
    ]
}

pub fn print_history(stats: &LedgerStats, last_updated: Option<&str>) {
    for line in format_history(stats, last_updated) {
        println!("{}", line);
    }
}
