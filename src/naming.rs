//! Centralized parsing for document names, headings, and batch identifiers.
//!
//! Every stored question document follows one naming pattern:
//!
//! ```text
//! {frontend_id}_{difficulty}_{title}_{YYYYMMDD}.md
//! 1_简单_两数之和_20250101.md
//! LCR 031_中等_LRU 缓存_20250102.md
//! ```
//!
//! Difficulty is always the second `_`-separated part and the collection date
//! is always the last one, so titles containing `_` still parse. Anything that
//! doesn't match the shape degrades instead of failing: difficulty falls back
//! to Medium and the document is left out of date grouping.
//!
//! All functions here are pure; the store and grouper call them at the edges.

use crate::types::{Difficulty, Entry};

/// Separator between the parts of a document name.
pub const NAME_SEPARATOR: char = '_';

/// Characters stripped from titles before they become part of a file name.
const UNSAFE_NAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Placeholder number when a document has no recognizable heading.
pub const UNKNOWN_NUMBER: &str = "Unknown";
/// Placeholder title when a document has no recognizable heading.
pub const UNKNOWN_TITLE: &str = "未知题目";

/// Result of parsing a document file stem like `1_简单_两数之和_20250101`.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentName {
    /// Difficulty from the second part, Medium when the name has fewer than
    /// four parts or the part isn't a known spelling.
    pub difficulty: Difficulty,
    /// Trailing `YYYYMMDD` token, if the name has a valid one.
    pub date: Option<String>,
}

/// Strip characters that are unsafe in file names and trim whitespace.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| !UNSAFE_NAME_CHARS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Canonical document file name for an entry.
pub fn document_file_name(entry: &Entry) -> String {
    format!(
        "{}_{}_{}_{}.md",
        entry.frontend_id,
        entry.difficulty.localized(),
        sanitize_title(&entry.title),
        entry.date_collected.format("%Y%m%d"),
    )
}

/// Parse a document file stem (name without `.md`).
pub fn parse_document_name(stem: &str) -> DocumentName {
    let parts: Vec<&str> = stem.split(NAME_SEPARATOR).collect();
    if parts.len() < 4 {
        return DocumentName {
            difficulty: Difficulty::Medium,
            date: None,
        };
    }
    let difficulty = Difficulty::parse(parts[1]).unwrap_or(Difficulty::Medium);
    let last = parts[parts.len() - 1];
    let date = is_date_token(last).then(|| last.to_string());
    DocumentName { difficulty, date }
}

/// True for exactly eight ASCII digits.
pub fn is_date_token(token: &str) -> bool {
    token.len() == 8 && token.bytes().all(|b| b.is_ascii_digit())
}

/// Find the first `# <number>. <title>` heading in a document body.
///
/// The number may contain word characters and spaces, so composite codes
/// like `LCR 031` are accepted. Returns `(number, title)`, both trimmed.
pub fn parse_heading(body: &str) -> Option<(String, String)> {
    body.lines().find_map(parse_heading_line)
}

fn parse_heading_line(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix('#')?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim_start();
    let dot = rest.find(|c: char| !(c.is_alphanumeric() || c == '_' || c.is_whitespace()))?;
    if !rest[dot..].starts_with('.') {
        return None;
    }
    let number = rest[..dot].trim();
    let after_dot = &rest[dot + 1..];
    if number.is_empty() || !after_dot.starts_with(char::is_whitespace) {
        return None;
    }
    let title = after_dot.trim();
    if title.is_empty() {
        return None;
    }
    Some((number.to_string(), title.to_string()))
}

/// First problem link (`https://<host>/problems/<slug>/`) in a document body.
pub fn find_problem_url(body: &str) -> Option<String> {
    let mut search = body;
    while let Some(start) = search.find("https://") {
        let candidate = &search[start..];
        let end = candidate
            .find(|c: char| c.is_whitespace() || c == ')')
            .unwrap_or(candidate.len());
        let url = &candidate[..end];
        if url.contains("/problems/") {
            return Some(url.to_string());
        }
        search = &candidate[end..];
    }
    None
}

/// Synthetic batch time for a 0-based ordinal within a date: `HH0000`.
pub fn synthetic_time(ordinal: usize) -> String {
    format!("{:02}0000", ordinal)
}

/// Batch record identifier: `{YYYYMMDD}_{HHMMSS}`.
pub fn record_id(date: &str, time: &str) -> String {
    format!("{}_{}", date, time)
}

/// `20250101` → `2025-01-01`. Inputs must be valid date tokens.
pub fn display_date(date: &str) -> String {
    format!("{}-{}-{}", &date[..4], &date[4..6], &date[6..8])
}

/// `010000` → `01:00:00`.
pub fn display_time(time: &str) -> String {
    format!("{}:{}:{}", &time[..2], &time[2..4], &time[4..6])
}
