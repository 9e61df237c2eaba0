//! Shared types used across the ingestion and archive stages.
//!
//! [`Entry`] is what the daily run writes into the document store;
//! [`ParsedEntry`] is what the archive stages read back out of it. The two
//! are deliberately separate: the archive never trusts anything beyond what
//! can be recovered from a document's name and body, so a rebuild works on
//! documents written by any earlier version of the tool.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Question difficulty as reported by the problem-set service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[serde(alias = "Easy", alias = "简单")]
    Easy,
    #[serde(alias = "Medium", alias = "中等")]
    Medium,
    #[serde(alias = "Hard", alias = "困难")]
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Localized label used in document names and on rendered badges.
    pub fn localized(self) -> &'static str {
        match self {
            Difficulty::Easy => "简单",
            Difficulty::Medium => "中等",
            Difficulty::Hard => "困难",
        }
    }

    /// English label as the service spells it (`Easy`, `Medium`, `Hard`).
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// CSS-friendly slug (`easy`, `medium`, `hard`), also the manifest value.
    pub fn slug(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Accepts the localized, English, and slug spellings.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "简单" | "Easy" | "easy" => Some(Difficulty::Easy),
            "中等" | "Medium" | "medium" => Some(Difficulty::Medium),
            "困难" | "Hard" | "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Map the numeric level used by the problem list endpoint (1/2/3).
    pub fn from_level(level: u8) -> Self {
        match level {
            2 => Difficulty::Medium,
            3 => Difficulty::Hard,
            _ => Difficulty::Easy,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One practice question, fully materialized and ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Stable identifier used by the history ledger.
    pub question_id: String,
    /// Display identifier (`1`, `LCR 031`, ...).
    pub frontend_id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub date_collected: NaiveDate,
    /// Rendered Markdown document.
    pub body: String,
    pub source_url: Option<String>,
}

/// Fields recovered from a stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEntry {
    /// Question number from the heading, `"Unknown"` when absent.
    pub number: String,
    /// Title from the heading, `"未知题目"` when absent.
    pub title: String,
    pub difficulty: Difficulty,
    /// First problem link found in the body.
    pub url: Option<String>,
    pub raw_body: String,
}
