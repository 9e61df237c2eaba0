//! # LeetCode Daily
//!
//! Picks a few unseen practice questions every day, stores each as a Markdown
//! document, and keeps a static site that browses everything collected so far.
//! The document directory is the source of truth; the site can always be
//! regenerated from it.
//!
//! # Architecture: Two Flows Over One Store
//!
//! ```text
//! daily    list → select → fetch → solve → store → ledger
//!                                           ↓
//!          regroup today → render → append manifest → publish → notify
//!
//! rebuild  store → group all → clean pages → render → replace manifest → publish
//! ```
//!
//! Documents are grouped into batches by the date token in their file name.
//! A batch gets a synthetic record id (`20250101_010000` for the second batch
//! of the day); every rendered page and manifest row derives from it, so a
//! rebuild reproduces the same site from the same store.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`daily`] | The daily run and its run log |
//! | [`pipeline`] | Full rebuild, batch planning, shared render/publish stages |
//! | [`store`] | Flat directory of Markdown documents: write-once, scan, parse |
//! | [`batch`] | Date grouping and synthetic batch ids |
//! | [`render`] | Merged and per-item page strategies, site shell, Markdown → HTML |
//! | [`archive`] | `history.json` manifest: full and incremental updates, migration |
//! | [`ledger`] | Previously selected question ids |
//! | [`source`] | Problem-set client, selection, document layout |
//! | [`completion`] | Worked solutions from a chat-completions API |
//! | [`publish`] | git add/commit/push and commit messages |
//! | [`notify`] | End-of-run desktop notification |
//! | [`config`] | `config.toml` loading, stock defaults, validation, site colors |
//! | [`naming`] | Document file names, headings, batch ids |
//! | [`types`] | `Difficulty`, `Entry`, `ParsedEntry` |
//! | [`output`] | CLI output formatting |
//! | [`telemetry`] | tracing subscriber setup |
//!
//! # Failure Model
//!
//! Remote calls get one attempt each. A failed question is skipped and noted
//! in the run log; a failed page write leaves that page out of the manifest;
//! a failed push is reported and retried by the next run's push. Only invalid
//! configuration, a missing document directory, an unreachable problem list,
//! or a failed manifest write stop a command.

pub mod archive;
pub mod batch;
pub mod completion;
pub mod config;
pub mod daily;
pub mod ledger;
pub mod naming;
pub mod notify;
pub mod output;
pub mod pipeline;
pub mod publish;
pub mod render;
pub mod source;
pub mod store;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
