//! Static site rendering for the archive.
//!
//! Turns a [`Batch`] of parsed documents into HTML pages. Two interchangeable
//! strategies decide the page layout:
//!
//! - [`MergedPageStrategy`]: one page per batch, `{date}_{time}.html`, with the
//!   question bodies separated by horizontal rules.
//! - [`PerItemPageStrategy`]: one page per question, `{record_id}_q{n}.html`
//!   (1-based), with a difficulty badge and a link to the problem.
//!
//! Strategies are pure and only produce [`RenderedPage`] values; writing is
//! done by [`ArchiveRenderer::write_batch`], which reports failures per page so
//! one bad write never stops the rest of the batch.
//!
//! ## Site shell
//!
//! Every site also gets a shared shell that browses `history.json` client-side:
//!
//! ```text
//! docs/
//! ├── index.html          # sidebar of days, batch list, question list
//! ├── css/style.css       # config colors + static/style.css
//! ├── js/app.js           # manifest browser (static/app.js)
//! ├── history.json        # see crate::archive
//! ├── 20250101_000000_q1.html
//! └── ...
//! ```
//!
//! Markdown is converted with pulldown-cmark (tables, strikethrough, heading
//! ids); page chrome is maud.

use crate::archive::{ArchiveItem, ArchiveRecord};
use crate::batch::Batch;
use crate::config::{self, ColorConfig, PageStrategy};
use crate::types::ParsedEntry;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html as md_html};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Site-relative path of the generated stylesheet.
pub const STYLESHEET_PATH: &str = "css/style.css";
/// Site-relative path of the manifest browser script.
pub const SCRIPT_PATH: &str = "js/app.js";
/// Shell page; never removed by [`clean_rendered_pages`].
pub const INDEX_PAGE: &str = "index.html";

/// Divider between question bodies on a merged page.
pub const MERGED_DIVIDER: &str = "\n\n---\n\n";

const CSS_STATIC: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/app.js");

/// One HTML file ready to be written into the site directory.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub file_name: String,
    pub html: String,
    /// Manifest items that point at this page.
    pub items: Vec<ArchiveItem>,
}

/// All pages for one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedBatch {
    pub pages: Vec<RenderedPage>,
    /// Page that holds the whole batch, for the merged layout.
    pub batch_file: Option<String>,
}

/// Result of writing a batch to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutput {
    /// Manifest record for the pages that were written; `None` if none were.
    pub record: Option<ArchiveRecord>,
    pub pages_written: usize,
    pub pages_failed: usize,
}

/// A parsed document together with its 1-based position in the batch.
///
/// Positions come from `Batch::documents`, so a document that failed to parse
/// leaves a gap instead of shifting the pages of its later siblings.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    pub position: usize,
    pub entry: ParsedEntry,
}

/// A page layout for batches.
pub trait RenderStrategy {
    fn render(&self, batch: &Batch, entries: &[BatchEntry], site_title: &str) -> RenderedBatch;
}

/// One page per batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergedPageStrategy;

impl RenderStrategy for MergedPageStrategy {
    fn render(&self, batch: &Batch, entries: &[BatchEntry], site_title: &str) -> RenderedBatch {
        if entries.is_empty() {
            return RenderedBatch {
                pages: Vec::new(),
                batch_file: None,
            };
        }
        let file_name = merged_page_name(batch);
        let combined = entries
            .iter()
            .map(|e| e.entry.raw_body.as_str())
            .collect::<Vec<_>>()
            .join(MERGED_DIVIDER);
        let html = render_merged_page(batch, &combined, site_title).into_string();
        let items = entries
            .iter()
            .map(|e| archive_item(&e.entry, &file_name))
            .collect();
        RenderedBatch {
            pages: vec![RenderedPage {
                file_name: file_name.clone(),
                html,
                items,
            }],
            batch_file: Some(file_name),
        }
    }
}

/// One page per question.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerItemPageStrategy;

impl RenderStrategy for PerItemPageStrategy {
    fn render(&self, batch: &Batch, entries: &[BatchEntry], site_title: &str) -> RenderedBatch {
        let pages = entries
            .iter()
            .map(|BatchEntry { position, entry }| {
                let file_name = item_page_name(batch, *position);
                let html = render_item_page(batch, entry, site_title).into_string();
                RenderedPage {
                    items: vec![archive_item(entry, &file_name)],
                    file_name,
                    html,
                }
            })
            .collect();
        RenderedBatch {
            pages,
            batch_file: None,
        }
    }
}

/// `{date}_{time}.html`
pub fn merged_page_name(batch: &Batch) -> String {
    format!("{}.html", batch.record_id())
}

/// `{record_id}_q{n}.html`, `n` 1-based.
pub fn item_page_name(batch: &Batch, n: usize) -> String {
    format!("{}_q{}.html", batch.record_id(), n)
}

fn archive_item(entry: &ParsedEntry, file_name: &str) -> ArchiveItem {
    ArchiveItem {
        number: entry.number.clone(),
        title: entry.title.clone(),
        difficulty: entry.difficulty,
        file: file_name.to_string(),
    }
}

/// Renders batches with the configured strategy and writes them out.
pub struct ArchiveRenderer {
    strategy: Box<dyn RenderStrategy>,
    site_title: String,
}

impl ArchiveRenderer {
    pub fn new(kind: PageStrategy, site_title: impl Into<String>) -> Self {
        let strategy: Box<dyn RenderStrategy> = match kind {
            PageStrategy::Merged => Box::new(MergedPageStrategy),
            PageStrategy::PerItem => Box::new(PerItemPageStrategy),
        };
        Self {
            strategy,
            site_title: site_title.into(),
        }
    }

    pub fn render(&self, batch: &Batch, entries: &[BatchEntry]) -> RenderedBatch {
        self.strategy.render(batch, entries, &self.site_title)
    }

    /// Render and write one batch. Failed pages are logged and left out of
    /// the returned record.
    pub fn write_batch(&self, site_dir: &Path, batch: &Batch, entries: &[BatchEntry]) -> BatchOutput {
        let rendered = self.render(batch, entries);
        let mut items = Vec::new();
        let mut pages_written = 0;
        let mut pages_failed = 0;
        let mut batch_file = None;

        for page in rendered.pages {
            let path = site_dir.join(&page.file_name);
            match write_page(&path, &page.html) {
                Ok(()) => {
                    debug!(file = %page.file_name, "wrote page");
                    pages_written += 1;
                    if rendered.batch_file.as_deref() == Some(page.file_name.as_str()) {
                        batch_file = Some(page.file_name);
                    }
                    items.extend(page.items);
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "failed to write page");
                    pages_failed += 1;
                }
            }
        }

        let record = (!items.is_empty()).then(|| ArchiveRecord::for_batch(batch, items, batch_file));
        BatchOutput {
            record,
            pages_written,
            pages_failed,
        }
    }
}

fn write_page(path: &Path, html: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, html)
}

/// Write `index.html`, the stylesheet and the script. Returns written paths.
pub fn write_site_shell(
    site_dir: &Path,
    site_title: &str,
    colors: &ColorConfig,
) -> Result<Vec<PathBuf>, RenderError> {
    fs::create_dir_all(site_dir.join("css"))?;
    fs::create_dir_all(site_dir.join("js"))?;

    let files = [
        (INDEX_PAGE, render_index(site_title).into_string()),
        (STYLESHEET_PATH, site_stylesheet(colors)),
        (SCRIPT_PATH, JS.to_string()),
    ];
    let mut written = Vec::with_capacity(files.len());
    for (rel, content) in files {
        let path = site_dir.join(rel);
        fs::write(&path, content)?;
        written.push(path);
    }
    Ok(written)
}

/// Config colors followed by the static stylesheet.
pub fn site_stylesheet(colors: &ColorConfig) -> String {
    format!("{}\n\n{}", config::generate_color_css(colors), CSS_STATIC)
}

/// Delete rendered pages (`*.html` except `index.html`) from the site root.
///
/// A missing directory counts as clean. Individual delete failures are logged.
pub fn clean_rendered_pages(site_dir: &Path) -> Result<usize, RenderError> {
    let entries = match fs::read_dir(site_dir) {
        Ok(e) => e,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };
    let mut removed = 0;
    for entry in entries {
        let path = entry?.path();
        let is_page = path.is_file()
            && path.extension().is_some_and(|e| e == "html")
            && path.file_name().is_some_and(|n| n != INDEX_PAGE);
        if !is_page {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) => warn!(file = %path.display(), error = %e, "failed to delete page"),
        }
    }
    Ok(removed)
}

// ============================================================================
// Markdown
// ============================================================================

/// Convert Markdown to HTML, giving every heading a slug id.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

    let mut events: Vec<Event> = Parser::new_ext(markdown, options).collect();
    let mut used: HashMap<String, usize> = HashMap::new();
    for i in 0..events.len() {
        if !matches!(&events[i], Event::Start(Tag::Heading { id: None, .. })) {
            continue;
        }
        let base = slugify(&heading_text(&events[i + 1..]));
        if base.is_empty() {
            continue;
        }
        let seen = used.entry(base.clone()).or_insert(0);
        let slug = if *seen == 0 {
            base
        } else {
            format!("{base}-{seen}")
        };
        *seen += 1;
        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(CowStr::from(slug));
        }
    }

    let mut out = String::new();
    md_html::push_html(&mut out, events.into_iter());
    out
}

fn heading_text(events: &[Event]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            _ => {}
        }
    }
    text
}

/// Lowercase, keep letters and digits (any script), join words with `-`.
fn slugify(text: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }
    slug
}

// ============================================================================
// HTML Components
// ============================================================================

fn base_document(title: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="zh-CN" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                link rel="stylesheet" href=(STYLESHEET_PATH);
            }
            body class=[body_class] {
                (content)
            }
        }
    }
}

fn top_bar(site_title: &str, right: &str) -> Markup {
    html! {
        header.top-bar {
            a.back-link href=(INDEX_PAGE) aria-label="返回" { "←" }
            a.logo href=(INDEX_PAGE) {
                span.logo-emoji { "📚" }
                span.logo-text { (site_title) }
            }
            span.update-time { (right) }
        }
    }
}

fn render_merged_page(batch: &Batch, markdown: &str, site_title: &str) -> Markup {
    let when = batch.display_datetime();
    let content = html! {
        (top_bar(site_title, &when))
        main.content-wrapper {
            article.content {
                h1 { "📅 " (when) " 每日题目" }
                (PreEscaped(markdown_to_html(markdown)))
            }
        }
    };
    base_document(&format!("{site_title} · {when}"), Some("page-merged"), content)
}

fn render_item_page(batch: &Batch, entry: &ParsedEntry, site_title: &str) -> Markup {
    let when = batch.display_datetime();
    let heading = format!("{}. {}", entry.number, entry.title);
    let content = html! {
        (top_bar(site_title, &when))
        main.content-wrapper {
            article.question-card {
                div.question-header {
                    span.question-number { (heading) }
                    span class={ "difficulty-badge difficulty-" (entry.difficulty.slug()) } {
                        (entry.difficulty.localized())
                    }
                    @if let Some(url) = &entry.url {
                        a.question-link href=(url) target="_blank" rel="noopener" { "在 LeetCode 打开" }
                    }
                }
                div.markdown-content {
                    (PreEscaped(markdown_to_html(&entry.raw_body)))
                }
            }
        }
    };
    base_document(&format!("{heading} - {site_title}"), Some("page-item"), content)
}

fn render_index(site_title: &str) -> Markup {
    let content = html! {
        header.top-bar {
            button #menuButton .menu-button aria-label="菜单" {
                span.menu-icon { span {} span {} span {} }
            }
            a.logo href=(INDEX_PAGE) {
                span.logo-emoji { "📚" }
                span.logo-text { (site_title) }
            }
            span #updateTime .update-time {}
        }
        aside #sidebar .sidebar {
            div.stats {
                div.stat {
                    span #totalQuestions .stat-value { "0" }
                    span.stat-label { "题目总数" }
                }
                div.stat {
                    span #continuousDays .stat-value { "0" }
                    span.stat-label { "打卡天数" }
                }
            }
            nav #historyList .history-list {}
        }
        div #sidebarOverlay .sidebar-overlay {}
        main.main-content {
            div.content-wrapper {
                section #recordListView {
                    h1 #contentTitle .content-title { "加载中..." }
                    p #contentSubtitle .content-subtitle {}
                    div #recordList .record-list {}
                }
                section #questionDetailView .detail-view {
                    button #backButton .back-button { "← 返回" }
                    h1 #detailTitle .content-title {}
                    p #detailSubtitle .content-subtitle {}
                    div #questionList .question-list {}
                }
            }
        }
        script src=(SCRIPT_PATH) {}
    };
    base_document(site_title, Some("page-index"), content)
}
