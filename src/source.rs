//! Problem-set service: listing, detail lookup, selection, and the document
//! layout an [`Entry`] is built from.
//!
//! Two endpoints are used:
//!
//! - `GET {base}/api/problems/all/`: every problem with its numeric
//!   difficulty level (`stat_status_pairs`).
//! - `POST {base}/graphql`: the `questionData` query for one problem's
//!   statement, tags, code templates, hints and sample input.
//!
//! Payloads are deserialized into typed structs with explicit `Option`s for
//! everything the service may omit or null out. Localized fields
//! (`translatedTitle`, `translatedContent`, tag `translatedName`) win when a
//! [`QuestionDetail`] is resolved into an [`Entry`]; nothing past this module
//! sees the raw payload.

use crate::config::{SelectionConfig, SourceConfig};
use crate::ledger::{HistoryLedger, TIMESTAMP_FORMAT};
use crate::types::{Difficulty, Entry};
use chrono::NaiveDateTime;
use rand::Rng;
use rand::seq::SliceRandom;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, REFERER, USER_AGENT};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};

const USER_AGENT_VALUE: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 leetcode-daily";

/// Languages whose code templates are copied into documents, in order.
pub const TEMPLATE_LANGUAGES: &[&str] = &["python3", "java", "cpp", "javascript", "golang"];

/// Body of the solution section when no solution could be generated.
pub const MISSING_SOLUTION_NOTE: &str = "*DeepSeek API 未配置或调用失败*";

const QUESTION_QUERY: &str = r#"
query questionData($titleSlug: String!) {
    question(titleSlug: $titleSlug) {
        questionId
        questionFrontendId
        title
        titleSlug
        content
        translatedTitle
        translatedContent
        difficulty
        topicTags { name translatedName }
        codeSnippets { lang langSlug code }
        sampleTestCase
        hints
    }
}
"#;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One row of the problem list.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionSummary {
    /// Internal id; the history ledger key.
    pub question_id: String,
    pub frontend_id: String,
    pub title_slug: String,
    pub title: String,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopicTag {
    pub name: String,
    #[serde(default, rename = "translatedName")]
    pub translated_name: Option<String>,
}

impl TopicTag {
    pub fn display_name(&self) -> &str {
        non_empty(self.translated_name.as_deref()).unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSnippet {
    pub lang: String,
    pub lang_slug: String,
    pub code: String,
}

/// The `question` object of the detail query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDetail {
    pub question_id: String,
    #[serde(rename = "questionFrontendId")]
    pub frontend_id: String,
    pub title: String,
    pub title_slug: String,
    #[serde(default)]
    pub translated_title: Option<String>,
    /// Statement HTML; null for locked questions.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub translated_content: Option<String>,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub topic_tags: Option<Vec<TopicTag>>,
    #[serde(default)]
    pub code_snippets: Option<Vec<CodeSnippet>>,
    #[serde(default)]
    pub hints: Option<Vec<String>>,
    #[serde(default)]
    pub sample_test_case: Option<String>,
}

impl QuestionDetail {
    /// Localized title when present.
    pub fn display_title(&self) -> &str {
        non_empty(self.translated_title.as_deref()).unwrap_or(&self.title)
    }

    /// Localized statement when present, empty when locked.
    pub fn display_content(&self) -> &str {
        non_empty(self.translated_content.as_deref())
            .or(self.content.as_deref())
            .unwrap_or("")
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.topic_tags
            .iter()
            .flatten()
            .map(TopicTag::display_name)
    }

    /// Snippets for [`TEMPLATE_LANGUAGES`], in the service's order.
    pub fn templates(&self) -> impl Iterator<Item = &CodeSnippet> {
        self.code_snippets
            .iter()
            .flatten()
            .filter(|s| TEMPLATE_LANGUAGES.contains(&s.lang_slug.as_str()))
    }

    /// Resolve into an [`Entry`] collected at `fetched_at`.
    pub fn into_entry(
        self,
        base_url: &str,
        solution: Option<&str>,
        fetched_at: NaiveDateTime,
    ) -> Entry {
        let url = problem_url(base_url, &self.title_slug);
        let body = compose_document(&self, &url, solution, fetched_at);
        Entry {
            title: self.display_title().to_string(),
            question_id: self.question_id,
            frontend_id: self.frontend_id,
            difficulty: self.difficulty,
            date_collected: fetched_at.date(),
            body,
            source_url: Some(url),
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.trim().is_empty())
}

/// `https://leetcode.cn/problems/two-sum/`
pub fn problem_url(base_url: &str, slug: &str) -> String {
    format!("{}/problems/{}/", base_url.trim_end_matches('/'), slug)
}

/// Markdown document for a question.
pub fn compose_document(
    detail: &QuestionDetail,
    url: &str,
    solution: Option<&str>,
    fetched_at: NaiveDateTime,
) -> String {
    let tags: Vec<&str> = detail.tags().collect();
    let mut doc = format!(
        "# {}. {}\n\n**难度**: {}\n\n**标签**: {}\n\n**链接**: {}\n\n---\n\n## 题目描述\n\n{}\n\n---\n\n## 代码模板\n\n",
        detail.frontend_id,
        detail.display_title(),
        detail.difficulty.label(),
        tags.join(", "),
        url,
        detail.display_content(),
    );

    for snippet in detail.templates() {
        doc.push_str(&format!(
            "\n### {}\n\n```{}\n{}\n```\n",
            snippet.lang, snippet.lang_slug, snippet.code
        ));
    }

    let hints = detail.hints.as_deref().unwrap_or_default();
    if !hints.is_empty() {
        doc.push_str("\n---\n\n## 提示\n\n");
        for (i, hint) in hints.iter().enumerate() {
            doc.push_str(&format!("{}. {}\n", i + 1, hint));
        }
    }

    if let Some(case) = non_empty(detail.sample_test_case.as_deref()) {
        doc.push_str(&format!("\n---\n\n## 示例测试用例\n\n```\n{case}\n```\n"));
    }

    doc.push_str(&match non_empty(solution) {
        Some(text) => format!("\n---\n\n## AI 解答 (DeepSeek)\n\n{text}\n"),
        None => format!("\n---\n\n## AI 解答\n\n{MISSING_SOLUTION_NOTE}\n"),
    });

    doc.push_str(&format!(
        "\n---\n\n*获取时间: {}*\n",
        fetched_at.format(TIMESTAMP_FORMAT)
    ));
    doc
}

// ============================================================================
// Selection
// ============================================================================

/// Pick questions per difficulty, skipping anything already in the ledger.
///
/// Difficulties are visited Easy, Medium, Hard. When fewer candidates remain
/// than requested, the shortfall is logged and all remaining are taken.
pub fn select_questions<R: Rng + ?Sized>(
    all: &[QuestionSummary],
    selection: &SelectionConfig,
    ledger: &HistoryLedger,
    rng: &mut R,
) -> Vec<QuestionSummary> {
    let mut picked = Vec::new();
    for (difficulty, wanted) in [
        (Difficulty::Easy, selection.easy),
        (Difficulty::Medium, selection.medium),
        (Difficulty::Hard, selection.hard),
    ] {
        if wanted == 0 {
            continue;
        }
        let available: Vec<&QuestionSummary> = all
            .iter()
            .filter(|q| q.difficulty == difficulty && !ledger.contains(&q.question_id))
            .collect();
        if available.len() < wanted {
            warn!(
                difficulty = %difficulty,
                available = available.len(),
                wanted,
                "not enough unseen questions"
            );
        }
        picked.extend(
            available
                .choose_multiple(rng, wanted)
                .map(|q| (*q).clone()),
        );
    }
    picked
}

// ============================================================================
// Remote source
// ============================================================================

/// Where questions come from.
pub trait QuestionSource {
    /// Every listed problem.
    fn list_all(&self) -> Result<Vec<QuestionSummary>, SourceError>;
    /// Full detail for a slug; `Ok(None)` when the service has no such question.
    fn detail(&self, slug: &str) -> Result<Option<QuestionDetail>, SourceError>;
}

/// Blocking client for the public problem-set API.
pub struct LeetCodeClient {
    client: Client,
    base_url: String,
    list_timeout: Duration,
    detail_timeout: Duration,
}

impl LeetCodeClient {
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        let client = Client::builder().user_agent(USER_AGENT_VALUE).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            list_timeout: Duration::from_secs(config.list_timeout_secs),
            detail_timeout: Duration::from_secs(config.detail_timeout_secs),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn referer(&self) -> String {
        format!("{}/problemset/all/", self.base_url)
    }
}

impl QuestionSource for LeetCodeClient {
    #[instrument(level = "debug", skip(self))]
    fn list_all(&self) -> Result<Vec<QuestionSummary>, SourceError> {
        let url = format!("{}/api/problems/all/", self.base_url);
        let res = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .header(REFERER, self.referer())
            .timeout(self.list_timeout)
            .send()?;
        if !res.status().is_success() {
            return Err(SourceError::Status {
                status: res.status().as_u16(),
                url,
            });
        }
        let questions = parse_problem_list(&res.text()?)?;
        debug!(count = questions.len(), "fetched problem list");
        Ok(questions)
    }

    #[instrument(level = "debug", skip(self))]
    fn detail(&self, slug: &str) -> Result<Option<QuestionDetail>, SourceError> {
        let url = format!("{}/graphql", self.base_url);
        let payload = json!({
            "query": QUESTION_QUERY,
            "variables": { "titleSlug": slug },
        });
        let res = self
            .client
            .post(&url)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(REFERER, self.referer())
            .timeout(self.detail_timeout)
            .json(&payload)
            .send()?;
        if !res.status().is_success() {
            return Err(SourceError::Status {
                status: res.status().as_u16(),
                url,
            });
        }
        parse_question_detail(&res.text()?)
    }
}

// Wire shapes ----------------------------------------------------------------

#[derive(Deserialize)]
struct ProblemList {
    #[serde(default)]
    stat_status_pairs: Vec<StatStatusPair>,
}

#[derive(Deserialize)]
struct StatStatusPair {
    stat: Stat,
    #[serde(default)]
    difficulty: Option<Level>,
}

#[derive(Deserialize)]
struct Stat {
    question_id: IdValue,
    frontend_question_id: IdValue,
    #[serde(default, rename = "question__title")]
    title: Option<String>,
    #[serde(rename = "question__title_slug")]
    title_slug: String,
}

#[derive(Deserialize)]
struct Level {
    level: u8,
}

/// Ids arrive as numbers on some deployments and strings on others.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdValue {
    Num(u64),
    Str(String),
}

impl IdValue {
    fn into_string(self) -> String {
        match self {
            IdValue::Num(n) => n.to_string(),
            IdValue::Str(s) => s,
        }
    }
}

#[derive(Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<QuestionData>,
    #[serde(default)]
    errors: Option<Vec<serde_json::Value>>,
}

#[derive(Deserialize)]
struct QuestionData {
    question: Option<QuestionDetail>,
}

/// Parse the problem list endpoint's body.
pub fn parse_problem_list(body: &str) -> Result<Vec<QuestionSummary>, SourceError> {
    let list: ProblemList = serde_json::from_str(body)?;
    Ok(list
        .stat_status_pairs
        .into_iter()
        .map(|pair| {
            let slug = pair.stat.title_slug;
            let title = non_empty(pair.stat.title.as_deref())
                .map(str::to_string)
                .unwrap_or_else(|| title_from_slug(&slug));
            QuestionSummary {
                question_id: pair.stat.question_id.into_string(),
                frontend_id: pair.stat.frontend_question_id.into_string(),
                title,
                title_slug: slug,
                difficulty: Difficulty::from_level(pair.difficulty.map_or(1, |d| d.level)),
            }
        })
        .collect())
}

/// Parse the detail query's body. GraphQL errors or a null question → `None`.
pub fn parse_question_detail(body: &str) -> Result<Option<QuestionDetail>, SourceError> {
    let response: GraphQlResponse = serde_json::from_str(body)?;
    if let Some(errors) = response.errors.filter(|e| !e.is_empty()) {
        warn!(errors = errors.len(), "detail query returned errors");
        return Ok(None);
    }
    Ok(response.data.and_then(|d| d.question))
}

/// `two-sum` → `Two Sum`
fn title_from_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tempfile::TempDir;

    const LIST_JSON: &str = r#"{
      "stat_status_pairs": [
        {"stat": {"question_id": 1, "frontend_question_id": 1,
                  "question__title": "Two Sum", "question__title_slug": "two-sum"},
         "difficulty": {"level": 1}},
        {"stat": {"question_id": 1000229, "frontend_question_id": "LCR 031",
                  "question__title_slug": "lru-cache-lcci"},
         "difficulty": {"level": 2}},
        {"stat": {"question_id": 42, "frontend_question_id": 42,
                  "question__title": "", "question__title_slug": "trapping-rain-water"},
         "difficulty": {"level": 3}}
      ]
    }"#;

    const DETAIL_JSON: &str = r#"{
      "data": {"question": {
        "questionId": "1", "questionFrontendId": "1",
        "title": "Two Sum", "titleSlug": "two-sum",
        "content": "<p>Given an array</p>",
        "translatedTitle": "两数之和",
        "translatedContent": "<p>给定一个整数数组</p>",
        "difficulty": "Easy",
        "topicTags": [{"name": "Array", "translatedName": "数组"},
                      {"name": "Hash Table", "translatedName": null}],
        "codeSnippets": [
          {"lang": "C++", "langSlug": "cpp", "code": "class Solution {};"},
          {"lang": "Rust", "langSlug": "rust", "code": "impl Solution {}"},
          {"lang": "Python3", "langSlug": "python3", "code": "class Solution:\n    pass"}
        ],
        "sampleTestCase": "[2,7,11,15]\n9",
        "hints": ["用哈希表", "一次遍历"]
      }}
    }"#;

    fn fetched_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn summary(id: &str, difficulty: Difficulty) -> QuestionSummary {
        QuestionSummary {
            question_id: id.to_string(),
            frontend_id: id.to_string(),
            title_slug: format!("q-{id}"),
            title: format!("Q {id}"),
            difficulty,
        }
    }

    #[test]
    fn problem_list_parses_numeric_and_string_ids() {
        let list = parse_problem_list(LIST_JSON).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].question_id, "1");
        assert_eq!(list[0].title, "Two Sum");
        assert_eq!(list[0].difficulty, Difficulty::Easy);
        assert_eq!(list[1].frontend_id, "LCR 031");
        assert_eq!(list[1].title, "Lru Cache Lcci");
        assert_eq!(list[1].difficulty, Difficulty::Medium);
        assert_eq!(list[2].title, "Trapping Rain Water");
        assert_eq!(list[2].difficulty, Difficulty::Hard);
    }

    #[test]
    fn problem_list_without_pairs_is_empty() {
        assert!(parse_problem_list("{}").unwrap().is_empty());
    }

    #[test]
    fn detail_prefers_translated_fields() {
        let detail = parse_question_detail(DETAIL_JSON).unwrap().unwrap();
        assert_eq!(detail.display_title(), "两数之和");
        assert_eq!(detail.display_content(), "<p>给定一个整数数组</p>");
        let tags: Vec<&str> = detail.tags().collect();
        assert_eq!(tags, vec!["数组", "Hash Table"]);
    }

    #[test]
    fn detail_with_errors_is_none() {
        let body = r#"{"data": {"question": null}, "errors": [{"message": "nope"}]}"#;
        assert!(parse_question_detail(body).unwrap().is_none());
        assert!(parse_question_detail(r#"{"data": {"question": null}}"#).unwrap().is_none());
    }

    #[test]
    fn detail_tolerates_nulls() {
        let body = r#"{"data": {"question": {
            "questionId": "9", "questionFrontendId": "9", "title": "Palindrome",
            "titleSlug": "palindrome-number", "content": null, "difficulty": "Easy",
            "topicTags": null, "codeSnippets": null, "hints": null, "sampleTestCase": null}}}"#;
        let detail = parse_question_detail(body).unwrap().unwrap();
        assert_eq!(detail.display_title(), "Palindrome");
        assert_eq!(detail.display_content(), "");
        assert_eq!(detail.templates().count(), 0);
    }

    #[test]
    fn document_layout() {
        let detail = parse_question_detail(DETAIL_JSON).unwrap().unwrap();
        let url = problem_url("https://leetcode.cn/", "two-sum");
        let doc = compose_document(&detail, &url, Some("思路：哈希表"), fetched_at());

        assert!(doc.starts_with("# 1. 两数之和\n\n**难度**: Easy\n"));
        assert!(doc.contains("**标签**: 数组, Hash Table"));
        assert!(doc.contains("**链接**: https://leetcode.cn/problems/two-sum/"));
        assert!(doc.contains("### C++\n\n```cpp\nclass Solution {};\n```"));
        assert!(doc.contains("```python3\nclass Solution:\n    pass\n```"));
        assert!(!doc.contains("rust"));
        assert!(doc.contains("## 提示\n\n1. 用哈希表\n2. 一次遍历\n"));
        assert!(doc.contains("## 示例测试用例\n\n```\n[2,7,11,15]\n9\n```"));
        assert!(doc.contains("## AI 解答 (DeepSeek)\n\n思路：哈希表\n"));
        assert!(doc.ends_with("*获取时间: 2025-01-01 09:30:00*\n"));
    }

    #[test]
    fn document_without_solution_has_placeholder() {
        let detail = parse_question_detail(DETAIL_JSON).unwrap().unwrap();
        let doc = compose_document(&detail, "u", None, fetched_at());
        assert!(doc.contains(MISSING_SOLUTION_NOTE));
        assert!(!doc.contains("(DeepSeek)"));
    }

    #[test]
    fn sparse_document_has_exact_sections() {
        let body = r#"{"data": {"question": {
            "questionId": "9", "questionFrontendId": "9", "title": "Palindrome",
            "titleSlug": "palindrome-number", "content": null, "difficulty": "Easy",
            "topicTags": null, "codeSnippets": null, "hints": [], "sampleTestCase": ""}}}"#;
        let detail = parse_question_detail(body).unwrap().unwrap();
        let doc = compose_document(&detail, "u", Some("  "), fetched_at());
        assert_eq!(
            doc,
            format!(
                "# 9. Palindrome\n\n**难度**: Easy\n\n**标签**: \n\n**链接**: u\n\n---\n\n\
                 ## 题目描述\n\n\n\n---\n\n## 代码模板\n\n\
                 \n---\n\n## AI 解答\n\n{MISSING_SOLUTION_NOTE}\n\
                 \n---\n\n*获取时间: 2025-01-01 09:30:00*\n"
            )
        );
    }

    #[test]
    fn entry_round_trips_through_naming() {
        let detail = parse_question_detail(DETAIL_JSON).unwrap().unwrap();
        let entry = detail.into_entry("https://leetcode.cn", None, fetched_at());
        assert_eq!(entry.question_id, "1");
        assert_eq!(entry.title, "两数之和");
        assert_eq!(entry.date_collected, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(
            crate::naming::parse_heading(&entry.body),
            Some(("1".to_string(), "两数之和".to_string()))
        );
        assert_eq!(
            crate::naming::find_problem_url(&entry.body),
            entry.source_url
        );
    }

    #[test]
    fn selection_respects_counts_and_ledger() {
        let tmp = TempDir::new().unwrap();
        let mut ledger = HistoryLedger::load(tmp.path().join("h.json"));
        ledger.add("e1");

        let all = vec![
            summary("e1", Difficulty::Easy),
            summary("e2", Difficulty::Easy),
            summary("m1", Difficulty::Medium),
            summary("m2", Difficulty::Medium),
            summary("m3", Difficulty::Medium),
            summary("h1", Difficulty::Hard),
        ];
        let mut rng = StdRng::seed_from_u64(7);
        let picked = select_questions(&all, &SelectionConfig::default(), &ledger, &mut rng);

        let ids: Vec<&str> = picked.iter().map(|q| q.question_id.as_str()).collect();
        assert_eq!(ids.len(), 4);
        assert_eq!(ids[0], "e2");
        assert!(ids[1].starts_with('m') && ids[2].starts_with('m'));
        assert_ne!(ids[1], ids[2]);
        assert_eq!(ids[3], "h1");
    }

    #[test]
    fn selection_shortfall_takes_what_is_left() {
        let tmp = TempDir::new().unwrap();
        let ledger = HistoryLedger::load(tmp.path().join("h.json"));
        let all = vec![summary("h1", Difficulty::Hard)];
        let selection = SelectionConfig {
            easy: 2,
            medium: 0,
            hard: 3,
        };
        let mut rng = StdRng::seed_from_u64(1);
        let picked = select_questions(&all, &selection, &ledger, &mut rng);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].question_id, "h1");
    }

    #[test]
    fn slug_titles() {
        assert_eq!(title_from_slug("two-sum"), "Two Sum");
        assert_eq!(title_from_slug("3sum"), "3sum");
    }
}
