//! Run configuration.
//!
//! Loaded once from `config.toml` in the project root and passed by value to
//! every component constructor; nothing reads configuration from globals.
//! Stock defaults are overridden by whatever the file specifies, so a config
//! file only needs the keys it wants to change:
//!
//! ```toml
//! [selection]
//! hard = 2
//!
//! [completion]
//! enabled = true
//! api_key = "sk-..."
//! ```
//!
//! Unknown keys are rejected to catch typos early. A missing `config.toml`
//! means stock defaults; a file that fails to parse or validate aborts the
//! run.
//!
//! ## Sections
//!
//! | Section | Purpose |
//! |---------|---------|
//! | top level | store, site, ledger and run-log locations |
//! | `[selection]` | questions picked per difficulty per run |
//! | `[archive]` | batch size, page strategy, site title |
//! | `[source]` | problem-set endpoint and timeouts |
//! | `[completion]` | language-model solution generation |
//! | `[publish]` | git push of the rendered site |
//! | `[notify]` | desktop notification after a daily run |
//! | `[colors.light]`, `[colors.dark]` | site stylesheet variables |

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file inside the project root.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Credential value shipped in the stock config; treated as "not configured".
pub const PLACEHOLDER_API_KEY: &str = "YOUR_DEEPSEEK_API_KEY_HERE";
/// Username value shipped in the stock config; treated as "not configured".
pub const PLACEHOLDER_USERNAME: &str = "YOUR_GITHUB_USERNAME";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory of question documents, relative to the project root.
    pub questions_dir: String,
    /// Directory of the rendered site, relative to the project root.
    pub docs_dir: String,
    /// History ledger file, relative to the project root.
    pub history_file: String,
    /// Per-run result log, relative to the project root.
    pub execution_log: String,
    pub selection: SelectionConfig,
    pub archive: ArchiveConfig,
    pub source: SourceConfig,
    pub completion: CompletionConfig,
    pub publish: PublishConfig,
    pub notify: NotifyConfig,
    pub colors: ColorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            questions_dir: "leetcode_questions".to_string(),
            docs_dir: "docs".to_string(),
            history_file: "question_history.json".to_string(),
            execution_log: "execution.log".to_string(),
            selection: SelectionConfig::default(),
            archive: ArchiveConfig::default(),
            source: SourceConfig::default(),
            completion: CompletionConfig::default(),
            publish: PublishConfig::default(),
            notify: NotifyConfig::default(),
            colors: ColorConfig::default(),
        }
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("questions_dir", &self.questions_dir),
            ("docs_dir", &self.docs_dir),
            ("history_file", &self.history_file),
            ("execution_log", &self.execution_log),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if self.archive.batch_size == 0 {
            return Err(ConfigError::Validation(
                "archive.batch_size must be at least 1".into(),
            ));
        }
        if self.source.list_timeout_secs == 0 || self.source.detail_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "source timeouts must be at least 1 second".into(),
            ));
        }
        if self.completion.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "completion.timeout_secs must be at least 1".into(),
            ));
        }
        if self.publish.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "publish.timeout_secs must be at least 1".into(),
            ));
        }
        if self.publish.branch.trim().is_empty() || self.publish.remote.trim().is_empty() {
            return Err(ConfigError::Validation(
                "publish.remote and publish.branch must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn questions_path(&self, root: &Path) -> PathBuf {
        root.join(&self.questions_dir)
    }

    pub fn docs_path(&self, root: &Path) -> PathBuf {
        root.join(&self.docs_dir)
    }

    pub fn history_path(&self, root: &Path) -> PathBuf {
        root.join(&self.history_file)
    }

    pub fn execution_log_path(&self, root: &Path) -> PathBuf {
        root.join(&self.execution_log)
    }
}

/// Questions picked per difficulty on each daily run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectionConfig {
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            easy: 1,
            medium: 2,
            hard: 1,
        }
    }
}

impl SelectionConfig {
    pub fn total(&self) -> usize {
        self.easy + self.medium + self.hard
    }
}

/// How batches are turned into pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PageStrategy {
    /// One page per question; batches exist only in the manifest.
    PerItem,
    /// One page per batch with all questions concatenated.
    Merged,
}

/// Archive grouping and site settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveConfig {
    /// Documents per batch.
    pub batch_size: usize,
    pub strategy: PageStrategy,
    /// Site name shown in page headers and titles.
    pub site_title: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            batch_size: crate::batch::DEFAULT_BATCH_SIZE,
            strategy: PageStrategy::PerItem,
            site_title: "LeetCode 每日题目".to_string(),
        }
    }
}

/// Problem-set service endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// Site root; `/api/problems/all/` and `/graphql` are appended.
    pub base_url: String,
    pub list_timeout_secs: u64,
    pub detail_timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://leetcode.cn".to_string(),
            list_timeout_secs: 10,
            detail_timeout_secs: 15,
        }
    }
}

/// Language-model solution generation (OpenAI-compatible chat API).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompletionConfig {
    pub enabled: bool,
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Prompt with `{title}`, `{difficulty}` and `{content}` placeholders.
    pub prompt_template: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: PLACEHOLDER_API_KEY.to_string(),
            base_url: "https://api.deepseek.com/v1".to_string(),
            model: "deepseek-chat".to_string(),
            timeout_secs: 180,
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
        }
    }
}

impl CompletionConfig {
    /// Enabled and carrying a real credential.
    pub fn is_available(&self) -> bool {
        self.enabled && !self.api_key.trim().is_empty() && self.api_key != PLACEHOLDER_API_KEY
    }
}

const DEFAULT_PROMPT_TEMPLATE: &str = "请为以下 LeetCode 题目提供详细解答。\n\n\
题目：{title}\n难度：{difficulty}\n\n题目描述：\n{content}\n\n\
请给出：\n1. 解题思路\n2. Python3 代码实现（带注释）\n3. 时间复杂度与空间复杂度分析";

/// Publishing the rendered site with git.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishConfig {
    pub enabled: bool,
    /// Hosting account name; the placeholder value disables publishing.
    pub username: String,
    pub remote: String,
    pub branch: String,
    /// Public URL printed after a successful push.
    pub site_url: String,
    /// Deadline for each git command.
    pub timeout_secs: u64,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            username: PLACEHOLDER_USERNAME.to_string(),
            remote: "origin".to_string(),
            branch: "main".to_string(),
            site_url: String::new(),
            timeout_secs: 30,
        }
    }
}

impl PublishConfig {
    pub fn is_available(&self) -> bool {
        self.enabled && !self.username.trim().is_empty() && self.username != PLACEHOLDER_USERNAME
    }
}

/// Desktop notification after a daily run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotifyConfig {
    pub enabled: bool,
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Light mode color scheme.
    pub light: ColorScheme,
    /// Dark mode color scheme.
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    /// Page background.
    pub background: String,
    /// Card and sidebar surfaces.
    pub surface: String,
    /// Primary text color.
    pub text: String,
    /// Secondary text (timestamps, counts, subtitles).
    pub text_muted: String,
    pub border: String,
    /// Links and accents.
    pub primary: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#f8f9fa".to_string(),
            surface: "#ffffff".to_string(),
            text: "#202124".to_string(),
            text_muted: "#5f6368".to_string(),
            border: "#dadce0".to_string(),
            primary: "#1a73e8".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#202124".to_string(),
            surface: "#292a2d".to_string(),
            text: "#e8eaed".to_string(),
            text_muted: "#9aa0a6".to_string(),
            border: "#3c4043".to_string(),
            primary: "#8ab4f8".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// `Config::default()` as an untyped TOML tree, the layer user files sit on.
pub fn defaults_tree() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(Config::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Lay `overlay` over `base`. Nested tables combine key by key; any other
/// value in `overlay` wins outright.
pub fn merge_toml(mut base: toml::Value, overlay: toml::Value) -> toml::Value {
    overlay_onto(&mut base, overlay);
    base
}

fn overlay_onto(target: &mut toml::Value, overlay: toml::Value) {
    match (target, overlay) {
        (toml::Value::Table(slots), toml::Value::Table(incoming)) => {
            for (key, value) in incoming {
                match slots.get_mut(&key) {
                    Some(slot) => overlay_onto(slot, value),
                    None => {
                        slots.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// The user's `config.toml` under `root`, if there is one.
fn read_user_tree(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    match fs::read_to_string(root.join(CONFIG_FILENAME)) {
        Ok(text) => Ok(Some(toml::from_str(&text)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Load `{root}/config.toml` over the stock defaults and validate it.
///
/// A missing file yields the defaults. Unknown keys, malformed TOML, and
/// out-of-range values are errors.
pub fn load_config(root: &Path) -> Result<Config, ConfigError> {
    let tree = match read_user_tree(root)? {
        Some(user) => merge_toml(defaults_tree()?, user),
        None => defaults_tree()?,
    };
    let config: Config = tree.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# LeetCode Daily Configuration
# ============================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Question documents (Markdown), relative to the project root.
questions_dir = "leetcode_questions"

# Rendered static site, relative to the project root.
docs_dir = "docs"

# Ledger of every question ever selected, used to avoid repeats.
history_file = "question_history.json"

# One line appended per daily run with the per-question outcome.
execution_log = "execution.log"

# ---------------------------------------------------------------------------
# Questions picked per difficulty on each daily run
# ---------------------------------------------------------------------------
[selection]
easy = 1
medium = 2
hard = 1

# ---------------------------------------------------------------------------
# Archive site
# ---------------------------------------------------------------------------
[archive]
# Documents per batch. Each date's documents are sorted by name and split
# into batches of this size with synthetic times 00:00:00, 01:00:00, ...
batch_size = 4

# "per-item": one page per question. "merged": one page per batch.
strategy = "per-item"

site_title = "LeetCode 每日题目"

# ---------------------------------------------------------------------------
# Problem-set service
# ---------------------------------------------------------------------------
[source]
base_url = "https://leetcode.cn"
list_timeout_secs = 10
detail_timeout_secs = 15

# ---------------------------------------------------------------------------
# AI solutions (OpenAI-compatible chat completions)
# ---------------------------------------------------------------------------
[completion]
enabled = false
api_key = "YOUR_DEEPSEEK_API_KEY_HERE"
base_url = "https://api.deepseek.com/v1"
model = "deepseek-chat"
timeout_secs = 180
# Placeholders: {title}, {difficulty}, {content}
prompt_template = """请为以下 LeetCode 题目提供详细解答。

题目：{title}
难度：{difficulty}

题目描述：
{content}

请给出：
1. 解题思路
2. Python3 代码实现（带注释）
3. 时间复杂度与空间复杂度分析"""

# ---------------------------------------------------------------------------
# Publishing (git add / commit / push of the site and documents)
# ---------------------------------------------------------------------------
[publish]
enabled = false
username = "YOUR_GITHUB_USERNAME"
remote = "origin"
branch = "main"
site_url = ""
# Seconds each git command may run before it is killed.
timeout_secs = 30

# ---------------------------------------------------------------------------
# Desktop notification when a daily run finishes (macOS)
# ---------------------------------------------------------------------------
[notify]
enabled = false

# ---------------------------------------------------------------------------
# Site colors - light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#f8f9fa"
surface = "#ffffff"
text = "#202124"
text_muted = "#5f6368"
border = "#dadce0"
primary = "#1a73e8"

# ---------------------------------------------------------------------------
# Site colors - dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#202124"
surface = "#292a2d"
text = "#e8eaed"
text_muted = "#9aa0a6"
border = "#3c4043"
primary = "#8ab4f8"
"##
}

/// `:root` custom properties for the light scheme, overridden for dark mode.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        ":root {{\n{}}}\n\n@media (prefers-color-scheme: dark) {{\n    :root {{\n{}    }}\n}}",
        scheme_declarations(&colors.light, 4),
        scheme_declarations(&colors.dark, 8),
    )
}

fn scheme_declarations(scheme: &ColorScheme, indent: usize) -> String {
    [
        ("bg", &scheme.background),
        ("surface", &scheme.surface),
        ("text", &scheme.text),
        ("text-muted", &scheme.text_muted),
        ("border", &scheme.border),
        ("primary", &scheme.primary),
    ]
    .iter()
    .map(|(name, value)| format!("{:indent$}--color-{name}: {value};\n", ""))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.questions_dir, "leetcode_questions");
        assert_eq!(config.docs_dir, "docs");
        assert_eq!(config.archive.batch_size, 4);
        assert_eq!(config.archive.strategy, PageStrategy::PerItem);
        assert_eq!(config.selection.total(), 4);
        assert!(!config.completion.is_available());
        assert!(!config.publish.is_available());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[selection]
hard = 3

[archive]
strategy = "merged"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.selection.hard, 3);
        assert_eq!(config.selection.easy, 1);
        assert_eq!(config.archive.strategy, PageStrategy::Merged);
        assert_eq!(config.archive.batch_size, 4);
    }

    #[test]
    fn completion_availability_requires_real_key() {
        let mut c = CompletionConfig {
            enabled: true,
            ..CompletionConfig::default()
        };
        assert!(!c.is_available());
        c.api_key = "sk-real".to_string();
        assert!(c.is_available());
        c.enabled = false;
        assert!(!c.is_available());
    }

    #[test]
    fn publish_availability_requires_username() {
        let mut p = PublishConfig {
            enabled: true,
            ..PublishConfig::default()
        };
        assert!(!p.is_available());
        p.username = "someone".to_string();
        assert!(p.is_available());
    }

    #[test]
    fn paths_resolve_against_root() {
        let config = Config::default();
        let root = Path::new("/project");
        assert_eq!(
            config.questions_path(root),
            PathBuf::from("/project/leetcode_questions")
        );
        assert_eq!(config.docs_path(root), PathBuf::from("/project/docs"));
        assert_eq!(
            config.history_path(root),
            PathBuf::from("/project/question_history.json")
        );
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.archive.batch_size, 4);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"
docs_dir = "site"

[archive]
batch_size = 3
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.docs_dir, "site");
        assert_eq!(config.archive.batch_size, 3);
        assert_eq!(config.questions_dir, "leetcode_questions");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "this is not valid toml [[[").unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"
[archive]
batch_size = 0
"#,
        )
        .unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<Config, _> = toml::from_str("[archive]\nbatch_sise = 4\n");
        assert!(result.unwrap_err().to_string().contains("unknown field"));
    }

    #[test]
    fn unknown_strategy_rejected() {
        let result: Result<Config, _> = toml::from_str("[archive]\nstrategy = \"grid\"\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_zero_timeouts() {
        let mut config = Config::default();
        config.source.detail_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.completion.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.publish.timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("publish.timeout_secs"));
    }

    #[test]
    fn validate_empty_directory_name() {
        let mut config = Config::default();
        config.docs_dir = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("docs_dir"));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str("[archive]\nbatch_size = 4\nsite_title = \"a\"\n").unwrap();
        let overlay: toml::Value = toml::from_str("[archive]\nbatch_size = 2\n").unwrap();
        let merged = merge_toml(base, overlay);
        let archive = merged.get("archive").unwrap();
        assert_eq!(archive.get("batch_size").unwrap().as_integer(), Some(2));
        assert_eq!(archive.get("site_title").unwrap().as_str(), Some("a"));
    }

    #[test]
    fn merge_toml_adds_new_keys_and_replaces_tables_with_scalars() {
        let base: toml::Value = toml::from_str("[publish]\nremote = \"origin\"\n[notify]\nenabled = false\n").unwrap();
        let overlay: toml::Value = toml::from_str("notify = 1\n[publish]\nsite_url = \"https://x.test\"\n").unwrap();
        let merged = merge_toml(base, overlay);
        let publish = merged.get("publish").unwrap();
        assert_eq!(publish.get("remote").unwrap().as_str(), Some("origin"));
        assert_eq!(publish.get("site_url").unwrap().as_str(), Some("https://x.test"));
        assert_eq!(merged.get("notify").unwrap().as_integer(), Some(1));
    }

    #[test]
    fn load_config_publish_timeout() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "[publish]\ntimeout_secs = 5\n").unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.publish.timeout_secs, 5);
        assert_eq!(config.publish.remote, "origin");
    }

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("docs_dir = \"docs\"").unwrap();
        let overlay: toml::Value = toml::from_str("docs_dir = \"site\"").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("docs_dir").unwrap().as_str(), Some("site"));
    }

    // =========================================================================
    // stock config tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: Config = toml::from_str(stock_config_toml()).unwrap();
        let defaults = Config::default();
        assert_eq!(config.archive.batch_size, defaults.archive.batch_size);
        assert_eq!(config.archive.strategy, defaults.archive.strategy);
        assert_eq!(config.completion.prompt_template, defaults.completion.prompt_template);
        assert_eq!(config.colors.light.primary, defaults.colors.light.primary);
        assert_eq!(config.colors.dark.background, defaults.colors.dark.background);
        assert_eq!(config.publish.branch, "main");
        assert_eq!(config.publish.timeout_secs, defaults.publish.timeout_secs);
    }

    #[test]
    fn defaults_tree_has_all_sections() {
        let val = defaults_tree().unwrap();
        for section in ["selection", "archive", "source", "completion", "publish", "notify", "colors"] {
            assert!(val.get(section).is_some(), "missing {section}");
        }
    }

    #[test]
    fn generate_css_uses_config_colors() {
        let mut colors = ColorConfig::default();
        colors.light.primary = "#ff0000".to_string();
        let css = generate_color_css(&colors);
        assert!(css.contains("--color-primary: #ff0000"));
        assert!(css.contains("@media (prefers-color-scheme: dark)"));
        assert!(css.contains("--color-surface:"));
    }
}
