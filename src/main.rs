use clap::{Parser, Subcommand};
use leetcode_daily::completion::{ChatClient, Completion};
use leetcode_daily::config::{self, Config, PageStrategy};
use leetcode_daily::daily::{self, DailyDeps};
use leetcode_daily::ledger::HistoryLedger;
use leetcode_daily::notify::{DesktopNotifier, Notifier};
use leetcode_daily::pipeline::{self, PublishStatus};
use leetcode_daily::publish::{GitPublisher, Publisher};
use leetcode_daily::source::LeetCodeClient;
use leetcode_daily::store::DocumentStore;
use leetcode_daily::{output, telemetry};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Called once at startup.
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "leetcode-daily")]
#[command(about = "Daily LeetCode picker with a browsable Markdown archive")]
#[command(long_about = "\
Daily LeetCode picker with a browsable Markdown archive

Every run picks unseen questions per difficulty, saves each one as a Markdown
document, and updates a static site that browses the whole collection.

Project layout (all names configurable in config.toml):

  ./
  ├── config.toml                       # Optional; stock defaults otherwise
  ├── leetcode_questions/               # One document per question
  │   └── 1_简单_两数之和_20250101.md      # {id}_{difficulty}_{title}_{date}.md
  ├── question_history.json             # Ids already selected
  ├── execution.log                     # One line per daily run
  └── docs/                             # Generated site
      ├── index.html
      ├── history.json                  # Manifest the index page reads
      └── 20250101_000000_q1.html       # One page per question (per-item)

Documents of the same date are grouped into batches of `archive.batch_size`;
each batch gets a synthetic id (20250101_000000, 20250101_010000, ...).

Run 'leetcode-daily gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Project root holding config.toml, documents and the site
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Collect today's questions and update the site
    Daily,
    /// Regenerate every page and the manifest from the documents
    Rebuild {
        /// Page layout; defaults to archive.strategy from config
        #[arg(long, value_enum)]
        strategy: Option<PageStrategy>,
        /// Skip git publishing even when configured
        #[arg(long)]
        no_publish: bool,
    },
    /// Show how documents would be batched, without writing anything
    Check,
    /// Show how many questions have been selected so far
    History,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    telemetry::init_tracing();

    match cli.command {
        Command::Daily => {
            let config = config::load_config(&cli.root)?;
            run_daily(&config, &cli.root)?;
        }
        Command::Rebuild {
            strategy,
            no_publish,
        } => {
            let config = config::load_config(&cli.root)?;
            let strategy = strategy.unwrap_or(config.archive.strategy);
            let publisher = (!no_publish)
                .then(|| git_publisher(&config, &cli.root))
                .flatten();
            println!(
                "==> Rebuilding {}",
                config.docs_path(&cli.root).display()
            );
            let summary = pipeline::rebuild(
                &config,
                &cli.root,
                strategy,
                publisher.as_ref().map(|p| p as &dyn Publisher),
                now(),
            )?;
            output::print_rebuild_output(&summary);
            print_site_url(&config, &summary.publish);
        }
        Command::Check => {
            let config = config::load_config(&cli.root)?;
            let store = DocumentStore::new(config.questions_path(&cli.root));
            println!("==> Checking {}", store.dir().display());
            let batches = pipeline::plan(&store, config.archive.batch_size)?;
            output::print_batch_plan(&batches);
        }
        Command::History => {
            let config = config::load_config(&cli.root)?;
            let ledger = HistoryLedger::load(config.history_path(&cli.root));
            output::print_history(&ledger.stats(), ledger.last_updated());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn run_daily(config: &Config, root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = LeetCodeClient::new(&config.source)?;
    let completion = ChatClient::new(config.completion.clone())?;
    let publisher = git_publisher(config, root);
    let notifier = DesktopNotifier;

    let deps = DailyDeps {
        source: &source,
        completion: config
            .completion
            .is_available()
            .then_some(&completion as &dyn Completion),
        publisher: publisher.as_ref().map(|p| p as &dyn Publisher),
        notifier: config
            .notify
            .enabled
            .then_some(&notifier as &dyn Notifier),
    };
    if deps.completion.is_none() {
        info!("completion not configured; documents get a placeholder solution");
    }

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_daily_event(&event) {
                println!("{}", line);
            }
        }
    });
    let result = daily::run_daily(
        config,
        root,
        deps,
        &mut rand::thread_rng(),
        now(),
        Some(tx),
    );
    printer
        .join()
        .map_err(|_| "progress printer panicked")?;

    let summary = result?;
    output::print_daily_summary(&summary);
    print_site_url(config, &summary.publish);
    Ok(())
}

/// Publisher for the project root, when publishing is configured.
fn git_publisher(config: &Config, root: &Path) -> Option<GitPublisher> {
    if !config.publish.is_available() {
        info!("publishing not configured");
        return None;
    }
    Some(
        GitPublisher::new(root, &config.publish.remote, &config.publish.branch)
            .with_timeout(Duration::from_secs(config.publish.timeout_secs)),
    )
}

fn print_site_url(config: &Config, status: &PublishStatus) {
    if matches!(status, PublishStatus::Done(_)) && !config.publish.site_url.is_empty() {
        println!("Site: {}", config.publish.site_url);
    }
}

fn now() -> chrono::NaiveDateTime {
    chrono::Local::now().naive_local()
}
