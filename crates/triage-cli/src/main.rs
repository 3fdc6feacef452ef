//! CI Triage - failed GitHub Actions run diagnosis
//!
//! The `ci-triage` command finds a failed workflow run, pulls its log archive
//! and names the most likely cause.
//!
//! ## Commands
//!
//! - `triage`: diagnose the latest, n-th most recent, or a specific failed run
//! - `classify`: diagnose a local log file or downloaded log archive
//! - `rules`: list the classification rules in evaluation order

mod render;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use actions_client::{ClientConfig, GitHubActionsClient, DEFAULT_API_URL};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, Level};
use triage_core::{
    classify_log_text, extract_log_text, RuleSet, RunSelector, TriageEngine, TriageError,
    TriageSettings, DEFAULT_EXCERPT_LINES, DEFAULT_TOP_K, DEFAULT_WINDOW_LINES, METRICS,
};

use render::LocalReport;

/// Zip signatures: local file header, and end of central directory for an
/// archive with no entries.
const ZIP_SIGNATURES: [&[u8]; 2] = [b"PK\x03\x04", b"PK\x05\x06"];

#[derive(Parser)]
#[command(name = "ci-triage")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Diagnose failed GitHub Actions runs", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Diagnose a failed workflow run
    ///
    /// SELECTOR is empty for the latest failure, `<n>` for the n-th most
    /// recent (1-10), or `id <run id>` for a specific run.
    Triage {
        /// Which run to analyse
        selector: Vec<String>,

        /// Repository owner
        #[arg(long, env = "GITHUB_OWNER")]
        owner: Option<String>,

        /// Repository name
        #[arg(long, env = "GITHUB_REPO")]
        repo: Option<String>,

        /// API token
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// API base URL (GitHub Enterprise: https://host/api/v3)
        #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
        api_url: String,

        /// Per-request timeout in seconds
        #[arg(long, default_value = "60")]
        timeout_secs: u64,

        #[command(flatten)]
        analysis: AnalysisArgs,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Diagnose a local log file or log archive (.zip)
    Classify {
        /// Log text or zip archive
        file: PathBuf,

        #[command(flatten)]
        analysis: AnalysisArgs,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List the classification rules in evaluation order
    Rules {
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Args, Debug, Clone, Copy)]
struct AnalysisArgs {
    /// Trailing lines examined by the classifier
    #[arg(long, default_value_t = DEFAULT_WINDOW_LINES)]
    window: usize,

    /// Trailing lines shown in the report
    #[arg(long, default_value_t = DEFAULT_EXCERPT_LINES)]
    excerpt: usize,

    /// Largest log files analysed
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,
}

impl AnalysisArgs {
    fn settings(self) -> TriageSettings {
        TriageSettings {
            window_lines: self.window,
            excerpt_lines: self.excerpt,
            top_k: self.top_k,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    triage_core::init_tracing(cli.json, level);

    let result = run(cli.command).await;
    METRICS.flush();

    match result {
        Ok(output) => {
            println!("{}", output.trim_end());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", render::error_text(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<String> {
    match command {
        Commands::Triage {
            selector,
            owner,
            repo,
            token,
            api_url,
            timeout_secs,
            analysis,
            format,
        } => {
            let target = TriageTarget {
                selector: parse_selector(&selector)?,
                owner: owner.unwrap_or_default(),
                repo: repo.unwrap_or_default(),
            };
            let client = build_client(token.as_deref(), &api_url, timeout_secs)?;
            cmd_triage(client, &target, analysis.settings(), format).await
        }
        Commands::Classify {
            file,
            analysis,
            format,
        } => cmd_classify(&file, analysis.settings(), format),
        Commands::Rules { format } => cmd_rules(format),
    }
}

/// Owner, repository and run a triage command resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TriageTarget {
    selector: RunSelector,
    owner: String,
    repo: String,
}

/// Join the positional words and parse them as one selector.
fn parse_selector(words: &[String]) -> Result<RunSelector> {
    Ok(words.join(" ").parse::<RunSelector>()?)
}

fn build_client(token: Option<&str>, api_url: &str, timeout_secs: u64) -> Result<GitHubActionsClient> {
    let token = token.unwrap_or_default();
    let config = ClientConfig::new(token)
        .with_base_url(api_url)
        .with_timeout(Duration::from_secs(timeout_secs.max(1)));
    GitHubActionsClient::new(config).map_err(|e| TriageError::from(e).into())
}

/// Diagnose a failed run through `api`.
async fn cmd_triage<A: actions_client::ActionsApi>(
    api: A,
    target: &TriageTarget,
    settings: TriageSettings,
    format: OutputFormat,
) -> Result<String> {
    let engine = TriageEngine::new(api, settings);
    debug!(settings = ?engine.settings(), "Triage engine ready");
    let outcome = engine
        .triage(&target.owner, &target.repo, target.selector)
        .await?;

    match format {
        OutputFormat::Text => Ok(render::outcome_text(&outcome)),
        OutputFormat::Json => render::json(&outcome),
    }
}

/// Diagnose a local log file, or a log archive when the file is a zip.
fn cmd_classify(path: &Path, settings: TriageSettings, format: OutputFormat) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read log file: {:?}", path))?;

    let (text, archive) = if is_zip(&bytes) {
        let logs = extract_log_text(&bytes, settings.normalized().top_k)?;
        debug!(entries = logs.summary.entries_total, "Read local log archive");
        (logs.text, Some(logs.summary))
    } else {
        (String::from_utf8_lossy(&bytes).into_owned(), None)
    };

    let diagnosis = classify_log_text(&text, settings, &RuleSet::canonical());
    let report = LocalReport {
        source: path.display().to_string(),
        classification: diagnosis.classification,
        excerpt: diagnosis.excerpt,
        archive,
    };

    match format {
        OutputFormat::Text => Ok(render::local_text(&report)),
        OutputFormat::Json => render::json(&report),
    }
}

fn is_zip(bytes: &[u8]) -> bool {
    ZIP_SIGNATURES.iter().any(|sig| bytes.starts_with(sig))
}

fn cmd_rules(format: OutputFormat) -> Result<String> {
    let rules = RuleSet::canonical().describe();
    match format {
        OutputFormat::Text => Ok(render::rules_text(&rules)),
        OutputFormat::Json => render::json(&rules),
    }
}
