//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use tracing::info;

use foliofetch_github::GithubClient;
use foliofetch_shared::{GithubAuth, PipelineSummary, SiteData, load_site_data};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// foliofetch — prepare site content from GitHub sources.
#[derive(Parser)]
#[command(
    name = "foliofetch",
    version,
    about = "Clone writeups and fetch project READMEs into static-site content.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Content root the pipelines write under.
    #[arg(long, default_value = "src/content", global = true)]
    pub content_root: PathBuf,

    /// Site data file declaring projects and the writeups source.
    #[arg(long, default_value = "data.json", global = true)]
    pub data: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands. Without one, both pipelines run.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the writeups pipeline, then the projects pipeline.
    Run,

    /// Run only the writeups pipeline.
    Writeups,

    /// Run only the projects pipeline.
    Projects,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    // Crate targets all share the foliofetch_ prefix; a bare level keeps
    // the directives simple and covers the bin crate too.
    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
///
/// An unreadable data file or a failed clone propagates out of here and the
/// process exits non-zero; per-item skips only show up in the summaries.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let data = load_site_data(&cli.data)?;
    let auth = GithubAuth::from_env();
    let client = GithubClient::new(&auth)?;

    info!(
        content_root = %cli.content_root.display(),
        data = %cli.data.display(),
        "starting content fetch"
    );

    let mut summaries = Vec::new();

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            summaries.push(run_writeups(&data, &client, &cli.content_root).await?);
            summaries.push(run_projects(&data, &client, &cli.content_root).await?);
        }
        Command::Writeups => {
            summaries.push(run_writeups(&data, &client, &cli.content_root).await?);
        }
        Command::Projects => {
            summaries.push(run_projects(&data, &client, &cli.content_root).await?);
        }
    }

    for summary in &summaries {
        print_summary(summary);
    }

    Ok(())
}

async fn run_writeups(
    data: &SiteData,
    client: &GithubClient,
    content_root: &std::path::Path,
) -> Result<PipelineSummary> {
    Ok(foliofetch_writeups::run(&data.writeups, client, content_root).await?)
}

async fn run_projects(
    data: &SiteData,
    client: &GithubClient,
    content_root: &std::path::Path,
) -> Result<PipelineSummary> {
    Ok(foliofetch_projects::run(&data.projects, client, content_root).await?)
}

/// Print the end-of-run summary for one pipeline.
fn print_summary(summary: &PipelineSummary) {
    println!();
    println!("  {} pipeline finished", summary.pipeline);
    println!("  Processed: {}", summary.processed());
    println!("  Skipped:   {}", summary.skipped());
    for (item, reason) in summary.skips() {
        println!("    - {item}: {reason}");
    }
    println!("  Time:      {:.1}s", summary.duration.as_secs_f64());
    println!();
}
