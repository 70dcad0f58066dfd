use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use repominer::config::Config;
use repominer::git::CommitExporter;
use repominer::output::Reporter;
use repominer::records::RecordLoader;
use repominer::summary::Summarizer;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to ./repominer.toml when present)
    #[arg(long, global = true, env = "REPOMINER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export commits from a local clone to CSV
    FetchCommits {
        /// Repository path to read history from
        #[arg(short, long)]
        repo: PathBuf,

        /// Max number of commits to export (0 = no limit)
        #[arg(long = "max")]
        max_commits: Option<usize>,

        /// Path to output commits CSV
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Summarize commit and issue CSVs
    Summarize {
        /// Commits CSV (columns: sha, author, email, date, message)
        #[arg(long)]
        commits: PathBuf,

        /// Issues CSV (columns: state, created_at, closed_at, ...)
        #[arg(long)]
        issues: PathBuf,

        /// Output format (text, json)
        #[arg(short, long)]
        format: Option<String>,

        /// Write the report to this file instead of stdout
        #[arg(long)]
        output_file: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::FetchCommits {
            repo,
            max_commits,
            out,
        } => {
            eprintln!("{}", "RepoMiner - commit export".bright_cyan().bold());
            eprintln!("Repository: {}", repo.display().to_string().bright_white());

            let exporter = CommitExporter::open(&repo)?
                .include_merge_commits(config.fetch.include_merge_commits);
            let rows = exporter.export(max_commits.or(config.fetch.max_commits))?;
            CommitExporter::write_csv(&rows, &out)?;

            println!("Saved {} commits to {}", rows.len(), out.display());
        }
        Command::Summarize {
            commits,
            issues,
            format,
            output_file,
        } => {
            let commits = RecordLoader::load_commits(&commits)?;
            let issues = RecordLoader::load_issues(&issues)?;

            let skipped = commits.warnings.len() + issues.warnings.len();
            if skipped > 0 {
                warn!("{} malformed rows were skipped", skipped);
            }

            info!("Summarizing repository activity...");
            let report = Summarizer::with_top_limit(config.summary.top_contributors)
                .summarize(&commits.records, &issues.records);

            let format = format.unwrap_or_else(|| config.output.default_format.clone());
            let mut reporter =
                Reporter::new(&format, output_file.as_deref(), config.output.color_output)?;
            reporter.generate_report(&report)?;
        }
    }

    Ok(())
}
