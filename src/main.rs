use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Local;
use clap::{Parser, Subcommand};
use scrap_corpus::process::{build_corpus, run_table, CorpusReport, LinkOutcome, SourceOutcome};
use scrap_corpus::{info_time, Config, ExternalTool, Result};
use tracing::error;

/// Workshop scrapers: a wiki table to CSV, faculty papers to text corpora.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// TOML config file; built-in defaults are used without one.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More logging (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scrape the configured table into a CSV file.
    Table {
        /// Overrides the CSV destination.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Build one text corpus per configured source.
    Corpus(CorpusArgs),
    /// Run the table scrape, then the corpus build.
    All(CorpusArgs),
}

#[derive(Debug, clap::Args)]
struct CorpusArgs {
    /// Rebuild corpora whose output file already exists.
    #[arg(long)]
    force: bool,

    /// Overrides the corpus output directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let start_time = Local::now();
    let res = run(cli).await;
    info_time!(start_time, "Full program time:");

    match res {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match verbose {
        0 => "scrap_corpus=info",
        1 => "scrap_corpus=debug",
        _ => "scrap_corpus=trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    fmt().with_env_filter(env_filter).with_target(false).init();
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = Config::load(cli.config.as_deref())?;
    let client = reqwest::Client::new();

    let corpus_args = match cli.command {
        Command::Table { output } => {
            if let Some(output) = output {
                config.table.output = output;
            }
            run_table(&client, &config.table).await?;
            return Ok(ExitCode::SUCCESS);
        }
        Command::Corpus(args) => args,
        Command::All(args) => {
            run_table(&client, &config.table).await?;
            args
        }
    };

    config.corpus.overwrite_existing |= corpus_args.force;
    if let Some(dir) = corpus_args.output_dir {
        config.corpus.output_dir = dir;
    }

    let converter = ExternalTool::new(&config.corpus.converter);
    let report = build_corpus(&client, &config.corpus, &converter).await;
    print_summary(&report);

    if report.all_failed() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_summary(report: &CorpusReport) {
    for source in &report.sources {
        match &source.outcome {
            SourceOutcome::Skipped { existing } => {
                println!("{:<12} skipped, {} exists", source.name, existing.display());
            }
            SourceOutcome::Failed { reason } => {
                println!("{:<12} failed: {reason}", source.name);
            }
            SourceOutcome::Done { output, links } => {
                let ok = links
                    .iter()
                    .filter(|l| matches!(l.outcome, LinkOutcome::Converted { .. }))
                    .count();
                let written = output
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "nothing written".into());
                println!("{:<12} {ok}/{} documents, {written}", source.name, links.len());
            }
        }
    }
}
