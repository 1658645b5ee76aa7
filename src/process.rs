use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use reqwest::Client;
use tempfile::NamedTempFile;
use tokio::task::spawn_blocking;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{CorpusConfig, Source, TableConfig};
use crate::convert::{normalize_text, DocumentToText};
use crate::parse::{parse_links, parse_table};
use crate::request::{fetch_bytes, fetch_html};
use crate::{info_time, Result};

/// Separates documents inside a corpus file.
const DOCUMENT_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    pub output: PathBuf,
    /// Data rows written, after merging continuation rows.
    pub rows: usize,
    pub columns: usize,
}

/// Scrapes the configured table and writes it to CSV, overwriting any previous file.
/// Every failure aborts the run.
pub async fn run_table(client: &Client, config: &TableConfig) -> Result<TableReport> {
    let start_time = Local::now();
    info_time!("Scraping table from {}", config.url);

    let html = fetch_html(client, &config.url).await?;
    let table = parse_table(html, config.selector.clone()).await?.merged();
    let report = TableReport {
        output: config.output.clone(),
        rows: table.rows.len(),
        columns: table.header.len(),
    };

    let output = config.output.clone();
    spawn_blocking(move || write_atomically(&output, |file| table.write_csv(file))).await??;

    info_time!(start_time, "Wrote {} rows to {:?}", report.rows, report.output);
    Ok(report)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// Characters of normalized text kept for the corpus.
    Converted { chars: usize },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReport {
    /// The link after resolution against the source's base URL.
    pub url: String,
    pub outcome: LinkOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    /// The output file was already there, nothing was fetched.
    Skipped { existing: PathBuf },
    /// The homepage couldn't be fetched or parsed.
    Failed { reason: String },
    /// `output` is `None` when no document converted, in which case no file is written.
    Done {
        output: Option<PathBuf>,
        links: Vec<LinkReport>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub name: String,
    pub outcome: SourceOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusReport {
    pub sources: Vec<SourceReport>,
}

impl CorpusReport {
    fn links(&self) -> impl Iterator<Item = &LinkReport> {
        self.sources.iter().flat_map(|s| match &s.outcome {
            SourceOutcome::Done { links, .. } => links.as_slice(),
            _ => &[][..],
        })
    }

    pub fn converted(&self) -> usize {
        self.links()
            .filter(|l| matches!(l.outcome, LinkOutcome::Converted { .. }))
            .count()
    }

    pub fn failed_links(&self) -> usize {
        self.links()
            .filter(|l| matches!(l.outcome, LinkOutcome::Failed { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.sources
            .iter()
            .filter(|s| matches!(s.outcome, SourceOutcome::Skipped { .. }))
            .count()
    }

    pub fn failed_sources(&self) -> usize {
        self.sources
            .iter()
            .filter(|s| matches!(s.outcome, SourceOutcome::Failed { .. }))
            .count()
    }

    /// True when there was work to do and every attempted source failed.
    pub fn all_failed(&self) -> bool {
        let attempted = self.sources.len() - self.skipped();
        attempted > 0 && self.failed_sources() == attempted
    }
}

/// Builds one text corpus per source, strictly in order, one document at a time.
///
/// A source whose output file exists is skipped unless `overwrite_existing` is set.
/// Failures never abort the run; they end up in the returned report.
pub async fn build_corpus<C: DocumentToText>(
    client: &Client,
    config: &CorpusConfig,
    converter: &C,
) -> CorpusReport {
    let start_time = Local::now();
    let mut report = CorpusReport::default();

    for source in &config.sources {
        let outcome = process_source(client, config, source, converter).await;
        report.sources.push(SourceReport {
            name: source.name.clone(),
            outcome,
        });
    }

    info_time!(
        start_time,
        "Corpus done: {} documents, {} failed links, {} skipped sources",
        report.converted(),
        report.failed_links(),
        report.skipped()
    );
    report
}

async fn process_source<C: DocumentToText>(
    client: &Client,
    config: &CorpusConfig,
    source: &Source,
    converter: &C,
) -> SourceOutcome {
    let output_path = source.output_path(&config.output_dir);
    if !config.overwrite_existing && output_path.exists() {
        info!(source = %source.name, path = ?output_path, "corpus exists, skipping");
        return SourceOutcome::Skipped {
            existing: output_path,
        };
    }

    let start_time = Local::now();
    info_time!("Now doing: {}", source.name);

    let links = match discover_links(client, config, source).await {
        Ok(links) => links,
        Err(e) => {
            warn!(source = %source.name, error = %e, "couldn't read homepage");
            return SourceOutcome::Failed {
                reason: e.to_string(),
            };
        }
    };
    info!(source = %source.name, count = links.len(), "found candidate links");

    let mut texts = Vec::new();
    let mut reports = Vec::with_capacity(links.len());
    for link in links {
        let url = resolve_link(&source.base_url, &link);
        let outcome = match fetch_and_convert(client, converter, &url).await {
            Ok(text) => {
                let chars = text.chars().count();
                debug!(url = %url, chars, "converted");
                texts.push(text);
                LinkOutcome::Converted { chars }
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Problem with opening the URL, skipping");
                LinkOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };
        reports.push(LinkReport { url, outcome });
    }

    if texts.is_empty() {
        info_time!(start_time, "No text for {}, nothing written", source.name);
        return SourceOutcome::Done {
            output: None,
            links: reports,
        };
    }

    match write_corpus(&output_path, &texts).await {
        Ok(()) => {
            info_time!(
                start_time,
                "Wrote {} documents for {} to {:?}",
                texts.len(),
                source.name,
                output_path
            );
            SourceOutcome::Done {
                output: Some(output_path),
                links: reports,
            }
        }
        Err(e) => {
            warn!(source = %source.name, error = %e, "couldn't write corpus");
            SourceOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}

async fn discover_links(
    client: &Client,
    config: &CorpusConfig,
    source: &Source,
) -> Result<Vec<String>> {
    let html = fetch_html(client, &source.homepage).await?;
    parse_links(html, config.link_markers.clone()).await
}

async fn fetch_and_convert<C: DocumentToText>(
    client: &Client,
    converter: &C,
    url: &str,
) -> Result<String> {
    let document = fetch_bytes(client, url).await?;
    let raw = converter.convert(&document).await?;
    Ok(normalize_text(&raw))
}

/// Links carrying a scheme are used as they are; anything else is appended to `base_url`.
pub fn resolve_link(base_url: &str, link: &str) -> String {
    match Url::parse(link) {
        Ok(_) => link.to_string(),
        Err(_) => format!("{base_url}{link}"),
    }
}

async fn write_corpus(path: &Path, texts: &[String]) -> Result<()> {
    let path = path.to_path_buf();
    let body = texts.join(DOCUMENT_SEPARATOR);
    spawn_blocking(move || {
        write_atomically(&path, |file| {
            file.write_all(body.as_bytes())?;
            Ok(())
        })
    })
    .await?
}

/// Writes into a temporary file next to `path` and renames it over `path` once
/// `write` succeeded, so `path` never holds a partial file.
fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut NamedTempFile) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut file = NamedTempFile::new_in(dir)?;
    write(&mut file)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
