//! Turning downloaded documents into plain text.
//!
//! The corpus builder only sees [`DocumentToText`]; [`ExternalTool`] is the
//! implementation that shells out to a command-line extractor.

use std::future::Future;
use std::path::Path;

use tokio::process::Command;
use tracing::debug;

use crate::config::{ConverterConfig, INPUT_PLACEHOLDER, OUTPUT_PLACEHOLDER};
use crate::{Error, Result};

const DOCUMENT_FILE: &str = "document.pdf";
const TEXT_FILE: &str = "document.txt";

pub trait DocumentToText {
    /// Extracts the text of one document. Fails with [`Error::Conversion`]
    /// (or an I/O error) when no text could be produced.
    fn convert(&self, document: &[u8]) -> impl Future<Output = Result<String>> + Send;
}

/// Runs an external extractor, e.g. `pdf2txt.py -o {output} -t text {input}`.
///
/// Each call gets its own temporary directory, removed when the call returns,
/// so concurrent runs never share files.
#[derive(Debug, Clone)]
pub struct ExternalTool {
    program: String,
    args: Vec<String>,
}

impl ExternalTool {
    pub fn new(config: &ConverterConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }

    fn command(&self, input: &Path, output: &Path) -> Command {
        let input = input.to_string_lossy();
        let output = output.to_string_lossy();
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args.iter().map(|arg| {
            arg.replace(INPUT_PLACEHOLDER, &input)
                .replace(OUTPUT_PLACEHOLDER, &output)
        }));
        cmd.stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl DocumentToText for ExternalTool {
    async fn convert(&self, document: &[u8]) -> Result<String> {
        let work_dir = tempfile::Builder::new().prefix("scrap-corpus-").tempdir()?;
        let input = work_dir.path().join(DOCUMENT_FILE);
        let output = work_dir.path().join(TEXT_FILE);
        tokio::fs::write(&input, document).await?;

        debug!(program = %self.program, dir = ?work_dir.path(), "running converter");
        let run = self.command(&input, &output).output().await.map_err(|e| {
            Error::Conversion(format!("couldn't start `{}`: {e}", self.program))
        })?;
        if !run.status.success() {
            let stderr = String::from_utf8_lossy(&run.stderr);
            return Err(Error::Conversion(format!(
                "`{}` exited with {}: {}",
                self.program,
                run.status,
                stderr.trim()
            )));
        }

        let raw = tokio::fs::read(&output).await.map_err(|e| {
            Error::Conversion(format!("`{}` produced no text file: {e}", self.program))
        })?;
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }
}

/// Transliterates extracted text to ASCII.
pub fn normalize_text(raw: &str) -> String {
    deunicode::deunicode(raw)
}
