use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("The selector you are trying to scrape for is invalid. Selector: {0}")]
    ParseMissingSelector(String),
    #[error("No element matched the table selector: {0}")]
    TableNotFound(String),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Couldn't write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config Error in {path:?}: {message}")]
    Config { path: Option<PathBuf>, message: String },

    #[error("Conversion Error: {0}")]
    Conversion(String),

    #[error("Tokio Join Error, couldn't await a task! {0}")]
    RuntimeJoin(#[from] tokio::task::JoinError),

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl Error {
    pub(crate) fn config(path: Option<PathBuf>, message: impl Into<String>) -> Self {
        Error::Config {
            path,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_names_the_file() {
        let err = Error::config(Some("corpus.toml".into()), "duplicate source `Rema`");
        let msg = err.to_string();
        assert!(msg.contains("corpus.toml"));
        assert!(msg.contains("duplicate source `Rema`"));
    }
}
