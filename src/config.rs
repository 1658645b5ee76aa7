//! Run configuration for both pipelines.
//!
//! Every field defaults to the workshop's hard-coded values, so running
//! without a config file scrapes the Mr. Robot episode table and the three
//! faculty homepages. A TOML file may override any subset:
//!
//! ```toml
//! [corpus]
//! output_dir = "corpi"
//!
//! [[corpus.sources]]
//! name = "Rema"
//! homepage = "http://scholar.harvard.edu/remahanna/published-and-forthcoming"
//! base_url = ""
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{Error, Result};

const TABLE_URL: &str = "https://en.wikipedia.org/wiki/Mr._Robot_%28TV_series%29";
const TABLE_SELECTOR: &str = ".wikitable";
const TABLE_OUTPUT: &str = "Mr Robot - spoilers.csv";

/// Placeholder replaced by the path of the downloaded document.
pub const INPUT_PLACEHOLDER: &str = "{input}";
/// Placeholder replaced by the path the tool must write its text to.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub table: TableConfig,
    pub corpus: CorpusConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableConfig {
    /// Page holding the table.
    pub url: String,
    /// CSS selector; the first match is scraped.
    pub selector: String,
    /// CSV destination, overwritten on every run.
    pub output: PathBuf,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            url: TABLE_URL.into(),
            selector: TABLE_SELECTOR.into(),
            output: TABLE_OUTPUT.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorpusConfig {
    /// Directory receiving one `<name>.txt` per source.
    pub output_dir: PathBuf,
    /// An href is a candidate document when it contains any of these.
    pub link_markers: Vec<String>,
    /// Rebuild corpora whose output file already exists.
    pub overwrite_existing: bool,
    pub converter: ConverterConfig,
    pub sources: Vec<Source>,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            link_markers: vec!["pdf".into(), "files".into()],
            overwrite_existing: false,
            converter: ConverterConfig::default(),
            sources: default_sources(),
        }
    }
}

/// External text-extraction command.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConverterConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            program: "pdf2txt.py".into(),
            args: ["-o", OUTPUT_PLACEHOLDER, "-t", "text", INPUT_PLACEHOLDER]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// One entity a corpus is built for.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Source {
    pub name: String,
    /// Page the document links are discovered on.
    pub homepage: String,
    /// Prefix for links that carry no scheme. May be empty.
    #[serde(default)]
    pub base_url: String,
}

impl Source {
    pub fn new(name: &str, homepage: &str, base_url: &str) -> Self {
        Self {
            name: name.into(),
            homepage: homepage.into(),
            base_url: base_url.into(),
        }
    }

    /// Where this source's corpus is written. The skip check looks here too.
    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}.txt", self.name))
    }
}

fn default_sources() -> Vec<Source> {
    vec![
        Source::new(
            "Rohini",
            "http://www.hks.harvard.edu/fs/rpande/research.html",
            "http://www.hks.harvard.edu/fs/rpande/",
        ),
        Source::new(
            "Asim",
            "http://www.hks.harvard.edu/fs/akhwaja/",
            "http://www.hks.harvard.edu/fs/akhwaja/",
        ),
        Source::new(
            "Rema",
            "http://scholar.harvard.edu/remahanna/published-and-forthcoming",
            "",
        ),
    ]
}

impl Config {
    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .map_err(|e| Error::config(Some(path.into()), e.to_string()))?;
                Self::from_toml(&raw).map_err(|e| match e {
                    Error::Config { message, .. } => Error::config(Some(path.into()), message),
                    other => other,
                })?
            }
            None => Self::default(),
        };
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Config = toml::from_str(raw).map_err(|e| Error::config(None, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let corpus = &self.corpus;
        if corpus.link_markers.iter().all(|m| m.is_empty()) {
            return Err(Error::config(None, "at least one non-empty link marker is required"));
        }
        if corpus.converter.program.trim().is_empty() {
            return Err(Error::config(None, "converter program is empty"));
        }

        let mut seen = HashSet::new();
        for source in &corpus.sources {
            let name = source.name.as_str();
            if name.trim().is_empty() {
                return Err(Error::config(None, "source name is empty"));
            }
            // The name becomes a file name.
            if name.contains(['/', '\\']) || name == "." || name == ".." {
                return Err(Error::config(None, format!("source name `{name}` is not a file name")));
            }
            if !seen.insert(name) {
                return Err(Error::config(None, format!("duplicate source `{name}`")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_workshop_constants() {
        let config = Config::default();
        assert_eq!(config.table.selector, ".wikitable");
        assert_eq!(config.table.output, PathBuf::from("Mr Robot - spoilers.csv"));
        let names: Vec<_> = config.corpus.sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Rohini", "Asim", "Rema"]);
        assert_eq!(config.corpus.link_markers, ["pdf", "files"]);
        assert!(!config.corpus.overwrite_existing);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = Config::from_toml(
            r#"
            [corpus]
            output_dir = "corpi"

            [[corpus.sources]]
            name = "Rema"
            homepage = "http://example.com/papers"
            "#,
        )
        .unwrap();

        assert_eq!(config.corpus.output_dir, PathBuf::from("corpi"));
        assert_eq!(config.corpus.sources.len(), 1);
        assert_eq!(config.corpus.sources[0].base_url, "");
        assert_eq!(config.corpus.converter.program, "pdf2txt.py");
        assert_eq!(config.table.url, TABLE_URL);
    }

    #[test]
    fn rejects_duplicate_and_path_like_names() {
        let dup = r#"
            [[corpus.sources]]
            name = "Asim"
            homepage = "http://a"
            [[corpus.sources]]
            name = "Asim"
            homepage = "http://b"
        "#;
        assert!(matches!(Config::from_toml(dup), Err(Error::Config { .. })));

        let slash = r#"
            [[corpus.sources]]
            name = "../etc"
            homepage = "http://a"
        "#;
        assert!(Config::from_toml(slash).is_err());
    }

    #[test]
    fn unknown_keys_are_errors() {
        assert!(Config::from_toml("[table]\nurll = \"x\"").is_err());
    }

    #[test]
    fn output_path_is_name_dot_txt() {
        let source = Source::new("Rohini", "http://h", "http://h/");
        assert_eq!(
            source.output_path(Path::new("corpi")),
            PathBuf::from("corpi/Rohini.txt")
        );
    }
}
