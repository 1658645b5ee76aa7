//! Workshop scrapers.
//!
//! - [`process::run_table`] pulls one wiki table into a CSV file.
//! - [`process::build_corpus`] walks faculty homepages, downloads every linked
//!   paper, converts it to text and writes one corpus file per source.

mod error;
mod macros;
mod parse;
mod request;

pub mod config;
pub mod convert;
pub mod process;
pub mod table;

pub use config::{Config, CorpusConfig, Source, TableConfig};
pub use convert::{DocumentToText, ExternalTool};
pub use error::{Error, Result};
pub use parse::{extract_links, extract_table};
