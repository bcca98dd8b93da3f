/// Speech corpus ingestion: topic patterns, document selection and table loading.
///
/// Every malformed input is fatal; errors carry the offending path and line
/// so a single bad document can be located and fixed before re-running.
pub mod keywords;
pub mod loader;
pub mod models;
pub mod selector;

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading and parsing the speech corpus.
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid topic pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("at least one topic is required")]
    NoTopics,

    #[error("{path}:{line}: expected `ID<TAB>Text`")]
    MalformedSpeechLine { path: PathBuf, line: usize },

    #[error("{path}:{line}: {found} fields for {expected} header columns")]
    MalformedMetadataRow {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("{path}: metadata header has no `ID` column")]
    MissingIdColumn { path: PathBuf },

    #[error("speech {id}: cannot derive month from date {date:?}")]
    MalformedDate { id: String, date: String },
}

impl CorpusError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
