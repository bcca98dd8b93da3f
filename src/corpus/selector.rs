use std::fs;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use super::CorpusError;
use super::keywords::TopicPattern;

/// Whether a raw speech line mentions a topic.
///
/// The line is split on its first whitespace run; only the text after the
/// identifier is searched. Lines without text never match.
pub fn line_mentions_topic(line: &str, pattern: &TopicPattern) -> bool {
    match line.trim().split_once(char::is_whitespace) {
        Some((_, text)) => pattern.is_match(text.trim_start()),
        None => false,
    }
}

/// Whether any non-empty line of `content` mentions a topic.
pub fn document_mentions_topic(content: &str, pattern: &TopicPattern) -> bool {
    content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .any(|l| line_mentions_topic(l, pattern))
}

/// List the `.txt` speech files directly inside `dir`, sorted by path.
pub fn list_speech_files(dir: &Path) -> Result<Vec<PathBuf>, CorpusError> {
    let entries = fs::read_dir(dir).map_err(|e| CorpusError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| CorpusError::io(dir, e))?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("txt") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Scan every speech file in `dir` and return those with at least one
/// topic-matching line.
pub fn select_documents(dir: &Path, pattern: &TopicPattern) -> Result<Vec<PathBuf>, CorpusError> {
    let files = list_speech_files(dir)?;
    info!("Scanning {} speech files in {}", files.len(), dir.display());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  {bar:40.cyan/blue} {pos}/{len} {msg}")
            .expect("valid template")
            .progress_chars("█▓░"),
    );

    let mut selected = Vec::new();
    for path in files {
        let content = fs::read_to_string(&path).map_err(|e| CorpusError::io(&path, e))?;
        if document_mentions_topic(&content, pattern) {
            debug!("Selected {}", path.display());
            selected.push(path);
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    info!("Selected {} documents", selected.len());
    Ok(selected)
}
