use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::CorpusError;
use super::models::{ID_COLUMN, MetadataRow, MetadataTable, SpeechRow};

/// Speech and metadata tables accumulated over the selected documents.
#[derive(Debug, Clone, Default)]
pub struct CorpusTables {
    pub speeches: Vec<SpeechRow>,
    pub metadata: MetadataTable,
}

/// Companion metadata path: `foo.txt` → `foo-meta.tsv`.
pub fn metadata_path(document: &Path) -> PathBuf {
    let stem = document
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    document.with_file_name(format!("{stem}-meta.tsv"))
}

/// Trimmed, non-empty lines paired with their 1-based line numbers.
fn content_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty())
}

/// Parse a speech document into `ID<TAB>Text` rows.
pub fn parse_speeches(content: &str, path: &Path) -> Result<Vec<SpeechRow>, CorpusError> {
    content_lines(content)
        .map(|(line, text)| match text.split_once('\t') {
            Some((id, text)) => Ok(SpeechRow {
                id: id.to_string(),
                text: text.to_string(),
            }),
            None => Err(CorpusError::MalformedSpeechLine {
                path: path.to_path_buf(),
                line,
            }),
        })
        .collect()
}

/// Parse a metadata file: the first line is the header, every following line
/// one metadata row. Returns the header and the rows.
pub fn parse_metadata(
    content: &str,
    path: &Path,
) -> Result<(Vec<String>, Vec<MetadataRow>), CorpusError> {
    let mut lines = content_lines(content);
    let headers: Vec<String> = match lines.next() {
        Some((_, header)) => header.split('\t').map(str::to_string).collect(),
        None => return Ok((Vec::new(), Vec::new())),
    };
    let id_index = headers
        .iter()
        .position(|h| h == ID_COLUMN)
        .ok_or_else(|| CorpusError::MissingIdColumn {
            path: path.to_path_buf(),
        })?;

    let mut rows = Vec::new();
    for (line, text) in lines {
        let values: Vec<&str> = text.split('\t').collect();
        if values.len() > headers.len() {
            return Err(CorpusError::MalformedMetadataRow {
                path: path.to_path_buf(),
                line,
                expected: headers.len(),
                found: values.len(),
            });
        }
        let fields = headers
            .iter()
            .zip(values.iter())
            .map(|(h, v)| (h.clone(), (*v).to_string()))
            .collect();
        rows.push(MetadataRow {
            id: values.get(id_index).copied().unwrap_or_default().to_string(),
            fields,
        });
    }
    Ok((headers, rows))
}

/// Load every selected document together with its `-meta.tsv` companion.
pub fn load_tables(documents: &[PathBuf]) -> Result<CorpusTables, CorpusError> {
    let mut tables = CorpusTables::default();

    for document in documents {
        let content = fs::read_to_string(document).map_err(|e| CorpusError::io(document, e))?;
        let speeches = parse_speeches(&content, document)?;

        let meta_path = metadata_path(document);
        let meta_content =
            fs::read_to_string(&meta_path).map_err(|e| CorpusError::io(&meta_path, e))?;
        let (headers, rows) = parse_metadata(&meta_content, &meta_path)?;

        debug!(
            "Loaded {} speeches and {} metadata rows from {}",
            speeches.len(),
            rows.len(),
            document.display()
        );

        tables.speeches.extend(speeches);
        tables.metadata.add_columns(headers.iter().map(String::as_str));
        tables.metadata.rows.extend(rows);
    }

    Ok(tables)
}
