//! CSV snapshot of the enriched table.
//!
//! The layout follows a dataframe export: a leading unnamed positional index,
//! `True`/`False` booleans and empty cells for missing values.
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::corpus::models::{EnrichedRow, EnrichedTable, ID_COLUMN};
use crate::sentiment::SentimentScores;

const TEXT: &str = "Text";
const CONTAINS_TOPIC: &str = "contains_topic";
const SENTIMENT_COLUMNS: [&str; 4] = ["neg", "neu", "pos", "compound"];
const AGE: &str = "Age";
const IS_FEMALE: &str = "is_female";
const MONTH: &str = "Month";

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("snapshot has no `{0}` column")]
    MissingColumn(&'static str),

    #[error("row {row}: invalid {column} value {value:?}")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },
}

fn format_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

/// Shortest round-trip form, always with a fractional part (`52.0`, not `52`).
fn format_f64(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{text}.0")
    } else {
        text
    }
}

fn format_opt_f64(value: Option<f64>) -> String {
    value.map(format_f64).unwrap_or_default()
}

/// Header row for a table with the given metadata columns.
pub fn header(metadata_columns: &[String]) -> Vec<String> {
    let mut columns = vec![String::new(), ID_COLUMN.to_string(), TEXT.to_string()];
    columns.push(CONTAINS_TOPIC.to_string());
    columns.extend(SENTIMENT_COLUMNS.iter().map(|c| (*c).to_string()));
    columns.extend(metadata_columns.iter().cloned());
    columns.extend([AGE, IS_FEMALE, MONTH].iter().map(|c| (*c).to_string()));
    columns
}

/// Write the table as CSV to any writer.
pub fn write_csv<W: Write>(table: &EnrichedTable, writer: W) -> Result<(), SnapshotError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(header(&table.metadata_columns))?;

    for (index, row) in table.rows.iter().enumerate() {
        let mut record = vec![index.to_string(), row.id.clone(), row.text.clone()];
        record.push(format_bool(row.contains_topic).to_string());
        match &row.sentiment {
            Some(s) => record.extend([s.neg, s.neu, s.pos, s.compound].map(format_f64)),
            None => record.extend(std::iter::repeat_n(String::new(), 4)),
        }
        for column in &table.metadata_columns {
            record.push(row.attr(column).unwrap_or_default().to_string());
        }
        record.push(format_opt_f64(row.age));
        record.push(format_bool(row.is_female).to_string());
        record.push(row.month.map(|m| m.to_string()).unwrap_or_default());
        wtr.write_record(&record)?;
    }

    wtr.flush().map_err(|source| SnapshotError::Io {
        path: "<writer>".into(),
        source,
    })?;
    Ok(())
}

/// Write the table to `path`, creating parent directories as needed.
pub fn save(table: &EnrichedTable, path: &Path) -> Result<(), SnapshotError> {
    let io_err = |source| SnapshotError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let file = File::create(path).map_err(io_err)?;
    write_csv(table, file)?;
    info!("Saved {} rows to {}", table.rows.len(), path.display());
    Ok(())
}

fn parse_bool(row: usize, column: &'static str, value: &str) -> Result<bool, SnapshotError> {
    match value {
        "True" | "true" => Ok(true),
        "False" | "false" => Ok(false),
        other => Err(SnapshotError::InvalidValue {
            row,
            column,
            value: other.to_string(),
        }),
    }
}

fn parse_opt<T: std::str::FromStr>(
    row: usize,
    column: &'static str,
    value: &str,
) -> Result<Option<T>, SnapshotError> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| SnapshotError::InvalidValue {
            row,
            column,
            value: value.to_string(),
        })
}

/// Read a snapshot previously written by [`write_csv`].
pub fn read_csv<R: Read>(reader: R) -> Result<EnrichedTable, SnapshotError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

    let position = |name: &'static str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(SnapshotError::MissingColumn(name))
    };
    let id_at = position(ID_COLUMN)?;
    let text_at = position(TEXT)?;
    let topic_at = position(CONTAINS_TOPIC)?;
    let sentiment_at = [
        position(SENTIMENT_COLUMNS[0])?,
        position(SENTIMENT_COLUMNS[1])?,
        position(SENTIMENT_COLUMNS[2])?,
        position(SENTIMENT_COLUMNS[3])?,
    ];
    let age_at = position(AGE)?;
    let female_at = position(IS_FEMALE)?;
    let month_at = position(MONTH)?;

    let mut reserved = vec![id_at, text_at, topic_at, age_at, female_at, month_at];
    reserved.extend(sentiment_at);
    if headers.first().is_some_and(|h| h.is_empty()) {
        reserved.push(0);
    }
    let metadata: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| !reserved.contains(i))
        .map(|(i, h)| (i, h.clone()))
        .collect();

    let mut rows = Vec::new();
    for (n, record) in rdr.records().enumerate() {
        let record = record?;
        let field = |i: usize| record.get(i).unwrap_or_default();

        let components: Vec<Option<f64>> = sentiment_at
            .iter()
            .zip(SENTIMENT_COLUMNS)
            .map(|(&i, name)| parse_opt::<f64>(n, name, field(i)))
            .collect::<Result<_, _>>()?;
        let sentiment = match components.as_slice() {
            [Some(neg), Some(neu), Some(pos), Some(compound)] => Some(SentimentScores {
                neg: *neg,
                neu: *neu,
                pos: *pos,
                compound: *compound,
            }),
            _ => None,
        };

        let attributes: BTreeMap<String, String> = metadata
            .iter()
            .filter(|(i, _)| !field(*i).is_empty())
            .map(|(i, h)| (h.clone(), field(*i).to_string()))
            .collect();

        rows.push(EnrichedRow {
            id: field(id_at).to_string(),
            text: field(text_at).to_string(),
            contains_topic: parse_bool(n, CONTAINS_TOPIC, field(topic_at))?,
            sentiment,
            attributes,
            age: parse_opt(n, AGE, field(age_at))?,
            is_female: parse_bool(n, IS_FEMALE, field(female_at))?,
            month: parse_opt(n, MONTH, field(month_at))?,
        });
    }

    Ok(EnrichedTable {
        metadata_columns: metadata.into_iter().map(|(_, h)| h).collect(),
        rows,
    })
}

/// Load a snapshot from `path`.
pub fn load(path: &Path) -> Result<EnrichedTable, SnapshotError> {
    let file = File::open(path).map_err(|source| SnapshotError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let table = read_csv(file)?;
    info!("Loaded {} rows from {}", table.rows.len(), path.display());
    Ok(table)
}
