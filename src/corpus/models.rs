use std::collections::{BTreeMap, HashMap, HashSet};

use crate::sentiment::SentimentScores;

/// Metadata column holding the speech identifier.
pub const ID_COLUMN: &str = "ID";

pub const SPEAKER_NAME: &str = "Speaker_name";
pub const SPEAKER_PARTY: &str = "Speaker_party";
pub const SPEAKER_GENDER: &str = "Speaker_gender";
pub const SPEAKER_BIRTH: &str = "Speaker_birth";
pub const SPEAKER_MINISTER: &str = "Speaker_minister";
pub const PARTY_STATUS: &str = "Party_status";
pub const PARTY_ORIENTATION: &str = "Party_orientation";
pub const BODY: &str = "Body";
pub const DATE: &str = "Date";

/// One non-empty line of a speech document.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRow {
    pub id: String,
    pub text: String,
}

/// Per-document attributes read from a `-meta.tsv` file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetadataRow {
    pub id: String,
    pub fields: HashMap<String, String>,
}

/// Metadata rows plus the union of their columns in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct MetadataTable {
    pub columns: Vec<String>,
    pub rows: Vec<MetadataRow>,
}

impl MetadataTable {
    /// Register header columns, keeping the order in which they first appear.
    pub fn add_columns<'a>(&mut self, headers: impl IntoIterator<Item = &'a str>) {
        for header in headers {
            if !self.columns.iter().any(|c| c == header) {
                self.columns.push(header.to_string());
            }
        }
    }
}

/// A topic-matching speech joined with its speaker metadata and derived fields.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRow {
    pub id: String,
    pub text: String,
    pub contains_topic: bool,
    pub sentiment: Option<SentimentScores>,
    /// Joined metadata values; a missing key is a missing value.
    pub attributes: BTreeMap<String, String>,
    pub age: Option<f64>,
    pub is_female: bool,
    pub month: Option<u32>,
}

impl EnrichedRow {
    pub fn attr(&self, column: &str) -> Option<&str> {
        self.attributes.get(column).map(String::as_str)
    }

    pub fn compound(&self) -> Option<f64> {
        self.sentiment.as_ref().map(|s| s.compound)
    }
}

/// The final unit of analysis, persisted as the CSV snapshot.
#[derive(Debug, Clone, Default)]
pub struct EnrichedTable {
    /// Metadata columns other than `ID`, in first-seen order.
    pub metadata_columns: Vec<String>,
    pub rows: Vec<EnrichedRow>,
}

/// Keep the first row for every key, preserving input order.
pub fn dedup_by_id<T, F>(rows: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| seen.insert(key(row).to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speech(id: &str, text: &str) -> SpeechRow {
        SpeechRow {
            id: id.into(),
            text: text.into(),
        }
    }

    #[test]
    fn test_dedup_keeps_first_seen() {
        let rows = vec![
            speech("a", "first"),
            speech("b", "other"),
            speech("a", "second"),
        ];
        let deduped = dedup_by_id(rows, |r| r.id.as_str());
        assert_eq!(deduped, vec![speech("a", "first"), speech("b", "other")]);
    }

    #[test]
    fn test_add_columns_first_seen_order() {
        let mut table = MetadataTable::default();
        table.add_columns(["ID", "Date", "Body"]);
        table.add_columns(["ID", "Speaker_name", "Date"]);
        assert_eq!(table.columns, vec!["ID", "Date", "Body", "Speaker_name"]);
    }
}
