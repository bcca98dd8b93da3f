//! Enrichment pipeline: select documents, load their tables, flag topic
//! mentions, score sentiment, join metadata and derive Age/Gender/Month.
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::corpus::CorpusError;
use crate::corpus::keywords::TopicPattern;
use crate::corpus::loader::{CorpusTables, load_tables};
use crate::corpus::models::{
    DATE, EnrichedRow, EnrichedTable, ID_COLUMN, MetadataRow, SPEAKER_BIRTH, SPEAKER_GENDER,
    SpeechRow, dedup_by_id,
};
use crate::corpus::selector::select_documents;
use crate::sentiment::{SentimentError, SentimentScorer, SentimentScores};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Corpus(#[from] CorpusError),

    #[error("sentiment scoring failed for speech {id}: {source}")]
    Sentiment {
        id: String,
        #[source]
        source: SentimentError,
    },
}

/// Row counts at each stage of a pipeline run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub documents_selected: usize,
    pub speech_rows: usize,
    pub unique_speeches: usize,
    pub flagged: usize,
    pub final_rows: usize,
}

/// `reference_year - birth`, or `None` when the birth year is missing or not numeric.
pub fn derive_age(birth: Option<&str>, reference_year: i32) -> Option<f64> {
    let birth: f64 = birth?.trim().parse().ok()?;
    birth
        .is_finite()
        .then(|| f64::from(reference_year) - birth)
}

/// Month from the second dash-delimited segment of a `YYYY-MM-DD` date.
///
/// A missing date gives `None`; a present but malformed one is an error.
pub fn derive_month(id: &str, date: Option<&str>) -> Result<Option<u32>, CorpusError> {
    let Some(date) = date else {
        return Ok(None);
    };
    let malformed = || CorpusError::MalformedDate {
        id: id.to_string(),
        date: date.to_string(),
    };
    let month: u32 = date
        .split('-')
        .nth(1)
        .ok_or_else(malformed)?
        .trim()
        .parse()
        .map_err(|_| malformed())?;
    if !(1..=12).contains(&month) {
        return Err(malformed());
    }
    Ok(Some(month))
}

/// A speech row with its topic flag and, for flagged rows only, its scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSpeech {
    pub speech: SpeechRow,
    pub contains_topic: bool,
    pub sentiment: Option<SentimentScores>,
}

/// Flag every row against the topic pattern and score the flagged ones.
pub fn score_speeches<S: SentimentScorer + ?Sized>(
    speeches: Vec<SpeechRow>,
    pattern: &TopicPattern,
    scorer: &S,
) -> Result<Vec<ScoredSpeech>, PipelineError> {
    speeches
        .into_iter()
        .map(|speech| {
            let contains_topic = pattern.is_match(&speech.text);
            let sentiment = if contains_topic {
                let scores = scorer
                    .score(&speech.text)
                    .map_err(|source| PipelineError::Sentiment {
                        id: speech.id.clone(),
                        source,
                    })?;
                Some(scores)
            } else {
                None
            };
            Ok(ScoredSpeech {
                speech,
                contains_topic,
                sentiment,
            })
        })
        .collect()
}

/// Flag, score, join and filter the loaded tables.
pub fn enrich<S: SentimentScorer + ?Sized>(
    tables: CorpusTables,
    pattern: &TopicPattern,
    scorer: &S,
    reference_year: i32,
    report: &mut PipelineReport,
) -> Result<EnrichedTable, PipelineError> {
    report.speech_rows = tables.speeches.len();

    let speeches: Vec<SpeechRow> = dedup_by_id(tables.speeches, |s| s.id.as_str());
    let metadata: Vec<MetadataRow> = dedup_by_id(tables.metadata.rows, |m| m.id.as_str());
    report.unique_speeches = speeches.len();

    let scored = score_speeches(speeches, pattern, scorer)?;
    report.flagged = scored.iter().filter(|s| s.contains_topic).count();

    let metadata_by_id: HashMap<&str, &MetadataRow> =
        metadata.iter().map(|m| (m.id.as_str(), m)).collect();

    let mut rows = Vec::new();
    for ScoredSpeech {
        speech,
        contains_topic,
        sentiment,
    } in scored
    {
        if !contains_topic {
            continue;
        }

        let matched = metadata_by_id.get(speech.id.as_str());
        let attributes: BTreeMap<String, String> = matched
            .map(|m| {
                m.fields
                    .iter()
                    .filter(|(k, v)| k.as_str() != ID_COLUMN && !v.is_empty())
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default();

        let age = derive_age(attributes.get(SPEAKER_BIRTH).map(String::as_str), reference_year);
        let is_female = attributes.get(SPEAKER_GENDER).map(String::as_str) == Some("F");
        // An empty Date cell is present but malformed, unlike an absent one.
        let date = matched.and_then(|m| m.fields.get(DATE)).map(String::as_str);
        let month = derive_month(&speech.id, date)?;

        rows.push(EnrichedRow {
            id: speech.id,
            text: speech.text,
            contains_topic,
            sentiment,
            attributes,
            age,
            is_female,
            month,
        });
    }
    report.final_rows = rows.len();

    let metadata_columns = tables
        .metadata
        .columns
        .into_iter()
        .filter(|c| c != ID_COLUMN)
        .collect();

    Ok(EnrichedTable {
        metadata_columns,
        rows,
    })
}

/// Run the whole pipeline over a directory of speech documents.
pub fn build_corpus<T, S>(
    speeches_dir: &Path,
    topics: &[T],
    scorer: &S,
    reference_year: i32,
) -> Result<(EnrichedTable, PipelineReport), PipelineError>
where
    T: AsRef<str>,
    S: SentimentScorer + ?Sized,
{
    let pattern = TopicPattern::build(topics)?;
    let documents = select_documents(speeches_dir, &pattern)?;
    let tables = load_tables(&documents)?;

    let mut report = PipelineReport {
        documents_selected: documents.len(),
        ..Default::default()
    };
    let table = enrich(tables, &pattern, scorer, reference_year, &mut report)?;

    info!(
        "Pipeline finished: {} documents, {} speech rows ({} unique), {} flagged, {} kept",
        report.documents_selected,
        report.speech_rows,
        report.unique_speeches,
        report.flagged,
        report.final_rows
    );
    Ok((table, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::models::MetadataTable;
    use crate::sentiment::mock::MockScorer;

    fn speech(id: &str, text: &str) -> SpeechRow {
        SpeechRow {
            id: id.into(),
            text: text.into(),
        }
    }

    fn meta(id: &str, pairs: &[(&str, &str)]) -> MetadataRow {
        let mut fields: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        fields.insert(ID_COLUMN.into(), id.into());
        MetadataRow {
            id: id.into(),
            fields,
        }
    }

    fn run(speeches: Vec<SpeechRow>, rows: Vec<MetadataRow>) -> Result<EnrichedTable, PipelineError> {
        let mut metadata = MetadataTable::default();
        metadata.add_columns(["ID", "Speaker_birth", "Speaker_gender", "Date"]);
        metadata.rows = rows;
        let pattern = TopicPattern::build(&["military", "drone"]).unwrap();
        enrich(
            CorpusTables { speeches, metadata },
            &pattern,
            &MockScorer,
            2022,
            &mut PipelineReport::default(),
        )
    }

    #[test]
    fn test_scores_present_only_for_flagged_rows() {
        let pattern = TopicPattern::build(&["military", "drone"]).unwrap();
        let scored = score_speeches(
            vec![
                speech("1", "The military uses drones today."),
                speech("2", "The weather was nice."),
                speech("3", "A DRONE strike."),
            ],
            &pattern,
            &MockScorer,
        )
        .unwrap();
        for row in &scored {
            assert_eq!(row.contains_topic, row.sentiment.is_some(), "{row:?}");
            if let Some(s) = row.sentiment {
                assert!((-1.0..=1.0).contains(&s.compound));
            }
        }
        let flags: Vec<bool> = scored.iter().map(|r| r.contains_topic).collect();
        assert_eq!(flags, vec![true, false, true]);
    }

    #[test]
    fn test_derive_age() {
        assert_eq!(derive_age(Some("1970"), 2022), Some(52.0));
        assert_eq!(derive_age(Some(" 1980.0 "), 2022), Some(42.0));
        assert_eq!(derive_age(Some("abc"), 2022), None);
        assert_eq!(derive_age(Some(""), 2022), None);
        assert_eq!(derive_age(None, 2022), None);
    }

    #[test]
    fn test_derive_month() {
        assert_eq!(derive_month("1", Some("2022-03-15")).unwrap(), Some(3));
        assert_eq!(derive_month("1", None).unwrap(), None);
        assert!(matches!(
            derive_month("1", Some("2022")),
            Err(CorpusError::MalformedDate { .. })
        ));
        assert!(derive_month("1", Some("2022-xx-01")).is_err());
        assert!(derive_month("1", Some("2022-13-01")).is_err());
    }

    #[test]
    fn test_only_topic_rows_survive_with_scores() {
        let table = run(
            vec![
                speech("1", "The military uses drones today."),
                speech("2", "The weather was nice."),
            ],
            vec![
                meta("1", &[("Speaker_birth", "1970"), ("Speaker_gender", "F"), ("Date", "2022-03-15")]),
                meta("2", &[("Speaker_birth", "1960"), ("Date", "2022-04-01")]),
            ],
        )
        .unwrap();

        assert_eq!(table.rows.len(), 1);
        let row = &table.rows[0];
        assert_eq!(row.id, "1");
        assert!(row.contains_topic);
        let compound = row.compound().unwrap();
        assert!((-1.0..=1.0).contains(&compound));
        assert_eq!(row.age, Some(52.0));
        assert!(row.is_female);
        assert_eq!(row.month, Some(3));
        assert_eq!(table.metadata_columns, vec!["Speaker_birth", "Speaker_gender", "Date"]);
    }

    #[test]
    fn test_dedup_first_seen_before_join() {
        let table = run(
            vec![
                speech("1", "Military first."),
                speech("1", "Military second."),
            ],
            vec![
                meta("1", &[("Date", "2022-01-10")]),
                meta("1", &[("Date", "2022-09-10")]),
            ],
        )
        .unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].text, "Military first.");
        assert_eq!(table.rows[0].month, Some(1));
    }

    #[test]
    fn test_left_join_keeps_unmatched_rows() {
        let table = run(vec![speech("9", "Drones again.")], vec![]).unwrap();
        assert_eq!(table.rows.len(), 1);
        let row = &table.rows[0];
        assert!(row.attributes.is_empty());
        assert_eq!(row.age, None);
        assert!(!row.is_female);
        assert_eq!(row.month, None);
    }

    #[test]
    fn test_malformed_date_is_fatal() {
        let err = run(
            vec![speech("1", "Military budget.")],
            vec![meta("1", &[("Date", "2022")])],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Corpus(CorpusError::MalformedDate { .. })
        ));
    }

    #[test]
    fn test_empty_date_is_fatal() {
        let err = run(
            vec![speech("1", "Drones over the border.")],
            vec![meta("1", &[("Speaker_party", "VVD"), ("Date", ""), ("Body", "Lower house")])],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Corpus(CorpusError::MalformedDate { ref date, .. }) if date.is_empty()
        ));
    }

    #[test]
    fn test_non_numeric_birth_is_tolerated() {
        let table = run(
            vec![speech("1", "Military budget.")],
            vec![meta("1", &[("Speaker_birth", "abc"), ("Date", "2022-06-01")])],
        )
        .unwrap();
        assert_eq!(table.rows[0].age, None);
    }
}
