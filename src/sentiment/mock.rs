/// Mock scorer for testing purposes.
///
/// Counts a tiny fixed word list so tests can predict the polarity of a
/// sentence without depending on the full lexicon.
use super::{SentimentError, SentimentScorer, SentimentScores};

const POSITIVE: &[&str] = &["good", "great", "safe", "support"];
const NEGATIVE: &[&str] = &["bad", "danger", "threat", "war"];

/// A deterministic scorer driven by a handful of polarity words.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockScorer;

impl SentimentScorer for MockScorer {
    fn score(&self, text: &str) -> Result<SentimentScores, SentimentError> {
        let words: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();
        if words.is_empty() {
            return SentimentScores::new(0.0, 0.0, 0.0, 0.0);
        }

        let pos = words.iter().filter(|w| POSITIVE.contains(&w.as_str())).count() as f64;
        let neg = words.iter().filter(|w| NEGATIVE.contains(&w.as_str())).count() as f64;
        let total = words.len() as f64;
        let compound = if pos + neg > 0.0 {
            (pos - neg) / (pos + neg)
        } else {
            0.0
        };

        SentimentScores::new(
            neg / total,
            (total - pos - neg) / total,
            pos / total,
            compound,
        )
    }
}
