use std::collections::HashMap;

use vader_sentiment::SentimentIntensityAnalyzer;

use super::{SentimentError, SentimentScorer, SentimentScores};

/// Scorer backed by the VADER lexicon.
pub struct VaderScorer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderScorer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderScorer {
    fn default() -> Self {
        Self::new()
    }
}

fn component(scores: &HashMap<&str, f64>, key: &'static str) -> Result<f64, SentimentError> {
    scores
        .get(key)
        .copied()
        .ok_or(SentimentError::MissingComponent(key))
}

impl SentimentScorer for VaderScorer {
    fn score(&self, text: &str) -> Result<SentimentScores, SentimentError> {
        let scores = self.analyzer.polarity_scores(text);
        SentimentScores::new(
            component(&scores, "neg")?,
            component(&scores, "neu")?,
            component(&scores, "pos")?,
            component(&scores, "compound")?,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_text() {
        let scorer = VaderScorer::new();
        let s = scorer.score("This is a great and wonderful plan.").unwrap();
        assert!(s.compound > 0.0);
        assert!(s.pos > s.neg);
    }

    #[test]
    fn test_negative_text() {
        let scorer = VaderScorer::new();
        let s = scorer.score("This is a terrible, horrible mistake.").unwrap();
        assert!(s.compound < 0.0);
    }

    #[test]
    fn test_components_bounded() {
        let scorer = VaderScorer::default();
        for text in ["The military uses drones today.", "We support the new drones!"] {
            let s = scorer.score(text).unwrap();
            assert!((-1.0..=1.0).contains(&s.compound));
            for v in [s.neg, s.neu, s.pos] {
                assert!((0.0..=1.0).contains(&v), "{text:?} -> {s:?}");
            }
        }
    }
}
