/// Sentiment scorer trait and shared types.
///
/// The pipeline treats scoring as a black box: any lexicon-based analyser
/// that yields the four VADER components can sit behind [`SentimentScorer`].
pub mod mock;
pub mod vader;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while scoring text.
#[derive(Error, Debug)]
pub enum SentimentError {
    #[error("scorer returned no `{0}` component")]
    MissingComponent(&'static str),

    #[error("compound score {0} outside [-1, 1]")]
    CompoundOutOfRange(f64),
}

/// Negative, neutral, positive and compound polarity of one text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    pub neg: f64,
    pub neu: f64,
    pub pos: f64,
    /// Aggregate polarity in `[-1, 1]`.
    pub compound: f64,
}

impl SentimentScores {
    pub fn new(neg: f64, neu: f64, pos: f64, compound: f64) -> Result<Self, SentimentError> {
        if !(-1.0..=1.0).contains(&compound) {
            return Err(SentimentError::CompoundOutOfRange(compound));
        }
        Ok(Self {
            neg,
            neu,
            pos,
            compound,
        })
    }
}

/// Trait for sentiment scoring implementations.
pub trait SentimentScorer {
    fn score(&self, text: &str) -> Result<SentimentScores, SentimentError>;
}
