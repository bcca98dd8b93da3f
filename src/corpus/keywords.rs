use regex::{Regex, RegexBuilder};

use super::CorpusError;

/// Topics searched by default: AI and military technology themes
/// discussed around the REAIM summit.
pub const DEFAULT_TOPICS: &[&str] = &[
    "reaim",
    "reaim summit",
    "artificial intelligence",
    "ai",
    "military technology",
    "defense technology",
    "machine learning",
    "deep learning",
    "neural network",
    "drone",
    "military",
];

/// Regex fragment for a single topic.
///
/// A few phrases get plural-aware variants; everything else is a whole-word
/// match. The topic is inserted verbatim, so it must not contain regex syntax.
pub fn fragment_for(topic: &str) -> String {
    match topic {
        "military technology" | "defense technology" => {
            let word = topic.split_whitespace().next().unwrap_or(topic);
            format!(r"\b{word} technolog(?:y|ies)?\b")
        }
        "neural network" => r"\bneural network(?:s)?\b".to_string(),
        "drone" => r"\bdrones?\b".to_string(),
        other => format!(r"\b{other}\b"),
    }
}

/// All topics compiled into one case-insensitive alternation.
#[derive(Debug, Clone)]
pub struct TopicPattern {
    regex: Regex,
}

impl TopicPattern {
    pub fn build<S: AsRef<str>>(topics: &[S]) -> Result<Self, CorpusError> {
        if topics.is_empty() {
            return Err(CorpusError::NoTopics);
        }
        let source = topics
            .iter()
            .map(|t| fragment_for(t.as_ref()))
            .collect::<Vec<_>>()
            .join("|");
        let regex = RegexBuilder::new(&source).case_insensitive(true).build()?;
        Ok(Self { regex })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}
