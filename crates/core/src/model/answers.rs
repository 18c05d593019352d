use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnswerSetError {
    #[error("stored answers are not a JSON object: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Raw learner input per question index, exactly as typed.
///
/// Persisted as a JSON object keyed `"q<index>"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserAnswerSet {
    answers: BTreeMap<usize, String>,
}

impl UserAnswerSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw answer for a question, if one was ever entered.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.answers.get(&index).map(String::as_str)
    }

    pub fn set(&mut self, index: usize, text: impl Into<String>) {
        self.answers.insert(index, text.into());
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.answers.iter().map(|(idx, text)| (*idx, text.as_str()))
    }

    /// Serialized form for the key-value store.
    #[must_use]
    pub fn to_json(&self) -> String {
        let keyed: BTreeMap<String, &str> = self
            .answers
            .iter()
            .map(|(idx, text)| (format!("q{idx}"), text.as_str()))
            .collect();
        // A map of strings always serializes.
        serde_json::to_string(&keyed).unwrap_or_else(|_| String::from("{}"))
    }

    /// Parse the stored form. Keys that are not `q<index>` are ignored, and
    /// non-string values count as never answered.
    ///
    /// # Errors
    ///
    /// Returns `AnswerSetError::Malformed` if `raw` is not a JSON object.
    pub fn from_json(raw: &str) -> Result<Self, AnswerSetError> {
        let keyed: BTreeMap<String, serde_json::Value> = serde_json::from_str(raw)?;
        let answers = keyed
            .into_iter()
            .filter_map(|(key, value)| {
                let idx = key.strip_prefix('q')?.parse::<usize>().ok()?;
                match value {
                    serde_json::Value::String(text) => Some((idx, text)),
                    _ => None,
                }
            })
            .collect();
        Ok(Self { answers })
    }
}
