use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("answer key has {answers} entries but there are {questions} questions")]
    AnswerKeyMismatch { questions: usize, answers: usize },
}

//
// ─── VOCABULARY ────────────────────────────────────────────────────────────────
//

/// One row of the lesson's vocabulary table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub term: String,
    pub meaning: String,
    pub example: String,
}

//
// ─── LESSON DOCUMENT ───────────────────────────────────────────────────────────
//

/// Wire shape of `lesson.json`, before validation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDocumentDraft {
    #[serde(default)]
    pub transcript: Vec<String>,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub answer_key: Vec<String>,
    #[serde(default)]
    pub vocabulary: Vec<VocabularyEntry>,
    #[serde(default)]
    pub roleplay: BTreeMap<String, String>,
}

impl LessonDocumentDraft {
    /// Check index alignment of questions and gold answers.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::AnswerKeyMismatch` if the lengths differ.
    pub fn validate(self) -> Result<LessonDocument, LessonError> {
        if self.questions.len() != self.answer_key.len() {
            return Err(LessonError::AnswerKeyMismatch {
                questions: self.questions.len(),
                answers: self.answer_key.len(),
            });
        }

        Ok(LessonDocument {
            transcript: self.transcript,
            questions: self.questions,
            answer_key: self.answer_key,
            vocabulary: self.vocabulary,
            roleplay: self.roleplay,
        })
    }
}

/// Read-only lesson content, loaded once per session.
///
/// `questions` and `answer_key` always have the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonDocument {
    transcript: Vec<String>,
    questions: Vec<String>,
    answer_key: Vec<String>,
    vocabulary: Vec<VocabularyEntry>,
    roleplay: BTreeMap<String, String>,
}

impl LessonDocument {
    /// Parse and validate a lesson from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::Parse` for malformed JSON and
    /// `LessonError::AnswerKeyMismatch` for misaligned questions/answers.
    pub fn from_json(raw: &str) -> Result<Self, LessonError> {
        let draft: LessonDocumentDraft = serde_json::from_str(raw)?;
        draft.validate()
    }

    #[must_use]
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Transcript lines joined with newlines, as displayed.
    #[must_use]
    pub fn transcript_text(&self) -> String {
        self.transcript.join("\n")
    }

    #[must_use]
    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    /// 1-based numbered prompt, e.g. `"2. When did it clear?"`.
    #[must_use]
    pub fn question_label(&self, index: usize) -> Option<String> {
        self.questions
            .get(index)
            .map(|prompt| format!("{}. {prompt}", index + 1))
    }

    #[must_use]
    pub fn answer_key(&self) -> &[String] {
        &self.answer_key
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn vocabulary(&self) -> &[VocabularyEntry] {
        &self.vocabulary
    }

    #[must_use]
    pub fn has_vocabulary(&self) -> bool {
        !self.vocabulary.is_empty()
    }

    /// Tab names in stable order.
    pub fn roleplay_tabs(&self) -> impl Iterator<Item = &str> {
        self.roleplay.keys().map(String::as_str)
    }

    /// Script for a roleplay tab; unknown tabs show nothing.
    #[must_use]
    pub fn roleplay_script(&self, tab: &str) -> &str {
        self.roleplay.get(tab).map_or("", String::as_str)
    }
}
