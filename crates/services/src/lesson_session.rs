use std::sync::Arc;

use lesson_core::completion::{
    CompletionAttempt, CompletionGate, CompletionRecord, PlaybackProgress, ReadinessReport,
};
use lesson_core::model::{LessonDocument, LessonSettings, UserAnswerSet};
use lesson_core::{Clock, GradeOutcome, ScoreReport, SynonymRule, grade, normalize};
use storage::repository::KeyValueStore;

use crate::error::LessonSessionError;
use crate::status::LessonStatus;

/// Roleplay tab shown when the page opens.
pub const DEFAULT_ROLEPLAY_TAB: &str = "rep";

//
// ─── GRADED ANSWERS ────────────────────────────────────────────────────────────
//

/// Result of the last "check answers" action.
#[derive(Debug, Clone, PartialEq)]
pub struct GradedAnswers {
    pub report: ScoreReport,
    pub outcomes: Vec<GradeOutcome>,
}

impl GradedAnswers {
    /// Feedback for one question, if it was graded.
    #[must_use]
    pub fn outcome(&self, index: usize) -> Option<GradeOutcome> {
        self.outcomes.get(index).copied()
    }

    /// The score line, e.g. `"Score: 2.5 / 5"`.
    #[must_use]
    pub fn score_display(&self) -> String {
        self.report.to_string()
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// State of one open lesson page plus the handlers for its events.
///
/// Every handler runs to completion before the next event is dispatched.
/// Mutations are written through to the store; a failed write is logged and
/// the in-memory state stays authoritative for the rest of the session.
pub struct LessonSession {
    lesson: LessonDocument,
    settings: LessonSettings,
    rules: Vec<SynonymRule>,
    store: Arc<dyn KeyValueStore>,
    clock: Clock,
    answers: UserAnswerSet,
    graded: Option<GradedAnswers>,
    playback: PlaybackProgress,
    gate: CompletionGate,
    resume_offer: Option<f64>,
    active_tab: String,
}

impl LessonSession {
    /// Open a lesson, restoring answers, completion and playback position
    /// from the store.
    ///
    /// Stored answers that cannot be parsed are discarded and the session
    /// starts with an empty answer set.
    ///
    /// # Errors
    ///
    /// Returns `LessonSessionError::Storage` if the store cannot be read.
    pub async fn load(
        lesson: LessonDocument,
        settings: LessonSettings,
        store: Arc<dyn KeyValueStore>,
        clock: Clock,
    ) -> Result<Self, LessonSessionError> {
        let answers_key = settings.answers_key();
        let answers = match store.get(&answers_key).await? {
            None => UserAnswerSet::new(),
            Some(raw) => match UserAnswerSet::from_json(&raw) {
                Ok(answers) => answers,
                Err(err) => {
                    tracing::warn!(
                        key = %answers_key,
                        error = %err,
                        "discarding unreadable saved answers"
                    );
                    if let Err(err) = store.remove(&answers_key).await {
                        tracing::warn!(
                            key = %answers_key,
                            error = %err,
                            "could not clear saved answers"
                        );
                    }
                    UserAnswerSet::new()
                }
            },
        };

        let gate = CompletionGate::new(
            store
                .get(&settings.completion_key())
                .await?
                .filter(|stamp| !stamp.is_empty())
                .map(CompletionRecord::new),
        );

        let last_position = store
            .get(&settings.position_key())
            .await?
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|pos| pos.is_finite())
            .unwrap_or(0.0);
        let resume_offer = (last_position > settings.resume_min_secs()).then_some(last_position);

        tracing::info!(
            questions = lesson.question_count(),
            restored_answers = answers.len(),
            completed = gate.is_completed(),
            "lesson session loaded"
        );

        Ok(Self {
            lesson,
            settings,
            rules: SynonymRule::defaults(),
            store,
            clock,
            answers,
            graded: None,
            playback: PlaybackProgress::default(),
            gate,
            resume_offer,
            active_tab: DEFAULT_ROLEPLAY_TAB.to_string(),
        })
    }

    /// Replace the synonym table (defaults to `SynonymRule::defaults()`).
    #[must_use]
    pub fn with_rules(mut self, rules: Vec<SynonymRule>) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn lesson(&self) -> &LessonDocument {
        &self.lesson
    }

    #[must_use]
    pub fn settings(&self) -> &LessonSettings {
        &self.settings
    }

    #[must_use]
    pub fn answers(&self) -> &UserAnswerSet {
        &self.answers
    }

    #[must_use]
    pub fn graded(&self) -> Option<&GradedAnswers> {
        self.graded.as_ref()
    }

    #[must_use]
    pub fn playback(&self) -> PlaybackProgress {
        self.playback
    }

    #[must_use]
    pub fn gate(&self) -> &CompletionGate {
        &self.gate
    }

    //
    // ─── ANSWERS ───────────────────────────────────────────────────────────────
    //

    /// Record the current text of one answer field.
    ///
    /// # Errors
    ///
    /// Returns `LessonSessionError::UnknownQuestion` for an index past the
    /// last question.
    pub async fn edit_answer(
        &mut self,
        index: usize,
        text: impl Into<String>,
    ) -> Result<(), LessonSessionError> {
        let count = self.lesson.question_count();
        if index >= count {
            return Err(LessonSessionError::UnknownQuestion { index, count });
        }

        self.answers.set(index, text);
        tracing::debug!(question = index, "answer edited");

        let key = self.settings.answers_key();
        let serialized = self.answers.to_json();
        self.write_through(&key, Some(&serialized)).await;
        Ok(())
    }

    /// Grade all answers and keep the result for display.
    pub fn check_answers(&mut self) -> &GradedAnswers {
        let (report, outcomes) = grade(&self.answers, self.lesson.answer_key(), &self.rules);
        tracing::info!(
            score = report.points(),
            total = report.total(),
            "answers checked"
        );
        self.graded.insert(GradedAnswers { report, outcomes })
    }

    /// Clear every answer and any shown score.
    pub async fn reset_answers(&mut self) {
        self.answers.clear();
        self.graded = None;
        tracing::info!("answers reset");

        let key = self.settings.answers_key();
        self.write_through(&key, None).await;
    }

    //
    // ─── PLAYBACK ──────────────────────────────────────────────────────────────
    //

    /// Handle a progress tick from the audio transport.
    ///
    /// Returns the recomputed readiness; it never completes the lesson.
    pub async fn playback_tick(
        &mut self,
        position: f64,
        duration: Option<f64>,
    ) -> ReadinessReport {
        self.playback = PlaybackProgress::new(position, duration);
        tracing::debug!(position, ?duration, "playback progress");

        let key = self.settings.position_key();
        let value = self.playback.effective_position().to_string();
        self.write_through(&key, Some(&value)).await;

        self.readiness()
    }

    /// Position saved by an earlier visit, if worth offering.
    #[must_use]
    pub fn resume_offer(&self) -> Option<f64> {
        self.resume_offer
    }

    /// Accept the resume offer: returns where to seek and withdraws the offer.
    pub fn take_resume(&mut self) -> Option<f64> {
        self.resume_offer.take()
    }

    //
    // ─── ROLEPLAY ──────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn active_tab(&self) -> &str {
        &self.active_tab
    }

    /// Switch roleplay tab and return its script (blank for unknown tabs).
    pub fn select_roleplay_tab(&mut self, tab: &str) -> &str {
        self.active_tab = tab.to_string();
        self.lesson.roleplay_script(tab)
    }

    #[must_use]
    pub fn active_script(&self) -> &str {
        self.lesson.roleplay_script(&self.active_tab)
    }

    //
    // ─── COMPLETION ────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn readiness(&self) -> ReadinessReport {
        ReadinessReport::evaluate(
            &self.playback,
            self.graded.is_some(),
            self.lesson.has_vocabulary(),
            &self.settings,
        )
    }

    #[must_use]
    pub fn can_complete(&self) -> bool {
        self.gate.can_complete(&self.readiness())
    }

    /// Handle the explicit "mark complete" action.
    pub async fn mark_complete(&mut self) -> CompletionAttempt {
        let readiness = self.readiness();
        let clock = self.clock;
        let attempt = self.gate.mark_complete(&readiness, || clock.stamp());

        match &attempt {
            CompletionAttempt::Recorded(record) => {
                tracing::info!(stamp = record.stamp(), "lesson completed");
                let key = self.settings.completion_key();
                self.write_through(&key, Some(record.stamp())).await;
            }
            CompletionAttempt::AlreadyCompleted => {
                tracing::debug!("lesson already completed");
            }
            CompletionAttempt::NotReady(report) => {
                tracing::debug!(?report, "completion requested before ready");
            }
        }

        attempt
    }

    #[must_use]
    pub fn status(&self) -> LessonStatus {
        let readiness = self.readiness();
        let total_questions = self.lesson.question_count();
        let answered = self
            .answers
            .iter()
            .filter(|(idx, text)| *idx < total_questions && !normalize(*text).is_empty())
            .count();

        LessonStatus {
            total_questions,
            answered,
            score: self.graded.as_ref().map(|g| g.report),
            readiness,
            can_complete: self.gate.can_complete(&readiness),
            completed_on: self.gate.record().map(CompletionRecord::display),
        }
    }

    async fn write_through(&self, key: &str, value: Option<&str>) {
        let result = match value {
            Some(value) => self.store.set(key, value).await,
            None => self.store.remove(key).await,
        };
        if let Err(err) = result {
            tracing::warn!(key, error = %err, "lesson state not persisted");
        }
    }
}
