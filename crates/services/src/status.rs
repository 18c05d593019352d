use lesson_core::{ReadinessReport, ScoreReport};

/// Snapshot of the lesson page state, for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonStatus {
    pub total_questions: usize,
    pub answered: usize,
    pub score: Option<ScoreReport>,
    pub readiness: ReadinessReport,
    pub can_complete: bool,
    pub completed_on: Option<String>,
}
