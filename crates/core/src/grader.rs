use std::fmt;

use crate::matcher::{GradeOutcome, SynonymRule, classify};
use crate::model::UserAnswerSet;

/// Weighted score over a question set: `points / total`.
///
/// Derived on demand from the answer set; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreReport {
    half_points: u32,
    total: usize,
}

impl ScoreReport {
    #[must_use]
    pub fn from_outcomes(outcomes: &[GradeOutcome]) -> Self {
        Self {
            half_points: outcomes.iter().map(|o| o.half_points()).sum(),
            total: outcomes.len(),
        }
    }

    /// Sum of weights; always a multiple of 0.5 in `[0, total]`.
    #[must_use]
    pub fn points(&self) -> f64 {
        f64::from(self.half_points) / 2.0
    }

    #[must_use]
    pub fn half_points(&self) -> u32 {
        self.half_points
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// `points / total`, or `0.0` for a lesson without questions.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.points() / self.total as f64
        }
    }
}

impl fmt::Display for ScoreReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Score: {} / {}", self.points(), self.total)
    }
}

/// Grade every question against its gold answer.
///
/// Questions without a stored answer count as empty. Pure: the answer set is
/// only read, so repeated calls with the same inputs give the same result.
#[must_use]
pub fn grade(
    answers: &UserAnswerSet,
    gold_answers: &[String],
    rules: &[SynonymRule],
) -> (ScoreReport, Vec<GradeOutcome>) {
    let outcomes: Vec<GradeOutcome> = gold_answers
        .iter()
        .enumerate()
        .map(|(idx, gold)| classify(answers.get(idx), gold, rules))
        .collect();

    (ScoreReport::from_outcomes(&outcomes), outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gold() -> Vec<String> {
        vec![
            "Cleared within 48 hours".into(),
            "mild skin rash appeared".into(),
            "She stopped the medication".into(),
        ]
    }

    #[test]
    fn mixed_outcomes_sum_to_fractional_score() {
        let mut answers = UserAnswerSet::new();
        answers.set(0, "48 hours");
        answers.set(1, "just a skin rash");
        answers.set(2, "she kept going");

        let (report, outcomes) = grade(&answers, &gold(), &SynonymRule::defaults());

        assert_eq!(
            outcomes,
            vec![GradeOutcome::Correct, GradeOutcome::Partial, GradeOutcome::Wrong]
        );
        assert_eq!(report.points(), 1.5);
        assert_eq!(report.total(), 3);
        assert_eq!(report.to_string(), "Score: 1.5 / 3");
        assert_eq!(report.ratio(), 0.5);
    }

    #[test]
    fn missing_answers_are_empty() {
        let (report, outcomes) = grade(&UserAnswerSet::new(), &gold(), &SynonymRule::defaults());
        assert!(outcomes.iter().all(|o| *o == GradeOutcome::Empty));
        assert_eq!(report.to_string(), "Score: 0 / 3");
    }

    #[test]
    fn whole_scores_print_without_decimals() {
        let mut answers = UserAnswerSet::new();
        answers.set(0, "cleared within 48 hours");
        answers.set(1, "Mild skin rash appeared.");
        let (report, _) = grade(&answers, &gold(), &[]);
        assert_eq!(report.to_string(), "Score: 2 / 3");
    }

    #[test]
    fn grading_is_repeatable_and_does_not_touch_answers() {
        let mut answers = UserAnswerSet::new();
        answers.set(1, "skin rash");
        let snapshot = answers.clone();
        let rules = SynonymRule::defaults();

        let first = grade(&answers, &gold(), &rules);
        let second = grade(&answers, &gold(), &rules);

        assert_eq!(first, second);
        assert_eq!(answers, snapshot);
    }

    #[test]
    fn points_stay_within_bounds_in_half_steps() {
        let mut answers = UserAnswerSet::new();
        for (idx, text) in ["48 hours", "skin rash", "stopped medication"].iter().enumerate() {
            answers.set(idx, *text);
        }
        let (report, _) = grade(&answers, &gold(), &SynonymRule::defaults());
        let points = report.points();
        assert!((0.0..=3.0).contains(&points));
        assert_eq!((points * 2.0).fract(), 0.0);
    }

    #[test]
    fn answers_beyond_the_key_are_ignored() {
        let mut answers = UserAnswerSet::new();
        answers.set(7, "stray");
        let (report, outcomes) = grade(&answers, &gold()[..1], &[]);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(report.total(), 1);
    }

    #[test]
    fn empty_lesson_scores_zero() {
        let (report, outcomes) = grade(&UserAnswerSet::new(), &[], &[]);
        assert!(outcomes.is_empty());
        assert_eq!(report.ratio(), 0.0);
        assert_eq!(report.to_string(), "Score: 0 / 0");
    }
}
