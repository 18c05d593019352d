use serde::{Deserialize, Serialize};

use crate::normalize::normalize;

//
// ─── GRADE OUTCOME ─────────────────────────────────────────────────────────────
//

/// Classification of one answer against its gold answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GradeOutcome {
    /// Nothing was entered (after normalization).
    Empty,
    /// Either normalized text contains the other.
    Correct,
    /// No containment, but at least one synonym rule fired.
    Partial,
    Wrong,
}

impl GradeOutcome {
    /// Credit in half points: 2 for `Correct`, 1 for `Partial`, 0 otherwise.
    ///
    /// Scores are accumulated in half points so sums stay exact.
    #[must_use]
    pub fn half_points(self) -> u32 {
        match self {
            GradeOutcome::Correct => 2,
            GradeOutcome::Partial => 1,
            GradeOutcome::Empty | GradeOutcome::Wrong => 0,
        }
    }

    #[must_use]
    pub fn weight(self) -> f64 {
        f64::from(self.half_points()) / 2.0
    }

    /// Feedback text shown under the question.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            GradeOutcome::Empty => "No answer yet.",
            GradeOutcome::Correct => "Correct",
            GradeOutcome::Partial => "Partially correct",
            GradeOutcome::Wrong => "Try again",
        }
    }

    /// Style class for the feedback line. Empty answers are styled as wrong.
    #[must_use]
    pub fn style(self) -> &'static str {
        match self {
            GradeOutcome::Correct => "correct",
            GradeOutcome::Partial => "partial",
            GradeOutcome::Empty | GradeOutcome::Wrong => "wrong",
        }
    }
}

//
// ─── SYNONYM RULES ─────────────────────────────────────────────────────────────
//

/// Built-in partial-credit table, in evaluation order.
pub const DEFAULT_SYNONYMS: &[(&str, &str)] = &[
    ("cleared within 48 hours", "48 hours"),
    ("stopped the medication", "stopped medication"),
    ("mild skin rash", "skin rash"),
];

/// Partial credit when the gold answer contains `gold_fragment` and the
/// learner's answer contains `user_fragment`.
///
/// Fragments are literal substrings in normalized form, not patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymRule {
    gold_fragment: String,
    user_fragment: String,
}

impl SynonymRule {
    /// Build a rule; both fragments are normalized so they compare against
    /// normalized answers.
    #[must_use]
    pub fn new(gold_fragment: &str, user_fragment: &str) -> Self {
        Self {
            gold_fragment: normalize(gold_fragment),
            user_fragment: normalize(user_fragment),
        }
    }

    /// The built-in table as owned rules.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        DEFAULT_SYNONYMS
            .iter()
            .map(|(gold, user)| Self::new(gold, user))
            .collect()
    }

    #[must_use]
    pub fn gold_fragment(&self) -> &str {
        &self.gold_fragment
    }

    #[must_use]
    pub fn user_fragment(&self) -> &str {
        &self.user_fragment
    }

    /// Whether this rule fires for already-normalized gold and user text.
    #[must_use]
    pub fn fires(&self, gold: &str, user: &str) -> bool {
        gold.contains(self.gold_fragment.as_str()) && user.contains(self.user_fragment.as_str())
    }
}

//
// ─── CLASSIFY ──────────────────────────────────────────────────────────────────
//

/// Classify a raw learner answer against a raw gold answer.
///
/// Order of checks:
/// 1. empty normalized answer is `Empty`, whatever the rules say;
/// 2. containment in either direction is `Correct`;
/// 3. any firing rule is `Partial` (several firing rules still give one partial credit);
/// 4. otherwise `Wrong`.
///
/// An empty gold answer is contained in every answer, so any non-empty
/// answer to it is `Correct`.
///
/// ```
/// # use lesson_core::{classify, GradeOutcome, SynonymRule};
/// let rules = SynonymRule::defaults();
/// assert_eq!(classify("48 hours", "Cleared within 48 hours", &rules), GradeOutcome::Correct);
/// assert_eq!(classify("a skin rash", "mild skin rash appeared", &rules), GradeOutcome::Partial);
/// ```
#[must_use]
pub fn classify<'a>(
    user_raw: impl Into<Option<&'a str>>,
    gold_raw: &str,
    rules: &[SynonymRule],
) -> GradeOutcome {
    let user = normalize(user_raw);
    if user.is_empty() {
        return GradeOutcome::Empty;
    }
    let gold = normalize(gold_raw);

    if gold.contains(user.as_str()) || user.contains(gold.as_str()) {
        return GradeOutcome::Correct;
    }

    let fired = rules.iter().filter(|rule| rule.fires(&gold, &user)).count();
    if fired > 0 {
        GradeOutcome::Partial
    } else {
        GradeOutcome::Wrong
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOLD_48: &str = "Cleared within 48 hours";

    #[test]
    fn longer_answer_containing_gold_is_correct() {
        let rules = SynonymRule::defaults();
        assert_eq!(
            classify("it cleared within 48 hours of starting", GOLD_48, &rules),
            GradeOutcome::Correct
        );
    }

    #[test]
    fn shorter_answer_contained_in_gold_is_correct() {
        let rules = SynonymRule::defaults();
        assert_eq!(classify("48 hours", GOLD_48, &rules), GradeOutcome::Correct);
    }

    #[test]
    fn equal_after_normalization_is_correct() {
        assert_eq!(
            classify("  cleared, WITHIN 48 hours!! ", GOLD_48, &[]),
            GradeOutcome::Correct
        );
    }

    #[test]
    fn irrelevant_rule_does_not_rescue_wrong_answer() {
        let rules = SynonymRule::defaults();
        assert_eq!(
            classify("it stopped medication", GOLD_48, &rules),
            GradeOutcome::Wrong
        );
    }

    #[test]
    fn firing_rule_gives_partial_credit() {
        let rules = vec![SynonymRule::new("mild skin rash", "skin rash")];
        let outcome = classify("a skin rash, I think", "mild skin rash appeared", &rules);
        assert_eq!(outcome, GradeOutcome::Partial);
        assert_eq!(outcome.weight(), 0.5);
    }

    #[test]
    fn containment_is_checked_before_rules() {
        let rules = vec![SynonymRule::new("mild skin rash", "skin rash")];
        assert_eq!(
            classify("skin rash", "mild skin rash appeared", &rules),
            GradeOutcome::Correct
        );
    }

    #[test]
    fn several_firing_rules_still_cap_at_one_partial() {
        let rules = vec![
            SynonymRule::new("stopped the medication", "stopped"),
            SynonymRule::new("medication", "medicine"),
        ];
        let outcome = classify(
            "i stopped taking the medicine",
            "She stopped the medication",
            &rules,
        );
        assert_eq!(outcome, GradeOutcome::Partial);
        assert_eq!(outcome.half_points(), 1);
    }

    #[test]
    fn empty_answer_is_empty_regardless_of_rules() {
        let rules = vec![SynonymRule::new("", "")];
        assert_eq!(classify("", GOLD_48, &rules), GradeOutcome::Empty);
        assert_eq!(classify(None, GOLD_48, &rules), GradeOutcome::Empty);
        assert_eq!(classify(" .,; ", "", &rules), GradeOutcome::Empty);
    }

    #[test]
    fn any_answer_matches_empty_gold() {
        assert_eq!(classify("anything", "", &[]), GradeOutcome::Correct);
    }

    #[test]
    fn rule_fragments_are_literal_not_patterns() {
        let rules = vec![SynonymRule::new("rash", "r?h")];
        assert_eq!(classify("rough", "mild skin rash", &rules), GradeOutcome::Wrong);
    }

    #[test]
    fn labels_and_styles() {
        assert_eq!(GradeOutcome::Empty.label(), "No answer yet.");
        assert_eq!(GradeOutcome::Empty.style(), "wrong");
        assert_eq!(GradeOutcome::Partial.label(), "Partially correct");
        assert_eq!(GradeOutcome::Wrong.label(), "Try again");
        assert_eq!(GradeOutcome::Correct.weight(), 1.0);
    }
}
