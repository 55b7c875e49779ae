use crate::error::EngineResult;
use crate::models::{ModelName, ModelOverride};

pub const BASELINE_SCORE: i64 = 50;
pub const MIN_SCORE: i64 = 0;
pub const MAX_SCORE: i64 = 100;

// Lower bounds (exclusive) of each band
const AGGRESSIVE_ABOVE: u8 = 80;
const BALANCED_ABOVE: u8 = 50;

/// Fold answer contributions into a risk score in `[0, 100]`.
///
/// Unanswered slots contribute nothing. The total is clamped once, after every
/// contribution has been summed, so intermediate totals may leave the range.
pub fn compute_risk_score(answers: &[Option<i32>]) -> u8 {
    let total = answers
        .iter()
        .flatten()
        .fold(BASELINE_SCORE, |acc, &c| acc + i64::from(c));

    let score = total.clamp(MIN_SCORE, MAX_SCORE) as u8;
    tracing::debug!(total, score, answered = answers.iter().flatten().count(), "risk score");
    score
}

/// Map a score to a model, unless an explicit override pins one.
pub fn select_model(score: u8, model_override: ModelOverride) -> ModelName {
    if let ModelOverride::Fixed(name) = model_override {
        return name;
    }

    match score {
        s if s > AGGRESSIVE_ABOVE => ModelName::Aggressive,
        s if s > BALANCED_ABOVE => ModelName::Balanced,
        _ => ModelName::Conservative,
    }
}

/// String boundary variant of [`select_model`]. Unknown override names fail.
pub fn select_model_named(score: u8, model_override: &str) -> EngineResult<ModelName> {
    Ok(select_model(score, model_override.parse()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use proptest::prelude::{any, prop_assert, proptest};
    use proptest::collection::vec;
    use proptest::option;

    #[test]
    fn all_unanswered_is_baseline() {
        assert_eq!(compute_risk_score(&[None; 7]), 50);
        assert_eq!(compute_risk_score(&[]), 50);
    }

    #[test]
    fn sums_answered_slots_only() {
        assert_eq!(compute_risk_score(&[Some(10), None, Some(-4), None]), 56);
    }

    #[test]
    fn clamps_once_after_summing() {
        // 50 + 15*4 = 110 mid-way, then back down to 80. Per-step clamping would give 70.
        let answers = [Some(15), Some(15), Some(15), Some(15), Some(-15), Some(-15)];
        assert_eq!(compute_risk_score(&answers), 80);

        assert_eq!(compute_risk_score(&[Some(15); 7]), 100);
        assert_eq!(compute_risk_score(&[Some(-15); 7]), 0);
    }

    #[test]
    fn thresholds() {
        assert_eq!(select_model(81, ModelOverride::Auto), ModelName::Aggressive);
        assert_eq!(select_model(80, ModelOverride::Auto), ModelName::Balanced);
        assert_eq!(select_model(51, ModelOverride::Auto), ModelName::Balanced);
        assert_eq!(select_model(50, ModelOverride::Auto), ModelName::Conservative);
        assert_eq!(select_model(0, ModelOverride::Auto), ModelName::Conservative);
        assert_eq!(select_model(100, ModelOverride::Auto), ModelName::Aggressive);
    }

    #[test]
    fn override_wins() {
        assert_eq!(
            select_model(95, ModelOverride::Fixed(ModelName::Conservative)),
            ModelName::Conservative
        );
        assert_eq!(select_model_named(95, "Conservative").unwrap(), ModelName::Conservative);
        assert_eq!(select_model_named(95, "Auto").unwrap(), ModelName::Aggressive);
    }

    #[test]
    fn unknown_override_name_is_fatal() {
        assert_eq!(
            select_model_named(60, "Speculative").unwrap_err(),
            EngineError::UnknownModel("Speculative".to_string())
        );
    }

    proptest! {
        #[test]
        fn prop_score_is_always_bounded(answers in vec(option::of(any::<i32>()), 0..32)) {
            let score = compute_risk_score(&answers);
            prop_assert!(score <= 100);
        }

        #[test]
        fn prop_score_ignores_answer_order(answers in vec(option::of(-15i32..=15), 0..16)) {
            let mut reversed = answers.clone();
            reversed.reverse();
            prop_assert!(compute_risk_score(&answers) == compute_risk_score(&reversed));
        }
    }
}
