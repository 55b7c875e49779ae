use crate::error::EngineResult;
use crate::instruments::ReferenceDataset;
use crate::metrics::{allocation_breakdown, compute_metrics, HoldingAllocation, MetricsResult};
use crate::models::{ModelCatalog, ModelName, ModelOverride};
use crate::scoring::{compute_risk_score, select_model};
use serde::Serialize;

/// Everything the presentation layer needs for the results view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub risk_score: u8,
    pub model: ModelName,
    pub overridden: bool,
    pub notes: String,
    pub metrics: MetricsResult,
    pub holdings: Vec<HoldingAllocation>,
}

/// Score the answers, pick a model and derive its metrics.
pub fn recommend(
    answers: &[Option<i32>],
    model_override: ModelOverride,
    portfolio_value: f64,
    catalog: &ModelCatalog,
    dataset: &ReferenceDataset,
) -> EngineResult<Recommendation> {
    let risk_score = compute_risk_score(answers);
    let name = select_model(risk_score, model_override);
    let model = catalog.get(name)?;

    let metrics = compute_metrics(&model.weights, portfolio_value, dataset)?;
    let holdings = allocation_breakdown(&model.weights, portfolio_value, dataset)?;

    tracing::debug!(risk_score, model = %name, %model_override, "recommendation ready");

    Ok(Recommendation {
        risk_score,
        model: name,
        overridden: model_override != ModelOverride::Auto,
        notes: model.notes.clone(),
        metrics,
        holdings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unanswered_quiz_lands_on_conservative() {
        let rec = recommend(
            &[None; 7],
            ModelOverride::Auto,
            100_000.0,
            ModelCatalog::builtin(),
            ReferenceDataset::builtin(),
        )
        .unwrap();

        assert_eq!(rec.risk_score, 50);
        assert_eq!(rec.model, ModelName::Conservative);
        assert!(!rec.overridden);
        assert_eq!(rec.holdings.len(), 5);
    }

    #[test]
    fn override_replaces_scored_model() {
        let rec = recommend(
            &[Some(15); 7],
            ModelOverride::Fixed(ModelName::Balanced),
            10_000.0,
            ModelCatalog::builtin(),
            ReferenceDataset::builtin(),
        )
        .unwrap();

        assert_eq!(rec.risk_score, 100);
        assert_eq!(rec.model, ModelName::Balanced);
        assert!(rec.overridden);
    }

    #[test]
    fn matches_direct_metrics_computation() {
        let catalog = ModelCatalog::builtin();
        let dataset = ReferenceDataset::builtin();
        let rec = recommend(&[Some(15), Some(12), Some(12)], ModelOverride::Auto, 50_000.0, catalog, dataset)
            .unwrap();

        assert_eq!(rec.risk_score, 89);
        assert_eq!(rec.model, ModelName::Aggressive);
        let model = catalog.get(ModelName::Aggressive).unwrap();
        assert_eq!(rec.metrics, compute_metrics(&model.weights, 50_000.0, dataset).unwrap());
    }
}
