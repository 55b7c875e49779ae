use crate::error::EngineResult;
use crate::instruments::ReferenceDataset;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const PROJECTION_YEARS: i32 = 10;

/// Weighted portfolio-level figures derived from a model's allocations.
///
/// Ratios (`expected_return`, `fee_drag`, `yield_pct`, `volatility`) are
/// fractions; `projected_income` and `projected_value_10y` are in the same
/// currency unit as the portfolio value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsResult {
    pub expected_return: f64,
    pub fee_drag: f64,
    pub yield_pct: f64,
    /// Weight-blended, ignores covariance between holdings.
    pub volatility: f64,
    pub projected_income: f64,
    pub projected_value_10y: f64,
    /// Distinct sectors per ticker.
    pub diversification: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingAllocation {
    pub ticker: String,
    pub name: String,
    pub sector: String,
    pub weight: f64,
    pub amount: f64,
}

// An all-zero mapping divides by 1 instead of 0.
fn weight_total(weights: &BTreeMap<String, u32>) -> f64 {
    let total: f64 = weights.values().map(|w| f64::from(*w)).sum();
    if total == 0.0 { 1.0 } else { total }
}

/// Join `weights` against `dataset` and aggregate per-holding figures.
///
/// Fails only when a ticker is missing from the dataset. No validation is done
/// on `portfolio_value`; callers clamp it at the boundary.
pub fn compute_metrics(
    weights: &BTreeMap<String, u32>,
    portfolio_value: f64,
    dataset: &ReferenceDataset,
) -> EngineResult<MetricsResult> {
    let total = weight_total(weights);

    let mut expected_return = 0.0;
    let mut fee_drag = 0.0;
    let mut yield_pct = 0.0;
    let mut volatility = 0.0;
    let mut sectors = BTreeSet::new();

    for (ticker, weight) in weights {
        let w = f64::from(*weight) / total;
        let instrument = dataset.get(ticker)?;

        expected_return += w * instrument.return_5y;
        // fee_ratio is stored in percentage points
        fee_drag += w * (instrument.fee_ratio / 100.0);
        yield_pct += w * instrument.yield_pct;
        volatility += w * instrument.volatility;
        sectors.insert(instrument.sector.as_str());
    }

    let diversification = if weights.is_empty() {
        0.0
    } else {
        sectors.len() as f64 / weights.len() as f64
    };

    let result = MetricsResult {
        expected_return,
        fee_drag,
        yield_pct,
        volatility,
        projected_income: portfolio_value * yield_pct,
        projected_value_10y: portfolio_value * (1.0 + expected_return).powi(PROJECTION_YEARS),
        diversification,
    };

    tracing::debug!(
        holdings = weights.len(),
        portfolio_value,
        expected_return = result.expected_return,
        fee_drag = result.fee_drag,
        "computed portfolio metrics"
    );

    Ok(result)
}

/// Per-holding normalized weight and currency amount, in ticker order.
pub fn allocation_breakdown(
    weights: &BTreeMap<String, u32>,
    portfolio_value: f64,
    dataset: &ReferenceDataset,
) -> EngineResult<Vec<HoldingAllocation>> {
    let total = weight_total(weights);

    weights
        .iter()
        .map(|(ticker, weight)| {
            let instrument = dataset.get(ticker)?;
            let w = f64::from(*weight) / total;
            Ok(HoldingAllocation {
                ticker: ticker.clone(),
                name: instrument.name.clone(),
                sector: instrument.sector.clone(),
                weight: w,
                amount: portfolio_value * w,
            })
        })
        .collect()
}
