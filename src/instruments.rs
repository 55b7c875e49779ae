//! Reference dataset of exchange-traded funds
//!
//! This module handles:
//! - The builtin, process-wide instrument catalog
//! - Loading a replacement catalog from a JSON file
//! - Ticker lookups used by the metrics engine

use crate::error::{EngineError, EngineResult};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub ticker: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "unclassified", deserialize_with = "deserialize_sector")]
    pub sector: String,
    /// Annual management fee in percentage points (0.04 means 0.04%).
    pub fee_ratio: f64,
    /// 5-year annualized return as a fraction (0.108 means 10.8%).
    pub return_5y: f64,
    pub volatility: f64,
    #[serde(default)]
    pub yield_pct: f64,
}

#[derive(Debug, Deserialize)]
struct DatasetFile {
    instruments: Vec<Instrument>,
}

fn unclassified() -> String {
    "Unclassified".to_string()
}

// Dataset files may carry `sector` as a string or as an array of labels.
// Only the primary (first) label counts towards diversification.
fn deserialize_sector<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::de::Deserializer<'de>,
{
    use serde_json::Value;

    let v = Value::deserialize(deserializer).map_err(serde::de::Error::custom)?;
    match v {
        Value::String(s) => Ok(s),
        Value::Array(arr) => Ok(arr
            .into_iter()
            .find_map(|x| x.as_str().map(|s| s.to_string()))
            .unwrap_or_else(unclassified)),
        Value::Null => Ok(unclassified()),
        other => Ok(other.to_string()),
    }
}

/// Immutable instrument catalog keyed by ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceDataset {
    instruments: BTreeMap<String, Instrument>,
}

static BUILTIN: Lazy<ReferenceDataset> = Lazy::new(|| ReferenceDataset {
    instruments: builtin_instruments()
        .into_iter()
        .map(|i| (i.ticker.clone(), i))
        .collect(),
});

impl ReferenceDataset {
    /// The builtin dataset, initialised once per process.
    pub fn builtin() -> &'static ReferenceDataset {
        &BUILTIN
    }

    pub fn from_instruments(instruments: Vec<Instrument>) -> EngineResult<Self> {
        let mut map = BTreeMap::new();
        for instrument in instruments {
            let ticker = instrument.ticker.trim().to_string();
            if ticker.is_empty() {
                return Err(EngineError::Dataset("instrument with empty ticker".to_string()));
            }
            if map.insert(ticker.clone(), instrument).is_some() {
                return Err(EngineError::DuplicateTicker(ticker));
            }
        }
        Ok(Self { instruments: map })
    }

    /// Load a replacement dataset from `{ "instruments": [...] }` JSON.
    pub fn load_json(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            EngineError::Dataset(format!("failed to read '{}': {}", path.display(), e))
        })?;
        let file: DatasetFile = serde_json::from_str(&contents).map_err(|e| {
            EngineError::Dataset(format!("failed to parse '{}': {}", path.display(), e))
        })?;

        let dataset = Self::from_instruments(file.instruments)?;
        tracing::info!(path = %path.display(), instruments = dataset.len(), "loaded reference dataset");
        Ok(dataset)
    }

    pub fn get(&self, ticker: &str) -> EngineResult<&Instrument> {
        self.instruments
            .get(ticker)
            .ok_or_else(|| EngineError::UnknownTicker(ticker.to_string()))
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.instruments.contains_key(ticker)
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

fn instrument(
    ticker: &str,
    name: &str,
    sector: &str,
    fee_ratio: f64,
    return_5y: f64,
    volatility: f64,
    yield_pct: f64,
) -> Instrument {
    Instrument {
        ticker: ticker.to_string(),
        name: name.to_string(),
        sector: sector.to_string(),
        fee_ratio,
        return_5y,
        volatility,
        yield_pct,
    }
}

fn builtin_instruments() -> Vec<Instrument> {
    vec![
        // Growth sleeve
        instrument("IVV", "iShares S&P 500 ETF", "US Equities", 0.04, 0.148, 0.15, 0.012),
        instrument("NDQ", "Betashares Nasdaq 100 ETF", "Technology", 0.48, 0.178, 0.21, 0.006),
        instrument("CRYP", "Betashares Crypto Innovators ETF", "Crypto", 0.67, 0.050, 0.55, 0.0),
        instrument("RBTZ", "Betashares Global Robotics and AI ETF", "Technology", 0.57, 0.095, 0.22, 0.004),
        // Core and income
        instrument("VHY", "Vanguard Australian Shares High Yield ETF", "Australian Equities", 0.25, 0.085, 0.14, 0.055),
        instrument("VAS", "Vanguard Australian Shares Index ETF", "Australian Equities", 0.07, 0.082, 0.13, 0.039),
        instrument("VGS", "Vanguard MSCI Index International Shares ETF", "Global Equities", 0.18, 0.118, 0.13, 0.018),
        instrument("VAP", "Vanguard Australian Property Securities ETF", "Property", 0.23, 0.060, 0.18, 0.035),
        // Defensive
        instrument("VAF", "Vanguard Australian Fixed Interest Index ETF", "Fixed Income", 0.10, 0.004, 0.05, 0.031),
        instrument("AAA", "Betashares Australian High Interest Cash ETF", "Cash", 0.18, 0.021, 0.005, 0.042),
        instrument("GOLD", "Global X Physical Gold", "Commodities", 0.40, 0.105, 0.14, 0.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lookup_finds_known_ticker() {
        let ivv = ReferenceDataset::builtin().get("IVV").unwrap();
        assert_eq!(ivv.sector, "US Equities");
        assert_eq!(ivv.fee_ratio, 0.04);
    }

    #[test]
    fn unknown_ticker_is_an_error() {
        let err = ReferenceDataset::builtin().get("ZZZ").unwrap_err();
        assert_eq!(err, EngineError::UnknownTicker("ZZZ".to_string()));
    }

    #[test]
    fn duplicate_tickers_are_rejected() {
        let a = instrument("ABC", "A", "X", 0.1, 0.1, 0.1, 0.1);
        let err = ReferenceDataset::from_instruments(vec![a.clone(), a]).unwrap_err();
        assert_eq!(err, EngineError::DuplicateTicker("ABC".to_string()));
    }

    #[test]
    fn sector_accepts_string_or_array() {
        let json = r#"{"instruments":[
            {"ticker":"AAA","sector":"Cash","fee_ratio":0.1,"return_5y":0.02,"volatility":0.01},
            {"ticker":"BBB","sector":["Technology","Growth"],"fee_ratio":0.2,"return_5y":0.1,"volatility":0.2},
            {"ticker":"CCC","fee_ratio":0.3,"return_5y":0.05,"volatility":0.1}
        ]}"#;
        let file: DatasetFile = serde_json::from_str(json).unwrap();
        let dataset = ReferenceDataset::from_instruments(file.instruments).unwrap();

        assert_eq!(dataset.get("AAA").unwrap().sector, "Cash");
        assert_eq!(dataset.get("BBB").unwrap().sector, "Technology");
        assert_eq!(dataset.get("CCC").unwrap().sector, "Unclassified");
        assert_eq!(dataset.get("CCC").unwrap().yield_pct, 0.0);
    }

    #[test]
    fn load_json_reports_missing_file() {
        let path = std::env::temp_dir().join("wealth_engine_missing_dataset.json");
        let _ = std::fs::remove_file(&path);
        let err = ReferenceDataset::load_json(&path).unwrap_err();
        assert!(matches!(err, EngineError::Dataset(_)));
    }
}
