use crate::error::{EngineError, EngineResult};
use crate::instruments::ReferenceDataset;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModelName {
    Aggressive,   // score > 80
    Balanced,     // 51..=80
    Conservative, // score <= 50
}

impl ModelName {
    pub const ALL: [ModelName; 3] = [
        ModelName::Aggressive,
        ModelName::Balanced,
        ModelName::Conservative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelName::Aggressive => "Aggressive",
            ModelName::Balanced => "Balanced",
            ModelName::Conservative => "Conservative",
        }
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelName {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ModelName::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| EngineError::UnknownModel(s.to_string()))
    }
}

/// Either let the score pick the model, or pin one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ModelOverride {
    #[default]
    Auto,
    Fixed(ModelName),
}

impl ModelOverride {
    pub const AUTO: &'static str = "Auto";
}

impl fmt::Display for ModelOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelOverride::Auto => f.write_str(Self::AUTO),
            ModelOverride::Fixed(name) => fmt::Display::fmt(name, f),
        }
    }
}

impl FromStr for ModelOverride {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(Self::AUTO) {
            return Ok(ModelOverride::Auto);
        }
        s.parse().map(ModelOverride::Fixed)
    }
}

impl From<ModelOverride> for String {
    fn from(value: ModelOverride) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for ModelOverride {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A named template portfolio. Weights are integer percentages by ticker and
/// are not required to sum to exactly 100.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Model {
    pub name: ModelName,
    pub weights: BTreeMap<String, u32>,
    pub notes: String,
}

impl Model {
    fn new(name: ModelName, weights: &[(&str, u32)], notes: &str) -> Self {
        Self {
            name,
            weights: weights.iter().map(|(t, w)| (t.to_string(), *w)).collect(),
            notes: notes.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelCatalog {
    models: Vec<Model>,
}

static BUILTIN: Lazy<ModelCatalog> = Lazy::new(|| ModelCatalog {
    models: vec![
        Model::new(
            ModelName::Aggressive,
            &[("IVV", 35), ("NDQ", 25), ("CRYP", 15), ("RBTZ", 15), ("VHY", 10)],
            "Growth-heavy mix tilted to US large caps, technology and thematic funds. \
             Expect deep drawdowns along the way.",
        ),
        Model::new(
            ModelName::Balanced,
            &[("VAS", 30), ("VGS", 30), ("VAF", 20), ("VAP", 10), ("GOLD", 10)],
            "Roughly 70/30 growth to defensive, split across Australian and global shares \
             with bonds, property and gold as ballast.",
        ),
        Model::new(
            ModelName::Conservative,
            &[("VAF", 40), ("AAA", 25), ("VAS", 15), ("VHY", 10), ("VGS", 10)],
            "Capital preservation first: bonds and cash make up most of the portfolio, \
             with a small income-oriented equity sleeve.",
        ),
    ],
});

impl ModelCatalog {
    pub fn builtin() -> &'static ModelCatalog {
        &BUILTIN
    }

    pub fn get(&self, name: ModelName) -> EngineResult<&Model> {
        self.models
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| EngineError::UnknownModel(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Model> {
        self.models.iter()
    }

    /// Check that every ticker referenced by a model exists in `dataset`.
    pub fn validate(&self, dataset: &ReferenceDataset) -> EngineResult<()> {
        for model in &self.models {
            if let Some(missing) = model.weights.keys().find(|t| !dataset.contains(t)) {
                tracing::error!(model = %model.name, ticker = %missing, "model references unknown ticker");
                return Err(EngineError::UnknownTicker(missing.clone()));
            }
        }
        Ok(())
    }
}
