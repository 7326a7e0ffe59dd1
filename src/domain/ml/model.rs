use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The closed set of regressors the ensemble knows how to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelId {
    LinearRegression,
    RandomForest,
    HistGbm,
}

impl ModelId {
    pub const ALL: [ModelId; 3] = [
        ModelId::LinearRegression,
        ModelId::RandomForest,
        ModelId::HistGbm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::LinearRegression => "linear_regression",
            ModelId::RandomForest => "random_forest",
            ModelId::HistGbm => "hist_gbm",
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of one ensemble run.
///
/// `component_prices` holds exactly the models that were invoked, and
/// `ensemble_price` is their unweighted mean.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub ensemble_price: f64,
    pub component_prices: BTreeMap<ModelId, f64>,
}

impl PredictionResult {
    /// Returns `None` for an empty set; a mean over nothing is not a price.
    pub fn from_components(component_prices: BTreeMap<ModelId, f64>) -> Option<Self> {
        if component_prices.is_empty() {
            return None;
        }
        let sum: f64 = component_prices.values().sum();
        let ensemble_price = sum / component_prices.len() as f64;
        Some(Self {
            ensemble_price,
            component_prices,
        })
    }
}
