use super::predictor::FarePredictor;
use crate::domain::errors::PricingError;
use crate::domain::ml::features::FeatureVector;
use crate::domain::ml::model::{ModelId, PredictionResult};
use std::collections::BTreeMap;
use tracing::debug;

/// Ensemble Predictor
///
/// Runs every loaded regressor on the identical feature vector and averages
/// the results (unweighted). A model that failed to load is simply absent
/// from the map; a model that fails at prediction time aborts the request.
#[derive(Default)]
pub struct EnsemblePredictor {
    models: BTreeMap<ModelId, Box<dyn FarePredictor>>,
}

impl EnsemblePredictor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_models(models: impl IntoIterator<Item = Box<dyn FarePredictor>>) -> Self {
        let mut ensemble = Self::new();
        for model in models {
            ensemble.insert(model);
        }
        ensemble
    }

    /// Replaces any model already registered under the same id.
    pub fn insert(&mut self, model: Box<dyn FarePredictor>) {
        self.models.insert(model.id(), model);
    }

    pub fn remove(&mut self, id: ModelId) -> Option<Box<dyn FarePredictor>> {
        self.models.remove(&id)
    }

    pub fn model_ids(&self) -> Vec<ModelId> {
        self.models.keys().copied().collect()
    }

    pub fn backends(&self) -> BTreeMap<ModelId, String> {
        self.models
            .iter()
            .map(|(id, model)| (*id, model.backend().to_string()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<PredictionResult, PricingError> {
        if self.models.is_empty() {
            return Err(PricingError::NoModelsAvailable);
        }

        let mut component_prices = BTreeMap::new();
        for (id, model) in &self.models {
            if let Some(expected) = model.n_features().filter(|n| *n != features.len()) {
                return Err(PricingError::ModelFailure {
                    model: *id,
                    reason: format!(
                        "fitted on {} input columns, feature layout has {}",
                        expected,
                        features.len()
                    ),
                });
            }
            let price = model
                .predict(features)
                .map_err(|reason| PricingError::ModelFailure { model: *id, reason })?;
            if !price.is_finite() {
                return Err(PricingError::ModelFailure {
                    model: *id,
                    reason: format!("non-finite prediction {}", price),
                });
            }
            debug!("{} ({}) predicted {:.4}", id, model.backend(), price);
            component_prices.insert(*id, price);
        }

        PredictionResult::from_components(component_prices).ok_or(PricingError::NoModelsAvailable)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Arc;

    /// Test double returning a fixed price, or an error when `price` is `None`.
    pub(crate) struct FixedPredictor {
        pub id: ModelId,
        pub price: Option<f64>,
        pub width: Option<usize>,
    }

    impl FarePredictor for FixedPredictor {
        fn predict(&self, _features: &FeatureVector) -> Result<f64, String> {
            self.price.ok_or_else(|| "model exploded".to_string())
        }

        fn id(&self) -> ModelId {
            self.id
        }

        fn backend(&self) -> &str {
            "fixed"
        }

        fn n_features(&self) -> Option<usize> {
            self.width
        }
    }

    pub(crate) fn fixed(id: ModelId, price: f64) -> Box<dyn FarePredictor> {
        Box::new(FixedPredictor {
            id,
            price: Some(price),
            width: None,
        })
    }

    fn features() -> FeatureVector {
        let columns: Arc<[String]> = vec!["trip_distance".to_string()].into();
        FeatureVector::new(columns, vec![0.5]).unwrap()
    }

    #[test]
    fn test_mean_over_all_loaded_models() {
        let ensemble = EnsemblePredictor::from_models([
            fixed(ModelId::LinearRegression, 21.0),
            fixed(ModelId::RandomForest, 24.0),
            fixed(ModelId::HistGbm, 27.0),
        ]);

        let result = ensemble.predict(&features()).unwrap();
        assert_eq!(result.ensemble_price, 24.0);
        assert_eq!(result.component_prices.len(), 3);
        assert_eq!(result.component_prices[&ModelId::HistGbm], 27.0);
    }

    #[test]
    fn test_removing_a_model_recomputes_the_mean() {
        let mut ensemble = EnsemblePredictor::from_models([
            fixed(ModelId::LinearRegression, 21.0),
            fixed(ModelId::RandomForest, 24.0),
            fixed(ModelId::HistGbm, 27.0),
        ]);
        assert_eq!(ensemble.predict(&features()).unwrap().ensemble_price, 24.0);

        ensemble.remove(ModelId::HistGbm);
        let result = ensemble.predict(&features()).unwrap();
        assert_eq!(result.ensemble_price, 22.5);
        assert!(!result.component_prices.contains_key(&ModelId::HistGbm));
    }

    #[test]
    fn test_single_model_subset() {
        let ensemble = EnsemblePredictor::from_models([fixed(ModelId::RandomForest, 18.25)]);
        let result = ensemble.predict(&features()).unwrap();
        assert_eq!(result.ensemble_price, 18.25);
        assert_eq!(ensemble.model_ids(), vec![ModelId::RandomForest]);
    }

    #[test]
    fn test_no_models_is_an_error() {
        let ensemble = EnsemblePredictor::new();
        assert!(matches!(
            ensemble.predict(&features()),
            Err(PricingError::NoModelsAvailable)
        ));
    }

    #[test]
    fn test_single_failure_aborts_the_request() {
        let ensemble = EnsemblePredictor::from_models([
            fixed(ModelId::LinearRegression, 21.0),
            Box::new(FixedPredictor {
                id: ModelId::RandomForest,
                price: None,
                width: None,
            }) as Box<dyn FarePredictor>,
        ]);

        match ensemble.predict(&features()) {
            Err(PricingError::ModelFailure { model, reason }) => {
                assert_eq!(model, ModelId::RandomForest);
                assert_eq!(reason, "model exploded");
            }
            other => panic!("expected model failure, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_prediction_is_a_failure() {
        let ensemble = EnsemblePredictor::from_models([fixed(ModelId::HistGbm, f64::NAN)]);
        assert!(matches!(
            ensemble.predict(&features()),
            Err(PricingError::ModelFailure {
                model: ModelId::HistGbm,
                ..
            })
        ));
    }

    #[test]
    fn test_model_fitted_on_other_width_is_a_failure() {
        let ensemble = EnsemblePredictor::from_models([
            fixed(ModelId::LinearRegression, 21.0),
            Box::new(FixedPredictor {
                id: ModelId::RandomForest,
                price: Some(24.0),
                width: Some(4),
            }) as Box<dyn FarePredictor>,
        ]);

        match ensemble.predict(&features()) {
            Err(PricingError::ModelFailure { model, reason }) => {
                assert_eq!(model, ModelId::RandomForest);
                assert!(reason.contains("4 input columns"), "{reason}");
            }
            other => panic!("expected model failure, got {:?}", other),
        }
    }
}
