use crate::application::ml::{EnsemblePredictor, PreprocessingStage};
use crate::domain::errors::PricingError;
use crate::domain::geo::{TripDistance, resolve_distance};
use crate::domain::ml::feature_registry::FeatureAssembler;
use crate::domain::ml::model::{ModelId, PredictionResult};
use crate::domain::pricing::{FarePolicy, FareQuote, SurgePolicy};
use crate::domain::ride::RideRequest;
use tracing::warn;

/// Everything the core hands back to the response boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct FareEstimate {
    pub distance: TripDistance,
    pub prediction: PredictionResult,
    pub quote: FareQuote,
}

/// The per-request pricing pipeline over artifacts loaded once at startup.
///
/// Holds no mutable state, so a single instance behind an `Arc` serves
/// concurrent requests.
pub struct FareEstimator {
    assembler: FeatureAssembler,
    preprocessing: PreprocessingStage,
    ensemble: EnsemblePredictor,
    fare_policy: FarePolicy,
    surge_policy: SurgePolicy,
}

impl FareEstimator {
    pub fn new(
        preprocessing: PreprocessingStage,
        ensemble: EnsemblePredictor,
        fare_policy: FarePolicy,
        surge_policy: SurgePolicy,
    ) -> Self {
        let assembler = preprocessing.assembler();

        let fallback = assembler.fallback_columns();
        if !fallback.is_empty() {
            warn!(
                "{} feature column(s) are not supplied by ride requests and will use training fallbacks: {:?}",
                fallback.len(),
                fallback
            );
        }
        if ensemble.is_empty() {
            warn!("No ML models loaded - every fare request will fail until models are provided");
        }

        Self {
            assembler,
            preprocessing,
            ensemble,
            fare_policy,
            surge_policy,
        }
    }

    pub fn estimate(&self, request: &RideRequest) -> Result<FareEstimate, PricingError> {
        let distance = resolve_distance(request);
        let record = self.assembler.assemble(request, &distance);
        let features = self.preprocessing.transform(&record)?;
        let prediction = self.ensemble.predict(&features)?;

        let quote = FareQuote::compute(
            request,
            distance.km,
            prediction.ensemble_price,
            &self.fare_policy,
            &self.surge_policy,
        );

        Ok(FareEstimate {
            distance,
            prediction,
            quote,
        })
    }

    pub fn loaded_models(&self) -> Vec<ModelId> {
        self.ensemble.model_ids()
    }

    pub fn missing_models(&self) -> Vec<ModelId> {
        let loaded = self.loaded_models();
        ModelId::ALL
            .into_iter()
            .filter(|id| !loaded.contains(id))
            .collect()
    }

    pub fn feature_layout(&self) -> &[String] {
        self.preprocessing.layout()
    }

    pub fn fare_policy(&self) -> &FarePolicy {
        &self.fare_policy
    }

    pub fn surge_policy(&self) -> &SurgePolicy {
        &self.surge_policy
    }
}
