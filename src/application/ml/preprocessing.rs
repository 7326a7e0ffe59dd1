use crate::domain::errors::{ArtifactError, PricingError};
use crate::domain::ml::feature_registry::FeatureAssembler;
use crate::domain::ml::features::{FeatureRecord, FeatureVector};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Fitted numeric transform (e.g. a standard scaler).
pub trait NumericScaler: Send + Sync {
    /// Columns in the order the scaler was fitted on
    fn feature_names(&self) -> &[String];

    /// Per-column training means, aligned with `feature_names`
    fn training_means(&self) -> &[f64];

    /// Output is aligned with `feature_names`, whatever the record's key order.
    fn transform(&self, record: &HashMap<String, f64>) -> Result<Vec<f64>, PricingError>;
}

/// Fitted categorical transform (e.g. a one-hot encoder).
pub trait CategoricalEncoder: Send + Sync {
    /// Raw input columns in fitted order
    fn feature_names(&self) -> &[String];

    /// Expanded output columns, aligned with `transform` output
    fn output_names(&self) -> &[String];

    fn transform(&self, record: &HashMap<String, String>) -> Result<Vec<f64>, PricingError>;
}

/// Scaler + encoder, concatenated numeric-then-categorical.
///
/// The concatenation order must match the order the models were trained on;
/// getting it wrong does not fail, it just silently produces wrong prices.
/// The layout is therefore computed once here and stamped on every vector.
pub struct PreprocessingStage {
    scaler: Box<dyn NumericScaler>,
    encoder: Box<dyn CategoricalEncoder>,
    layout: Arc<[String]>,
}

impl PreprocessingStage {
    pub fn new(
        scaler: Box<dyn NumericScaler>,
        encoder: Box<dyn CategoricalEncoder>,
    ) -> Result<Self, ArtifactError> {
        if scaler.training_means().len() != scaler.feature_names().len() {
            return Err(ArtifactError::malformed(format!(
                "scaler declares {} columns but {} means",
                scaler.feature_names().len(),
                scaler.training_means().len()
            )));
        }

        let layout: Vec<String> = scaler
            .feature_names()
            .iter()
            .chain(encoder.output_names())
            .cloned()
            .collect();

        let mut seen = HashSet::new();
        if let Some(duplicate) = layout.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(ArtifactError::malformed(format!(
                "duplicate feature column '{}' across scaler and encoder",
                duplicate
            )));
        }

        Ok(Self {
            scaler,
            encoder,
            layout: layout.into(),
        })
    }

    /// `numeric_feature_names ++ encoded_categorical_feature_names`
    pub fn layout(&self) -> &[String] {
        &self.layout
    }

    /// Builds the assembler plan for exactly the columns these artifacts declare.
    pub fn assembler(&self) -> FeatureAssembler {
        let numeric = self
            .scaler
            .feature_names()
            .iter()
            .cloned()
            .zip(self.scaler.training_means().iter().copied())
            .collect();
        FeatureAssembler::new(numeric, self.encoder.feature_names().to_vec())
    }

    pub fn transform(&self, record: &FeatureRecord) -> Result<FeatureVector, PricingError> {
        let mut values = self.scaler.transform(&record.numeric)?;
        values.extend(self.encoder.transform(&record.categorical)?);

        let actual = values.len();
        FeatureVector::new(self.layout.clone(), values).ok_or(PricingError::ShapeMismatch {
            expected: self.layout.len(),
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Echoes raw values back in declared order.
    struct IdentityScaler {
        names: Vec<String>,
        means: Vec<f64>,
    }

    impl NumericScaler for IdentityScaler {
        fn feature_names(&self) -> &[String] {
            &self.names
        }

        fn training_means(&self) -> &[f64] {
            &self.means
        }

        fn transform(&self, record: &HashMap<String, f64>) -> Result<Vec<f64>, PricingError> {
            self.names
                .iter()
                .map(|n| record.get(n).copied().ok_or_else(|| PricingError::transform(n.clone())))
                .collect()
        }
    }

    /// One flag column per declared input; 1.0 when the value is "yes".
    struct FlagEncoder {
        names: Vec<String>,
        outputs: Vec<String>,
        extra_output: bool,
    }

    impl CategoricalEncoder for FlagEncoder {
        fn feature_names(&self) -> &[String] {
            &self.names
        }

        fn output_names(&self) -> &[String] {
            &self.outputs
        }

        fn transform(&self, record: &HashMap<String, String>) -> Result<Vec<f64>, PricingError> {
            let mut out: Vec<f64> = self
                .names
                .iter()
                .map(|n| if record.get(n).map(String::as_str) == Some("yes") { 1.0 } else { 0.0 })
                .collect();
            if self.extra_output {
                out.push(0.0);
            }
            Ok(out)
        }
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn stage(extra_output: bool) -> PreprocessingStage {
        PreprocessingStage::new(
            Box::new(IdentityScaler {
                names: strings(&["hour", "trip_distance", "tip"]),
                means: vec![12.0, 3.0, 1.5],
            }),
            Box::new(FlagEncoder {
                names: strings(&["car_type"]),
                outputs: strings(&["car_type_yes"]),
                extra_output,
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_layout_is_numeric_then_encoded() {
        assert_eq!(
            stage(false).layout(),
            strings(&["hour", "trip_distance", "tip", "car_type_yes"]).as_slice()
        );
    }

    #[test]
    fn test_transform_follows_declared_order_not_record_order() {
        let record = FeatureRecord {
            numeric: HashMap::from([
                ("tip".to_string(), 9.0),
                ("trip_distance".to_string(), 2.0),
                ("hour".to_string(), 7.0),
            ]),
            categorical: HashMap::from([("car_type".to_string(), "yes".to_string())]),
        };

        let vector = stage(false).transform(&record).unwrap();
        assert_eq!(vector.values(), &[7.0, 2.0, 9.0, 1.0]);
        assert_eq!(vector.get("tip"), Some(9.0));
    }

    #[test]
    fn test_encoder_width_drift_is_shape_mismatch() {
        let record = FeatureRecord {
            numeric: HashMap::from([
                ("tip".to_string(), 0.0),
                ("trip_distance".to_string(), 0.0),
                ("hour".to_string(), 0.0),
            ]),
            categorical: HashMap::new(),
        };

        let result = stage(true).transform(&record);
        assert!(matches!(
            result,
            Err(PricingError::ShapeMismatch {
                expected: 4,
                actual: 5
            })
        ));
    }

    #[test]
    fn test_assembler_plan_covers_declared_columns() {
        let assembler = stage(false).assembler();
        assert_eq!(assembler.fallback_columns(), vec!["tip"]);
    }

    #[test]
    fn test_duplicate_columns_are_rejected() {
        let result = PreprocessingStage::new(
            Box::new(IdentityScaler {
                names: strings(&["car_type_yes"]),
                means: vec![0.0],
            }),
            Box::new(FlagEncoder {
                names: strings(&["car_type"]),
                outputs: strings(&["car_type_yes"]),
                extra_output: false,
            }),
        );
        assert!(matches!(result, Err(ArtifactError::Malformed { .. })));
    }
}
