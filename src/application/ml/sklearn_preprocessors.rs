//! Preprocessors exported from scikit-learn as JSON.
//!
//! Field names follow the fitted sklearn attributes; the trailing-underscore
//! spellings (`mean_`, `categories_`, ...) are accepted as aliases so a plain
//! `{k: getattr(est, k)}` dump loads unchanged.

use super::preprocessing::{CategoricalEncoder, NumericScaler};
use crate::domain::errors::PricingError;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;

fn enabled() -> bool {
    true
}

/// On-disk layout of a fitted `StandardScaler`
#[derive(Debug, Deserialize)]
pub struct StandardScalerSpec {
    #[serde(alias = "feature_names_in_")]
    feature_names_in: Vec<String>,
    #[serde(alias = "mean_")]
    mean: Vec<f64>,
    #[serde(alias = "scale_", default)]
    scale: Option<Vec<f64>>,
    #[serde(default = "enabled")]
    with_mean: bool,
    #[serde(default = "enabled")]
    with_std: bool,
}

/// `(x - mean) / scale`, per column.
///
/// A scaler fitted with `with_mean=False` skips the subtraction but keeps
/// `mean_` as the training mean for unmapped columns.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "StandardScalerSpec")]
pub struct StandardScaler {
    feature_names: Vec<String>,
    mean: Vec<f64>,
    scale: Vec<f64>,
    center: bool,
}

impl StandardScaler {
    /// `scale = None` means unit variance (sklearn `with_std=False`).
    pub fn new(
        feature_names: Vec<String>,
        mean: Vec<f64>,
        scale: Option<Vec<f64>>,
    ) -> Result<Self, String> {
        if mean.len() != feature_names.len() {
            return Err(format!(
                "scaler has {} columns but {} means",
                feature_names.len(),
                mean.len()
            ));
        }
        let scale = scale.unwrap_or_else(|| vec![1.0; feature_names.len()]);
        if scale.len() != feature_names.len() {
            return Err(format!(
                "scaler has {} columns but {} scales",
                feature_names.len(),
                scale.len()
            ));
        }
        if let Some(i) = scale.iter().position(|s| !s.is_finite() || *s == 0.0) {
            return Err(format!(
                "scale for column '{}' must be finite and non-zero, got {}",
                feature_names[i], scale[i]
            ));
        }
        if let Some(i) = mean.iter().position(|m| !m.is_finite()) {
            return Err(format!("mean for column '{}' is not finite", feature_names[i]));
        }

        Ok(Self {
            feature_names,
            mean,
            scale,
            center: true,
        })
    }

    /// Scale only, as sklearn `with_mean=False` does.
    pub fn without_centering(mut self) -> Self {
        self.center = false;
        self
    }
}

impl TryFrom<StandardScalerSpec> for StandardScaler {
    type Error = String;

    fn try_from(spec: StandardScalerSpec) -> Result<Self, Self::Error> {
        let scale = if spec.with_std { spec.scale } else { None };
        let scaler = Self::new(spec.feature_names_in, spec.mean, scale)?;
        Ok(if spec.with_mean {
            scaler
        } else {
            scaler.without_centering()
        })
    }
}

impl NumericScaler for StandardScaler {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn training_means(&self) -> &[f64] {
        &self.mean
    }

    fn transform(&self, record: &HashMap<String, f64>) -> Result<Vec<f64>, PricingError> {
        self.feature_names
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let value = record.get(column).copied().ok_or_else(|| {
                    PricingError::transform(format!("missing numeric column '{}'", column))
                })?;
                if !value.is_finite() {
                    return Err(PricingError::transform(format!(
                        "non-finite value {} for column '{}'",
                        value, column
                    )));
                }
                let offset = if self.center { self.mean[i] } else { 0.0 };
                Ok((value - offset) / self.scale[i])
            })
            .collect()
    }
}

/// What to do with a category outside the fitted vocabulary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HandleUnknown {
    /// Fail the request (sklearn default)
    #[default]
    Error,
    /// Encode as all zeros
    Ignore,
}

impl FromStr for HandleUnknown {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Self::Error),
            "ignore" => Ok(Self::Ignore),
            // Both depend on infrequent-category grouping
            "infrequent_if_exist" | "warn" => Err(format!(
                "handle_unknown='{}' is not supported, refit the encoder with 'error' or 'ignore'",
                s
            )),
            other => Err(format!("unknown handle_unknown value '{}'", other)),
        }
    }
}

fn strict() -> String {
    "error".to_string()
}

/// On-disk layout of a fitted `OneHotEncoder`
#[derive(Debug, Deserialize)]
pub struct OneHotEncoderSpec {
    #[serde(alias = "feature_names_in_")]
    feature_names_in: Vec<String>,
    #[serde(alias = "categories_")]
    categories: Vec<Vec<String>>,
    #[serde(default = "strict")]
    handle_unknown: String,
    #[serde(alias = "drop_idx_", default)]
    drop_idx: Option<Vec<Option<usize>>>,
    // Infrequent-category grouping (sklearn >= 1.1) is not reproduced
    #[serde(default)]
    min_frequency: Option<Value>,
    #[serde(default)]
    max_categories: Option<Value>,
    #[serde(alias = "infrequent_categories_", default)]
    infrequent_categories: Option<Value>,
}

impl OneHotEncoderSpec {
    fn reject_infrequent_grouping(&self) -> Result<(), String> {
        for (name, option) in [
            ("min_frequency", &self.min_frequency),
            ("max_categories", &self.max_categories),
        ] {
            if let Some(value) = option {
                return Err(format!(
                    "encoder was fitted with {}={}, infrequent-category grouping is not supported",
                    name, value
                ));
            }
        }

        let grouped = match &self.infrequent_categories {
            Some(Value::Array(per_column)) => per_column.iter().any(|c| !c.is_null()),
            Some(other) => !other.is_null(),
            None => false,
        };
        if grouped {
            return Err(
                "encoder has infrequent categories, infrequent-category grouping is not supported"
                    .to_string(),
            );
        }
        Ok(())
    }
}

/// One-hot encoder with sklearn's `{column}_{category}` output naming.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "OneHotEncoderSpec")]
pub struct OneHotEncoder {
    feature_names: Vec<String>,
    categories: Vec<Vec<String>>,
    handle_unknown: HandleUnknown,
    drop_idx: Vec<Option<usize>>,
    output_names: Vec<String>,
}

impl OneHotEncoder {
    pub fn new(
        feature_names: Vec<String>,
        categories: Vec<Vec<String>>,
        handle_unknown: HandleUnknown,
        drop_idx: Option<Vec<Option<usize>>>,
    ) -> Result<Self, String> {
        if categories.len() != feature_names.len() {
            return Err(format!(
                "encoder has {} columns but {} category lists",
                feature_names.len(),
                categories.len()
            ));
        }
        if let Some(i) = categories.iter().position(Vec::is_empty) {
            return Err(format!("column '{}' has no categories", feature_names[i]));
        }

        let drop_idx = drop_idx.unwrap_or_else(|| vec![None; feature_names.len()]);
        if drop_idx.len() != feature_names.len() {
            return Err(format!(
                "encoder has {} columns but {} drop indices",
                feature_names.len(),
                drop_idx.len()
            ));
        }
        for (i, dropped) in drop_idx.iter().enumerate() {
            if let Some(d) = dropped.filter(|d| *d >= categories[i].len()) {
                return Err(format!(
                    "drop index {} out of range for column '{}'",
                    d, feature_names[i]
                ));
            }
        }

        let output_names: Vec<String> = feature_names
            .iter()
            .zip(&categories)
            .zip(&drop_idx)
            .flat_map(|((column, cats), dropped)| {
                cats.iter()
                    .enumerate()
                    .filter(move |(j, _)| Some(*j) != *dropped)
                    .map(move |(_, cat)| format!("{}_{}", column, cat))
            })
            .collect();

        Ok(Self {
            feature_names,
            categories,
            handle_unknown,
            drop_idx,
            output_names,
        })
    }
}

impl TryFrom<OneHotEncoderSpec> for OneHotEncoder {
    type Error = String;

    fn try_from(spec: OneHotEncoderSpec) -> Result<Self, Self::Error> {
        spec.reject_infrequent_grouping()?;
        let handle_unknown = spec.handle_unknown.parse()?;
        Self::new(
            spec.feature_names_in,
            spec.categories,
            handle_unknown,
            spec.drop_idx,
        )
    }
}

impl CategoricalEncoder for OneHotEncoder {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn output_names(&self) -> &[String] {
        &self.output_names
    }

    fn transform(&self, record: &HashMap<String, String>) -> Result<Vec<f64>, PricingError> {
        let mut encoded = Vec::with_capacity(self.output_names.len());

        for (i, column) in self.feature_names.iter().enumerate() {
            let value = record.get(column).ok_or_else(|| {
                PricingError::transform(format!("missing categorical column '{}'", column))
            })?;
            let hit = self.categories[i].iter().position(|c| c == value);
            if hit.is_none() && self.handle_unknown == HandleUnknown::Error {
                return Err(PricingError::transform(format!(
                    "Found unknown category '{}' in column '{}'",
                    value, column
                )));
            }

            let dropped = self.drop_idx[i];
            encoded.extend(
                (0..self.categories[i].len())
                    .filter(|j| Some(*j) != dropped)
                    .map(|j| if Some(j) == hit { 1.0 } else { 0.0 }),
            );
        }

        Ok(encoded)
    }
}
