use std::collections::HashMap;
use std::sync::Arc;

/// Raw, per-request feature values keyed by the column names the
/// preprocessors declared. Numeric and categorical partitions never mix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRecord {
    pub numeric: HashMap<String, f64>,
    pub categorical: HashMap<String, String>,
}

/// Final model input.
///
/// `columns` is the training-time layout (`numeric ++ encoded categorical`),
/// shared by every vector produced by the same preprocessing stage.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    columns: Arc<[String]>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Returns `None` when the values do not line up with the layout.
    pub fn new(columns: Arc<[String]>, values: Vec<f64>) -> Option<Self> {
        if columns.len() != values.len() {
            return None;
        }
        Some(Self { columns, values })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.values[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_rejects_misaligned_values() {
        let columns: Arc<[String]> = vec!["a".to_string(), "b".to_string()].into();
        assert!(FeatureVector::new(columns.clone(), vec![1.0]).is_none());

        let v = FeatureVector::new(columns, vec![1.0, 2.0]).unwrap();
        assert_eq!(v.get("b"), Some(2.0));
        assert_eq!(v.get("c"), None);
    }
}
