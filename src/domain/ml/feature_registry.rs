use crate::domain::geo::TripDistance;
use crate::domain::ml::features::FeatureRecord;
use crate::domain::ride::RideRequest;

/// Category used for any categorical column the request cannot supply.
pub const FALLBACK_CATEGORY: &str = "Unknown";

/// Where a numeric column's value comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericSource {
    DistanceMiles,
    DistanceKm,
    DistanceMilesSquared,
    Hour,
    DayOfWeek,
    TrafficLevel,
    /// Column the request cannot supply; filled with the scaler's training mean.
    TrainingMean(f64),
}

/// Where a categorical column's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoricalSource {
    Weather,
    CarType,
    Fallback,
}

/// One row of a resolution table: a column-name predicate and the source it maps to.
struct ColumnRule<S: 'static> {
    names: &'static [&'static str],
    source: S,
}

impl<S: Copy> ColumnRule<S> {
    fn resolve(&self, column: &str) -> Option<S> {
        self.names.contains(&column).then_some(self.source)
    }
}

/// Evaluated top to bottom, first match wins.
/// `trip_distance` is in miles because that is what the models were trained on.
const NUMERIC_RULES: &[ColumnRule<NumericSource>] = &[
    ColumnRule {
        names: &["trip_distance"],
        source: NumericSource::DistanceMiles,
    },
    ColumnRule {
        names: &["distance_km"],
        source: NumericSource::DistanceKm,
    },
    ColumnRule {
        names: &["distance_squared", "trip_distance_squared"],
        source: NumericSource::DistanceMilesSquared,
    },
    ColumnRule {
        names: &["hour"],
        source: NumericSource::Hour,
    },
    ColumnRule {
        names: &["day_of_week"],
        source: NumericSource::DayOfWeek,
    },
    ColumnRule {
        names: &["traffic_multiplier", "traffic_level", "traffic_congestion"],
        source: NumericSource::TrafficLevel,
    },
];

const CATEGORICAL_RULES: &[ColumnRule<CategoricalSource>] = &[
    ColumnRule {
        names: &["weather_condition", "weather"],
        source: CategoricalSource::Weather,
    },
    ColumnRule {
        names: &["car_type"],
        source: CategoricalSource::CarType,
    },
];

/// Resolves a declared numeric column; falls back to `training_mean`.
pub fn resolve_numeric(column: &str, training_mean: f64) -> NumericSource {
    NUMERIC_RULES
        .iter()
        .find_map(|rule| rule.resolve(column))
        .unwrap_or(NumericSource::TrainingMean(training_mean))
}

pub fn resolve_categorical(column: &str) -> CategoricalSource {
    CATEGORICAL_RULES
        .iter()
        .find_map(|rule| rule.resolve(column))
        .unwrap_or(CategoricalSource::Fallback)
}

/// Maps ride requests onto the columns the fitted preprocessors declared.
///
/// The column plan is compiled once from the loaded artifacts, so the same
/// assembler serves preprocessors trained on a superset (or a different set)
/// of columns than a request naturally carries. Unmapped columns never fail:
/// numeric ones get the training mean and categorical ones get
/// [`FALLBACK_CATEGORY`]. That keeps the vector shape valid but can also hide
/// schema drift between training and serving, which is why
/// [`FeatureAssembler::fallback_columns`] exists.
#[derive(Debug, Clone)]
pub struct FeatureAssembler {
    numeric_plan: Vec<(String, NumericSource)>,
    categorical_plan: Vec<(String, CategoricalSource)>,
}

impl FeatureAssembler {
    /// `numeric_columns` pairs each declared numeric column with its training mean.
    pub fn new(numeric_columns: Vec<(String, f64)>, categorical_columns: Vec<String>) -> Self {
        let numeric_plan = numeric_columns
            .into_iter()
            .map(|(column, mean)| {
                let source = resolve_numeric(&column, mean);
                (column, source)
            })
            .collect();
        let categorical_plan = categorical_columns
            .into_iter()
            .map(|column| {
                let source = resolve_categorical(&column);
                (column, source)
            })
            .collect();

        Self {
            numeric_plan,
            categorical_plan,
        }
    }

    pub fn assemble(&self, request: &RideRequest, distance: &TripDistance) -> FeatureRecord {
        let numeric = self
            .numeric_plan
            .iter()
            .map(|(column, source)| {
                let value = match *source {
                    NumericSource::DistanceMiles => distance.miles,
                    NumericSource::DistanceKm => distance.km,
                    NumericSource::DistanceMilesSquared => distance.miles.powi(2),
                    NumericSource::Hour => f64::from(request.hour),
                    NumericSource::DayOfWeek => f64::from(request.day_of_week),
                    NumericSource::TrafficLevel => request.traffic_level,
                    NumericSource::TrainingMean(mean) => mean,
                };
                (column.clone(), value)
            })
            .collect();

        let categorical = self
            .categorical_plan
            .iter()
            .map(|(column, source)| {
                let value = match source {
                    CategoricalSource::Weather => request.weather.clone(),
                    CategoricalSource::CarType => request.car_type.clone(),
                    CategoricalSource::Fallback => FALLBACK_CATEGORY.to_string(),
                };
                (column.clone(), value)
            })
            .collect();

        FeatureRecord {
            numeric,
            categorical,
        }
    }

    /// Declared columns that the request cannot supply.
    pub fn fallback_columns(&self) -> Vec<&str> {
        let numeric = self
            .numeric_plan
            .iter()
            .filter(|(_, s)| matches!(s, NumericSource::TrainingMean(_)))
            .map(|(c, _)| c.as_str());
        let categorical = self
            .categorical_plan
            .iter()
            .filter(|(_, s)| *s == CategoricalSource::Fallback)
            .map(|(c, _)| c.as_str());
        numeric.chain(categorical).collect()
    }
}
