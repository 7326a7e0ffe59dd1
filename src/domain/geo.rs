use crate::domain::ride::RideRequest;

/// Mean Earth radius used by the haversine formula (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Conversion factor; the models were trained on `trip_distance` in miles.
pub const KM_TO_MILES: f64 = 0.621371;

/// Trip distance in both units the feature columns may ask for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripDistance {
    pub km: f64,
    pub miles: f64,
}

impl TripDistance {
    pub fn from_km(km: f64) -> Self {
        Self {
            km,
            miles: km * KM_TO_MILES,
        }
    }
}

/// Great-circle distance between two points, in kilometers.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lng2 - lng1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points
    let a = a.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Trusts a positive supplied distance, otherwise falls back to haversine.
pub fn resolve_distance(request: &RideRequest) -> TripDistance {
    let km = if request.distance_km > 0.0 {
        request.distance_km
    } else {
        haversine_km(
            request.pickup_lat,
            request.pickup_lng,
            request.drop_lat,
            request.drop_lng,
        )
    };
    TripDistance::from_km(km)
}
