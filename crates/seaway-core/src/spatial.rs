//! Spatial math for edge weights and current alignment.

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Meters per second to knots.
pub const MPS_TO_KNOTS: f64 = 1.943_844_492;

/// Calculate great-circle distance in kilometers using the Haversine formula.
///
/// Uses the `atan2` form, which stays well conditioned for coincident and
/// antipodal points. NaN inputs propagate to the result.
///
/// # Arguments
/// * `lon1`, `lat1` - First point coordinates in decimal degrees
/// * `lon2`, `lat2` - Second point coordinates in decimal degrees
pub fn haversine_km(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    // Rounding can push `a` a hair outside [0, 1] near antipodes.
    let a = a.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Initial bearing from point 1 to point 2 in radians.
/// 0 = north, π/2 = east.
pub fn initial_bearing(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    x.atan2(y)
}

/// Project an eastward/northward vector onto a bearing.
///
/// Positive when the vector points along the bearing, negative when it opposes it.
pub fn along_bearing(east: f64, north: f64, bearing_rad: f64) -> f64 {
    east * bearing_rad.sin() + north * bearing_rad.cos()
}

/// Squared planar distance in degree space, used for nearest-sample lookup.
pub(crate) fn planar_distance_sq(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let dx = lon2 - lon1;
    let dy = lat2 - lat1;
    dx * dx + dy * dy
}
