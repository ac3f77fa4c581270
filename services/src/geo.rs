//! Great-circle distance between two WGS84 points.

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in meters between two (lat, lon) points given in
/// degrees. Pure and symmetric; identical points yield 0. Inputs are
/// not range-checked: clients without GPS permission report 0/0 and the
/// result is still well defined.
pub fn haversine_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Rounds to one decimal place, the precision reported for check-in
/// distances.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
