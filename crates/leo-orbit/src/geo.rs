//! Geometry helpers: geodetic ↔ ECEF conversion and topocentric look angles.
//!
//! Earth's rotation is ignored when converting the satellite's ECI state to
//! the ground station's local frame — the same simplification the corpus's
//! own `eci_to_geodetic`/`calculate_look_angles` pair documents ("ignoring
//! Earth rotation for now"). At a single instant this treats ECI and ECEF as
//! coincident, which is adequate for a visibility/elevation simulation and
//! keeps the orbit model free of a full sidereal-time rotation.

const EARTH_RADIUS_KM: f64 = 6378.137;
const EARTH_FLATTENING: f64 = 1.0 / 298.257223563;

/// A 3-vector in km (position) or km/s (velocity).
pub type Vec3 = [f64; 3];

/// Convert geodetic coordinates to an ECEF-like Cartesian position in km.
pub fn geodetic_to_ecef(lat_deg: f64, lon_deg: f64, alt_m: f64) -> Vec3 {
    let lat_rad = lat_deg.to_radians();
    let lon_rad = lon_deg.to_radians();
    let alt_km = alt_m / 1000.0;

    let n = EARTH_RADIUS_KM / (1.0 - EARTH_FLATTENING * lat_rad.sin().powi(2)).sqrt();

    let x = (n + alt_km) * lat_rad.cos() * lon_rad.cos();
    let y = (n + alt_km) * lat_rad.cos() * lon_rad.sin();
    let z = (n * (1.0 - EARTH_FLATTENING) + alt_km) * lat_rad.sin();

    [x, y, z]
}

pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn norm(a: Vec3) -> f64 {
    dot(a, a).sqrt()
}

/// Elevation angle (degrees) of `sat_pos` above the horizon at `gs_lat/lon`,
/// given the relative position vector `rel = sat_pos - gs_pos`.
pub fn elevation_deg(gs_lat_deg: f64, gs_lon_deg: f64, rel: Vec3) -> f64 {
    let lat_rad = gs_lat_deg.to_radians();
    let lon_rad = gs_lon_deg.to_radians();

    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let east = -sin_lon * rel[0] + cos_lon * rel[1];
    let north = -sin_lat * cos_lon * rel[0] - sin_lat * sin_lon * rel[1] + cos_lat * rel[2];
    let up = cos_lat * cos_lon * rel[0] + cos_lat * sin_lon * rel[1] + sin_lat * rel[2];

    let horiz_range = (east * east + north * north).sqrt();
    up.atan2(horiz_range).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn zenith_satellite_has_90_degree_elevation() {
        let gs = geodetic_to_ecef(10.0, 20.0, 0.0);
        let direction = {
            let n = norm(gs);
            [gs[0] / n, gs[1] / n, gs[2] / n]
        };
        let sat = [
            gs[0] + direction[0] * 500.0,
            gs[1] + direction[1] * 500.0,
            gs[2] + direction[2] * 500.0,
        ];
        let rel = sub(sat, gs);
        let elev = elevation_deg(10.0, 20.0, rel);
        assert_abs_diff_eq!(elev, 90.0, epsilon = 1e-6);
    }

    #[test]
    fn satellite_below_horizon_has_negative_elevation() {
        let gs = geodetic_to_ecef(0.0, 0.0, 0.0);
        // A point on the opposite side of the Earth, same altitude shell.
        let sat = geodetic_to_ecef(0.0, 179.0, 500_000.0);
        let rel = sub(sat, gs);
        let elev = elevation_deg(0.0, 0.0, rel);
        assert!(elev < 0.0);
    }
}
