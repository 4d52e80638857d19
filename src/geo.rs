use crate::config::EARTH_RADIUS_MILES;
use std::fmt;

/// A zip centroid in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        distance_miles(*self, *other)
    }
}

/// `lat,lon` using the shortest round-trip float representation.
impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

#[inline]
fn haversin(theta: f64) -> f64 {
    (theta / 2.0).sin().powi(2)
}

/// Great-circle distance in statute miles (haversine).
pub fn distance_miles(a: Coordinates, b: Coordinates) -> f64 {
    let (phi1, phi2) = (a.lat.to_radians(), b.lat.to_radians());
    let d_lambda = (b.lon - a.lon).to_radians();
    let h = haversin(phi2 - phi1) + phi1.cos() * phi2.cos() * haversin(d_lambda);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORONA: Coordinates = Coordinates {
        lat: 33.8898,
        lon: -117.5458,
    };
    const LOS_ANGELES: Coordinates = Coordinates {
        lat: 34.0522,
        lon: -118.2437,
    };

    #[test]
    fn same_point_is_zero() {
        assert!(distance_miles(CORONA, CORONA).abs() < 1e-9);
    }

    #[test]
    fn symmetric() {
        let ab = distance_miles(CORONA, LOS_ANGELES);
        let ba = distance_miles(LOS_ANGELES, CORONA);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn known_distance() {
        // ~41.6 miles between Corona and downtown Los Angeles
        let d = CORONA.distance_to(&LOS_ANGELES);
        assert!((d - 41.6).abs() < 0.5, "got {d}");
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = distance_miles(Coordinates::new(0.0, 0.0), Coordinates::new(1.0, 0.0));
        let expected = EARTH_RADIUS_MILES * std::f64::consts::PI / 180.0;
        assert!((d - expected).abs() < 1e-6);
    }

    #[test]
    fn display_matches_output_format() {
        assert_eq!(CORONA.to_string(), "33.8898,-117.5458");
        assert_eq!(Coordinates::new(34.0, -118.5).to_string(), "34,-118.5");
    }
}
