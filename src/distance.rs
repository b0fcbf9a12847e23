//! Great-circle distance between two coordinates using the Haversine formula.

use crate::error::RowError;

/// Equatorial Earth radius in meters (WGS 84).
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// A latitude/longitude pair in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadianPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Builds a point, rejecting non-finite or out-of-range degrees.
    pub fn new(lat: f64, lng: f64) -> Result<Self, RowError> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);

        if valid {
            Ok(Self { lat, lng })
        } else {
            Err(RowError::CoordinateOutOfRange { lat, lng })
        }
    }

    pub fn to_radians(self) -> RadianPoint {
        RadianPoint {
            lat: self.lat.to_radians(),
            lng: self.lng.to_radians(),
        }
    }
}

/// Distance in meters between two points given in degrees.
pub fn haversine_m(from: GeoPoint, to: GeoPoint) -> f64 {
    great_circle_m(from.to_radians(), to.to_radians())
}

/// Distance in meters between two points already converted to radians.
///
/// `a` is clamped to `[0, 1]` so rounding never feeds `sqrt`/`asin` a value
/// outside their domain.
pub fn great_circle_m(from: RadianPoint, to: RadianPoint) -> f64 {
    let d_lat = (from.lat - to.lat).abs();
    let d_lng = (from.lng - to.lng).abs();

    let a = ((1.0 - d_lat.cos()) + from.lat.cos() * to.lat.cos() * (1.0 - d_lng.cos())) / 2.0;

    2.0 * EARTH_RADIUS_M * a.clamp(0.0, 1.0).sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn point(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    #[test]
    fn test_identical_points_are_zero() {
        let p = point(38.0, -77.0);
        assert_eq!(haversine_m(p, p), 0.0);
    }

    #[test]
    fn test_one_degree_latitude_at_equator() {
        let d = haversine_m(point(0.0, 0.0), point(1.0, 0.0));
        // 2 * pi * 6378137 / 360
        assert!((d - 111_319.49).abs() < 1.0, "got {d}");
    }

    #[test]
    fn test_antipodal_points_clamp() {
        let d = haversine_m(point(0.0, 0.0), point(0.0, 180.0));
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_M;
        assert!((d - half_circumference).abs() < 1e-6);
    }

    #[test]
    fn test_known_city_distance() {
        // Two points on the National Mall, roughly 3.9 km apart.
        let d = haversine_m(point(38.8977, -77.0065), point(38.8893, -77.0502));
        assert!(d > 3_800.0 && d < 4_000.0, "got {d}");
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(GeoPoint::new(91.0, 0.0).is_err());
        assert!(GeoPoint::new(0.0, -181.0).is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(-90.0, 180.0).is_ok());
    }

    proptest! {
        #[test]
        fn prop_identity(lat in -90.0f64..=90.0, lng in -180.0f64..=180.0) {
            let p = point(lat, lng);
            prop_assert_eq!(haversine_m(p, p), 0.0);
        }

        #[test]
        fn prop_symmetric(
            lat1 in -90.0f64..=90.0, lng1 in -180.0f64..=180.0,
            lat2 in -90.0f64..=90.0, lng2 in -180.0f64..=180.0,
        ) {
            let a = point(lat1, lng1);
            let b = point(lat2, lng2);
            prop_assert_eq!(haversine_m(a, b), haversine_m(b, a));
        }

        #[test]
        fn prop_non_negative_and_bounded(
            lat1 in -90.0f64..=90.0, lng1 in -180.0f64..=180.0,
            lat2 in -90.0f64..=90.0, lng2 in -180.0f64..=180.0,
        ) {
            let d = haversine_m(point(lat1, lng1), point(lat2, lng2));
            prop_assert!(d >= 0.0);
            prop_assert!(d <= std::f64::consts::PI * EARTH_RADIUS_M + 1e-6);
        }
    }
}
