//! Marshalling layer over the geodesic solvers.
//!
//! Owns the shape of a solve: the general direct and inverse paths, the
//! default-applying convenience wrappers, and the solution records the
//! boundary re-encodes for the managed side. Scalar fields follow Karney's
//! naming, since these records exist to mirror the managed result
//! constructors field for field.

use std::f64::consts::PI;

use geographiclib_rs::Geodesic;

use crate::mask::OutputMask;

/// Outputs of a direct-problem solve.
///
/// Point 1 is the start point, point 2 the computed endpoint. Outputs not
/// selected by the mask are NaN.
#[allow(non_snake_case)]
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct DirectSolution {
    /// Mask the solve was run with.
    pub mask: OutputMask,
    /// Latitude of point 2 (degrees).
    pub lat2: f64,
    /// Longitude of point 2 (degrees).
    pub lon2: f64,
    /// Azimuth at point 2 (degrees).
    pub azi2: f64,
    /// Reduced length of the geodesic (meters).
    pub m12: f64,
    /// Geodesic scale of point 2 relative to point 1.
    pub M12: f64,
    /// Geodesic scale of point 1 relative to point 2.
    pub M21: f64,
    /// Area between the geodesic and the equator (square meters).
    pub S12: f64,
    /// Arc length between the points (degrees). Always computed.
    pub a12: f64,
    /// Distance between the points (meters).
    pub s12: f64,
}

impl DirectSolution {
    /// Whether `output` was selected when this solution was computed.
    pub fn has(&self, output: OutputMask) -> bool {
        self.mask.contains(output)
    }
}

/// Outputs of an inverse-problem solve.
#[allow(non_snake_case)]
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct InverseSolution {
    /// Mask the solve was run with.
    pub mask: OutputMask,
    /// Distance between the points (meters).
    pub s12: f64,
    /// Azimuth at point 1 (degrees).
    pub azi1: f64,
    /// Azimuth at point 2 (degrees).
    pub azi2: f64,
    /// Reduced length of the geodesic (meters).
    pub m12: f64,
    /// Geodesic scale of point 2 relative to point 1.
    pub M12: f64,
    /// Geodesic scale of point 1 relative to point 2.
    pub M21: f64,
    /// Area between the geodesic and the equator (square meters).
    pub S12: f64,
    /// Arc length between the points (degrees). Always computed.
    pub a12: f64,
}

impl InverseSolution {
    /// Whether `output` was selected when this solution was computed.
    pub fn has(&self, output: OutputMask) -> bool {
        self.mask.contains(output)
    }
}

/// Solve the general direct problem.
///
/// Interprets `s12_a12` as a distance in meters when `arcmode` is false, or
/// as an arc length in degrees when true. The caller's mask is threaded
/// unchanged into the solution.
pub fn gen_direct(
    engine: &Geodesic,
    lat1: f64,
    lon1: f64,
    azi1: f64,
    arcmode: bool,
    s12_a12: f64,
    mask: OutputMask,
) -> DirectSolution {
    #[allow(non_snake_case)]
    let (a12, lat2, lon2, azi2, s12, m12, M12, M21, S12) =
        engine._gen_direct(lat1, lon1, azi1, arcmode, s12_a12, mask.bits());
    DirectSolution {
        mask,
        lat2,
        lon2,
        azi2,
        m12,
        M12,
        M21,
        S12,
        a12,
        s12,
    }
}

/// Solve the direct problem for a distance, computing every output.
pub fn direct(engine: &Geodesic, lat1: f64, lon1: f64, azi1: f64, s12: f64) -> DirectSolution {
    gen_direct(engine, lat1, lon1, azi1, false, s12, OutputMask::ALL)
}

/// Solve the direct problem for an arc length, computing every output.
pub fn arc_direct(engine: &Geodesic, lat1: f64, lon1: f64, azi1: f64, a12: f64) -> DirectSolution {
    gen_direct(engine, lat1, lon1, azi1, true, a12, OutputMask::ALL)
}

/// Solve the general inverse problem.
pub fn gen_inverse(
    engine: &Geodesic,
    lat1: f64,
    lon1: f64,
    lat2: f64,
    lon2: f64,
    mask: OutputMask,
) -> InverseSolution {
    #[allow(non_snake_case)]
    let (a12, s12, azi1, azi2, m12, M12, M21, S12) =
        engine._gen_inverse_azi(lat1, lon1, lat2, lon2, mask.bits());
    InverseSolution {
        mask,
        s12,
        azi1,
        azi2,
        m12,
        M12,
        M21,
        S12,
        a12,
    }
}

/// Solve the inverse problem, computing every output.
pub fn inverse(engine: &Geodesic, lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> InverseSolution {
    gen_inverse(engine, lat1, lon1, lat2, lon2, OutputMask::ALL)
}

/// Equatorial radius the engine was constructed with (meters).
pub fn equatorial_radius(engine: &Geodesic) -> f64 {
    engine.a
}

/// Flattening the engine was constructed with.
pub fn flattening(engine: &Geodesic) -> f64 {
    engine.f
}

/// Total surface area of the engine's ellipsoid (square meters).
///
/// 4π·c² with c the authalic radius, matching the wrapped library's
/// `EllipsoidArea()`.
pub fn ellipsoid_area(engine: &Geodesic) -> f64 {
    4.0 * PI * engine._c2
}

/// Parameters (equatorial radius in meters, flattening) of the reference
/// WGS84 ellipsoid, as published by the engine library.
pub fn wgs84_parameters() -> (f64, f64) {
    let engine = Geodesic::wgs84();
    (engine.a, engine.f)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use geographiclib_rs::Geodesic;

    use super::*;

    fn wgs84() -> Geodesic {
        Geodesic::new(6378137.0, 1.0 / 298.257223563)
    }

    #[test]
    fn accessors_pass_parameters_through() {
        let engine = Geodesic::new(6378160.0, 1.0 / 298.25);
        assert_eq!(equatorial_radius(&engine), 6378160.0);
        assert_eq!(flattening(&engine), 1.0 / 298.25);
    }

    #[test]
    fn wgs84_parameters_match_published_values() {
        let (a, f) = wgs84_parameters();
        assert_eq!(a, 6378137.0);
        assert_relative_eq!(f, 1.0 / 298.257223563, max_relative = 1e-15);
    }

    #[test]
    fn ellipsoid_area_matches_wgs84_reference() {
        // Authalic surface area of WGS84, 5.10065622e14 m^2.
        assert_relative_eq!(
            ellipsoid_area(&wgs84()),
            5.10065622e14,
            max_relative = 1e-6
        );
    }

    #[test]
    fn sphere_area_is_4_pi_r_squared() {
        let sphere = Geodesic::new(6371000.0, 0.0);
        assert_relative_eq!(
            ellipsoid_area(&sphere),
            4.0 * PI * 6371000.0 * 6371000.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn direct_matches_gen_direct_with_defaults() {
        let engine = wgs84();
        let a = direct(&engine, 40.6, -73.8, 45.0, 10_000e3);
        let b = gen_direct(&engine, 40.6, -73.8, 45.0, false, 10_000e3, OutputMask::ALL);
        assert_eq!(a, b);
    }

    #[test]
    fn arc_direct_matches_gen_direct_in_arc_mode() {
        let engine = wgs84();
        let a = arc_direct(&engine, 40.6, -73.8, 45.0, 90.0);
        let b = gen_direct(&engine, 40.6, -73.8, 45.0, true, 90.0, OutputMask::ALL);
        assert_eq!(a, b);
    }

    #[test]
    fn inverse_matches_gen_inverse_with_all_outputs() {
        let engine = wgs84();
        let a = inverse(&engine, -41.32, 174.81, 40.96, -5.50);
        let b = gen_inverse(&engine, -41.32, 174.81, 40.96, -5.50, OutputMask::ALL);
        assert_eq!(a, b);
    }

    #[test]
    fn direct_then_inverse_round_trips() {
        let engine = wgs84();
        let dir = direct(&engine, 40.0, -74.0, 51.0, 5_000_000.0);
        let inv = inverse(&engine, 40.0, -74.0, dir.lat2, dir.lon2);
        assert_relative_eq!(inv.s12, 5_000_000.0, epsilon = 1e-3);
        assert_relative_eq!(inv.a12, dir.a12, epsilon = 1e-9);
        assert_relative_eq!(inv.azi2, dir.azi2, epsilon = 1e-6);
    }

    #[test]
    fn wellington_to_salamanca_matches_published_solution() {
        // The wrapped library's canonical inverse-problem example.
        let inv = inverse(&wgs84(), -41.32, 174.81, 40.96, -5.50);
        assert_relative_eq!(inv.s12, 19_959_679.267, epsilon = 0.5);
        assert_relative_eq!(inv.azi1, 161.067669986, epsilon = 1e-5);
        assert_relative_eq!(inv.azi2, 18.825195123, epsilon = 1e-5);
    }

    #[test]
    fn new_york_to_london_is_in_the_expected_range() {
        let inv = inverse(&wgs84(), 40.0, -74.0, 51.5, -0.13);
        // Rounded city coordinates, so assert the ballpark rather than a
        // reference value: a bit over 5600 km, initial azimuth roughly
        // north-east.
        assert_relative_eq!(inv.s12, 5.6e6, max_relative = 0.02);
        assert_relative_eq!(inv.azi1, 51.0, epsilon = 2.0);
    }

    #[test]
    fn equator_short_arc_matches_reference_distance() {
        let inv = inverse(&wgs84(), 0.0, 0.0, 5.0, 5.0);
        assert_relative_eq!(inv.s12, 784_029.0, epsilon = 1.0);
    }

    #[test]
    fn masked_inverse_leaves_deselected_outputs_nan() {
        let engine = wgs84();
        let inv = gen_inverse(&engine, 40.0, -74.0, 51.5, -0.13, OutputMask::DISTANCE);
        assert!(inv.s12.is_finite());
        assert!(inv.a12.is_finite());
        assert!(inv.azi1.is_nan());
        assert!(inv.m12.is_nan());
        assert!(inv.S12.is_nan());
        assert!(inv.has(OutputMask::DISTANCE));
        assert!(!inv.has(OutputMask::AZIMUTH));
    }

    #[test]
    fn masked_direct_leaves_deselected_outputs_nan() {
        let engine = wgs84();
        let mask = OutputMask::LATITUDE | OutputMask::LONGITUDE;
        let dir = gen_direct(&engine, 40.0, -74.0, 51.0, false, 1_000_000.0, mask);
        assert!(dir.lat2.is_finite());
        assert!(dir.lon2.is_finite());
        assert!(dir.azi2.is_nan());
        assert!(dir.m12.is_nan());
        assert!(dir.has(OutputMask::LATITUDE));
        assert!(!dir.has(OutputMask::GEODESIC_SCALE));
    }

    #[test]
    fn mask_is_threaded_into_the_solution() {
        let engine = wgs84();
        let mask = OutputMask::DISTANCE | OutputMask::AREA;
        let inv = gen_inverse(&engine, 10.0, 20.0, 30.0, 40.0, mask);
        assert_eq!(inv.mask, mask);
        let dir = gen_direct(&engine, 10.0, 20.0, 30.0, false, 1.0e6, mask);
        assert_eq!(dir.mask, mask);
    }
}
