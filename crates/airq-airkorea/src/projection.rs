//! WGS84 latitude/longitude to the TM grid used by the station directory.
//!
//! Transverse Mercator forward projection (Snyder, "Map Projections: A
//! Working Manual", eq. 8-9 to 8-13). The default parameters are the Korean
//! central-belt grid on GRS80: origin 38°N 127°E, scale 1.0, false easting
//! 200 000 m, false northing 500 000 m.

use serde::{Deserialize, Serialize};

use crate::types::Coordinate;

/// Projected coordinate in metres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TmCoordinate {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TmProjection {
    semi_major: f64,
    flattening: f64,
    origin_latitude: f64,
    central_meridian: f64,
    scale: f64,
    false_easting: f64,
    false_northing: f64,
}

impl Default for TmProjection {
    fn default() -> Self {
        Self {
            semi_major: 6_378_137.0,
            flattening: 1.0 / 298.257_222_101,
            origin_latitude: 38.0,
            central_meridian: 127.0,
            scale: 1.0,
            false_easting: 200_000.0,
            false_northing: 500_000.0,
        }
    }
}

impl TmProjection {
    fn eccentricity_squared(&self) -> f64 {
        2.0 * self.flattening - self.flattening * self.flattening
    }

    /// Meridian arc length from the equator to `phi` (radians)
    fn meridian_arc(&self, phi: f64) -> f64 {
        let e2 = self.eccentricity_squared();
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        self.semi_major
            * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
    }

    pub fn project(&self, coord: Coordinate) -> TmCoordinate {
        let e2 = self.eccentricity_squared();
        let ep2 = e2 / (1.0 - e2);

        let phi = coord.latitude.to_radians();
        let lambda = coord.longitude.to_radians();
        let lambda0 = self.central_meridian.to_radians();

        let (sin_phi, cos_phi) = phi.sin_cos();
        let n = self.semi_major / (1.0 - e2 * sin_phi * sin_phi).sqrt();
        let t = phi.tan().powi(2);
        let c = ep2 * cos_phi * cos_phi;
        let a = (lambda - lambda0) * cos_phi;

        let m = self.meridian_arc(phi);
        let m0 = self.meridian_arc(self.origin_latitude.to_radians());

        let x = self.scale
            * n
            * (a + (1.0 - t + c) * a.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0);

        let y = self.scale
            * (m - m0
                + n * phi.tan()
                    * (a * a / 2.0
                        + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                        + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6)
                            / 720.0));

        TmCoordinate {
            x: self.false_easting + x,
            y: self.false_northing + y,
        }
    }
}
