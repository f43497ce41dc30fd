//! Lambert Conformal Conic projection.
//!
//! This projection is commonly used for mid-latitude regional hazard grids
//! (HRRR, national hazard maps). It maps a cone tangent or secant to the
//! Earth's surface onto a flat plane.
//!
//! The projection parameters include:
//! - Latitude of origin (lat0): where the projected y is `false_northing`
//! - Central meridian (lon0)
//! - Standard parallel(s): latin1 and latin2 (equal for a tangent cone)
//! - False easting / northing in meters
//!
//! The Earth is modelled as a sphere.

use std::f64::consts::PI;

use hazard_common::ProjectionParams;

use crate::error::{ProjectionError, Result};

/// Mean Earth radius used by NCEP grids (meters).
pub const EARTH_RADIUS: f64 = 6371229.0;

/// Lambert Conformal Conic projection parameters.
///
/// These parameters define the projection from geographic (lon/lat) to
/// projected (x, y) meters and vice versa.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambertConformal {
    /// Central meridian in radians
    pub lon0: f64,
    /// Latitude of origin in radians
    pub lat0: f64,
    pub false_easting: f64,
    pub false_northing: f64,
    /// Sphere radius (meters)
    pub earth_radius: f64,
    /// Cone constant (n)
    n: f64,
    /// F constant
    f: f64,
    /// Rho at the latitude of origin
    rho0: f64,
}

impl LambertConformal {
    /// Create a new Lambert Conformal projection, angles in degrees.
    pub fn new(
        lat0_deg: f64,
        lon0_deg: f64,
        latin1_deg: f64,
        latin2_deg: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Result<Self> {
        let to_rad = PI / 180.0;

        let lat0 = lat0_deg * to_rad;
        let lon0 = lon0_deg * to_rad;
        let latin1 = latin1_deg * to_rad;
        let latin2 = latin2_deg * to_rad;

        let earth_radius = EARTH_RADIUS;

        // Compute cone constant n
        let n = if (latin1 - latin2).abs() < 1e-10 {
            // Tangent cone (single standard parallel)
            latin1.sin()
        } else {
            // Secant cone (two standard parallels)
            let ln_ratio = (latin1.cos() / latin2.cos()).ln();
            let tan_ratio = ((PI / 4.0 + latin2 / 2.0).tan() / (PI / 4.0 + latin1 / 2.0).tan()).ln();
            ln_ratio / tan_ratio
        };

        if n.abs() < 1e-10 || !n.is_finite() {
            return Err(ProjectionError::unavailable(
                "geographic",
                "lambert conformal",
                format!(
                    "standard parallels {} / {} do not define a cone",
                    latin1_deg, latin2_deg
                ),
            ));
        }

        let f = (latin1.cos() * (PI / 4.0 + latin1 / 2.0).tan().powf(n)) / n;
        let rho0 = earth_radius * f / (PI / 4.0 + lat0 / 2.0).tan().powf(n);

        Ok(Self {
            lon0,
            lat0,
            false_easting,
            false_northing,
            earth_radius,
            n,
            f,
            rho0,
        })
    }

    /// Build from the CRS projection parameters.
    pub fn from_params(params: &ProjectionParams) -> Result<Self> {
        match *params {
            ProjectionParams::LambertConformal {
                lat0,
                lon0,
                latin1,
                latin2,
                false_easting,
                false_northing,
            } => Self::new(lat0, lon0, latin1, latin2, false_easting, false_northing),
            other => Err(ProjectionError::unavailable(
                format!("{:?}", other),
                "lambert conformal",
                "not a Lambert Conformal parameter set",
            )),
        }
    }

    /// Convert geographic coordinates (lon/lat in degrees) to projected meters.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> Result<(f64, f64)> {
        if !lon_deg.is_finite() || !lat_deg.is_finite() {
            return Err(ProjectionError::transform_failed(format!(
                "({}, {}) is not a finite position",
                lon_deg, lat_deg
            )));
        }
        let lat = lat_deg.to_radians();
        let lon = lon_deg.to_radians();

        // The pole opposite the cone apex projects to infinity
        if (lat + self.n.signum() * PI / 2.0).abs() < 1e-12 {
            return Err(ProjectionError::transform_failed(format!(
                "latitude {} is a Lambert Conformal singularity",
                lat_deg
            )));
        }

        // Normalize longitude difference to [-π, π)
        let dlon = (lon - self.lon0 + PI).rem_euclid(2.0 * PI) - PI;

        let rho = self.earth_radius * self.f / (PI / 4.0 + lat / 2.0).tan().powf(self.n);
        let theta = self.n * dlon;

        let x = self.false_easting + rho * theta.sin();
        let y = self.false_northing + self.rho0 - rho * theta.cos();

        if !x.is_finite() || !y.is_finite() {
            return Err(ProjectionError::transform_failed(format!(
                "({}, {}) has no Lambert Conformal image",
                lon_deg, lat_deg
            )));
        }
        Ok((x, y))
    }

    /// Convert projected meters to geographic coordinates (lon/lat in degrees).
    pub fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let dx = x - self.false_easting;
        let dy = self.rho0 - (y - self.false_northing);

        let mut rho = (dx * dx + dy * dy).sqrt();
        let theta = if self.n < 0.0 {
            rho = -rho;
            (-dx).atan2(-dy)
        } else {
            dx.atan2(dy)
        };

        let lat = if rho == 0.0 {
            self.n.signum() * PI / 2.0
        } else {
            2.0 * ((self.earth_radius * self.f / rho).powf(1.0 / self.n)).atan() - PI / 2.0
        };
        let lon = self.lon0 + theta / self.n;

        Ok((lon.to_degrees(), lat.to_degrees()))
    }

    /// Latitude of origin in degrees.
    pub fn origin_latitude(&self) -> f64 {
        self.lat0.to_degrees()
    }
}
