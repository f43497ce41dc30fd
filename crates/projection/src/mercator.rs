//! Spherical "Pseudo" Mercator projection (EPSG:3857).
//!
//! Geographic coordinates on WGS84 are projected as if they lay on a sphere
//! whose radius is the WGS84 semi-major axis. The poles map to infinity, so
//! projecting latitudes of ±90° fails.

use std::f64::consts::PI;

use crate::error::{ProjectionError, Result};

/// WGS84 semi-major axis, used as the sphere radius.
pub const EARTH_RADIUS: f64 = 6378137.0;

/// Half the world width in meters (±180° longitude).
pub const MAX_EXTENT: f64 = PI * EARTH_RADIUS;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WebMercator {
    pub radius: f64,
}

impl WebMercator {
    pub fn new() -> Self {
        Self {
            radius: EARTH_RADIUS,
        }
    }

    /// (lon, lat) in degrees to (x, y) in meters.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> Result<(f64, f64)> {
        if lat_deg.abs() >= 90.0 {
            return Err(ProjectionError::transform_failed(format!(
                "latitude {} is a Mercator singularity",
                lat_deg
            )));
        }
        let x = self.radius * lon_deg.to_radians();
        let y = self.radius * (PI / 4.0 + lat_deg.to_radians() / 2.0).tan().ln();
        Ok((x, y))
    }

    /// (x, y) in meters to (lon, lat) in degrees.
    pub fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let lon = (x / self.radius).to_degrees();
        let lat = (2.0 * (y / self.radius).exp().atan() - PI / 2.0).to_degrees();
        Ok((lon, lat))
    }
}

impl Default for WebMercator {
    fn default() -> Self {
        Self::new()
    }
}
