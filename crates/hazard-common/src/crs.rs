//! Coordinate Reference System definitions.
//!
//! A [`Crs`] pairs descriptive metadata (its name / identifier) with the
//! structural definition that actually determines how coordinates are
//! interpreted: the datum and the coordinate system. Two CRSs describing the
//! same datum and coordinate system are interchangeable even when their
//! identifiers differ, see [`Crs::equals_ignore_metadata`].
//!
//! Geographic coordinates are always handled in (longitude, latitude) order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Geodetic datum of a CRS.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Datum {
    /// World Geodetic System 1984
    Wgs84,
    /// North American Datum 1983
    Nad83,
    /// A sphere of the given radius (meters)
    Sphere { radius: f64 },
}

/// Parameters of a supported map projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProjectionParams {
    /// Spherical "Pseudo" Mercator used by web maps (EPSG:3857).
    WebMercator,
    /// Lambert Conformal Conic, all angles in degrees, offsets in meters.
    LambertConformal {
        /// Latitude of the projection origin
        lat0: f64,
        /// Central meridian
        lon0: f64,
        /// First standard parallel
        latin1: f64,
        /// Second standard parallel (equal to `latin1` for a tangent cone)
        latin2: f64,
        false_easting: f64,
        false_northing: f64,
    },
}

/// How coordinate tuples of a CRS relate to the datum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CoordinateSystem {
    /// Longitude / latitude in degrees.
    Geographic,
    /// Easting / northing in meters produced by a map projection.
    Projected(ProjectionParams),
    /// Local cartesian space with no known relation to the Earth.
    Engineering,
}

/// Linear or angular unit of a CRS axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    Degree,
    Metre,
    /// Unit of an engineering CRS, meaningful only to its producer
    Unknown,
}

/// Full CRS definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crs {
    /// Identifier, e.g. "EPSG:4326". Metadata only.
    name: String,
    datum: Datum,
    cs: CoordinateSystem,
}

impl Crs {
    pub fn new(name: impl Into<String>, datum: Datum, cs: CoordinateSystem) -> Self {
        Self {
            name: name.into(),
            datum,
            cs,
        }
    }

    /// WGS84 geographic (EPSG:4326), longitude first.
    pub fn wgs84() -> Self {
        Self::new("EPSG:4326", Datum::Wgs84, CoordinateSystem::Geographic)
    }

    /// OGC CRS:84. Structurally identical to [`Crs::wgs84`].
    pub fn crs84() -> Self {
        Self::new("CRS:84", Datum::Wgs84, CoordinateSystem::Geographic)
    }

    /// NAD83 geographic (EPSG:4269).
    pub fn nad83() -> Self {
        Self::new("EPSG:4269", Datum::Nad83, CoordinateSystem::Geographic)
    }

    /// Web Mercator (EPSG:3857).
    pub fn web_mercator() -> Self {
        Self::new(
            "EPSG:3857",
            Datum::Wgs84,
            CoordinateSystem::Projected(ProjectionParams::WebMercator),
        )
    }

    /// A Lambert Conformal Conic CRS with custom parameters.
    pub fn lambert_conformal(name: impl Into<String>, datum: Datum, params: ProjectionParams) -> Self {
        Self::new(name, datum, CoordinateSystem::Projected(params))
    }

    /// A local cartesian CRS which cannot be related to any other CRS.
    pub fn engineering(name: impl Into<String>) -> Self {
        Self::new(name, Datum::Wgs84, CoordinateSystem::Engineering)
    }

    /// Decode a CRS identifier.
    ///
    /// Accepts formats like:
    /// - "EPSG:4326"
    /// - "epsg:3857"
    /// - "CRS:84" (equivalent to EPSG:4326 with lon/lat axis order)
    pub fn decode(s: &str) -> Result<Self, CrsParseError> {
        let normalized = s.trim().to_uppercase();

        match normalized.as_str() {
            "EPSG:4326" => Ok(Self::wgs84()),
            "CRS:84" | "OGC:CRS84" => Ok(Self::crs84()),
            "EPSG:4269" => Ok(Self::nad83()),
            "EPSG:3857" | "EPSG:900913" => Ok(Self::web_mercator()),
            _ => Err(CrsParseError::UnsupportedCrs(s.to_string())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn datum(&self) -> Datum {
        self.datum
    }

    pub fn coordinate_system(&self) -> CoordinateSystem {
        self.cs
    }

    /// Check if this is a geographic (lon/lat) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self.cs, CoordinateSystem::Geographic)
    }

    /// Unit shared by both axes.
    pub fn unit(&self) -> Unit {
        match self.cs {
            CoordinateSystem::Geographic => Unit::Degree,
            CoordinateSystem::Projected(_) => Unit::Metre,
            CoordinateSystem::Engineering => Unit::Unknown,
        }
    }

    /// Structural equality: datum, coordinate system and projection
    /// parameters must match, identifiers are ignored.
    ///
    /// Engineering CRSs carry no structure, so they only match themselves by name.
    pub fn equals_ignore_metadata(&self, other: &Crs) -> bool {
        match (self.cs, other.cs) {
            (CoordinateSystem::Engineering, CoordinateSystem::Engineering) => self.name == other.name,
            (a, b) => a == b && self.datum == other.datum,
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CrsParseError {
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),
}
