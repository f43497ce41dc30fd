//! Math transforms between coordinate reference systems.
//!
//! [`find_transform`] derives a [`MathTransform`] between two CRSs by routing
//! through geographic coordinates on the shared datum:
//!
//! ```text
//! source CRS ──unproject──► lon/lat ──(datum)──► lon/lat ──project──► target CRS
//! ```
//!
//! No datum shift parameters are known, so a datum change is only accepted
//! in lenient mode where it is treated as a null shift.

use geo::{Coord, Geometry, MapCoords};
use hazard_common::{BoundingBox, CoordinateSystem, Crs, ProjectionParams};

use crate::affine::AffineTransform;
use crate::error::{ProjectionError, Result};
use crate::lambert::LambertConformal;
use crate::mercator::WebMercator;

/// Number of samples per envelope edge used by [`transform_envelope`] callers
/// that have no configured value.
pub const DEFAULT_ENVELOPE_DENSIFICATION: usize = 10;

/// A map projection between geographic lon/lat and projected meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    WebMercator(WebMercator),
    LambertConformal(LambertConformal),
}

impl Projection {
    pub fn from_params(params: &ProjectionParams) -> Result<Self> {
        match params {
            ProjectionParams::WebMercator => Ok(Self::WebMercator(WebMercator::new())),
            ProjectionParams::LambertConformal { .. } => {
                LambertConformal::from_params(params).map(Self::LambertConformal)
            }
        }
    }

    pub fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        match self {
            Self::WebMercator(p) => p.forward(lon, lat),
            Self::LambertConformal(p) => p.forward(lon, lat),
        }
    }

    pub fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        match self {
            Self::WebMercator(p) => p.inverse(x, y),
            Self::LambertConformal(p) => p.inverse(x, y),
        }
    }
}

/// A point-wise coordinate transform.
#[derive(Debug, Clone, PartialEq)]
pub enum MathTransform {
    Identity,
    Affine(AffineTransform),
    /// Geographic lon/lat to projected coordinates
    Project(Projection),
    /// Projected coordinates to geographic lon/lat
    Unproject(Projection),
    /// Steps applied in order
    Concatenated(Vec<MathTransform>),
}

impl MathTransform {
    /// Chain `steps`, dropping identities and flattening nested chains.
    pub fn concatenate(steps: impl IntoIterator<Item = MathTransform>) -> Self {
        let mut flat = Vec::new();
        for step in steps {
            match step {
                MathTransform::Identity => {}
                MathTransform::Concatenated(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => MathTransform::Identity,
            1 => flat.remove(0),
            _ => MathTransform::Concatenated(flat),
        }
    }

    /// Exact identity check.
    pub fn is_identity(&self) -> bool {
        match self {
            MathTransform::Identity => true,
            MathTransform::Affine(a) => a.is_identity(),
            MathTransform::Project(_) | MathTransform::Unproject(_) => false,
            MathTransform::Concatenated(steps) => steps.iter().all(MathTransform::is_identity),
        }
    }

    /// Transform a single coordinate pair.
    pub fn apply(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let (tx, ty) = match self {
            MathTransform::Identity => (x, y),
            MathTransform::Affine(a) => a.apply(x, y),
            MathTransform::Project(p) => p.forward(x, y)?,
            MathTransform::Unproject(p) => p.inverse(x, y)?,
            MathTransform::Concatenated(steps) => {
                let mut point = (x, y);
                for step in steps {
                    point = step.apply(point.0, point.1)?;
                }
                point
            }
        };

        if !tx.is_finite() || !ty.is_finite() {
            return Err(ProjectionError::transform_failed(format!(
                "({}, {}) transformed to non-finite ({}, {})",
                x, y, tx, ty
            )));
        }
        Ok((tx, ty))
    }

    pub fn inverse(&self) -> Result<MathTransform> {
        match self {
            MathTransform::Identity => Ok(MathTransform::Identity),
            MathTransform::Affine(a) => a.inverse().map(MathTransform::Affine),
            MathTransform::Project(p) => Ok(MathTransform::Unproject(*p)),
            MathTransform::Unproject(p) => Ok(MathTransform::Project(*p)),
            MathTransform::Concatenated(steps) => {
                let inverted = steps
                    .iter()
                    .rev()
                    .map(MathTransform::inverse)
                    .collect::<Result<Vec<_>>>()?;
                Ok(MathTransform::Concatenated(inverted))
            }
        }
    }
}

impl From<AffineTransform> for MathTransform {
    fn from(affine: AffineTransform) -> Self {
        MathTransform::Affine(affine)
    }
}

/// Find the transform from `source` to `target`.
///
/// With `lenient` set, a datum change is accepted without shift parameters.
pub fn find_transform(source: &Crs, target: &Crs, lenient: bool) -> Result<MathTransform> {
    if source.equals_ignore_metadata(target) {
        return Ok(MathTransform::Identity);
    }

    let unavailable =
        |reason: &str| ProjectionError::unavailable(source.name(), target.name(), reason);

    let to_geographic = match source.coordinate_system() {
        CoordinateSystem::Geographic => MathTransform::Identity,
        CoordinateSystem::Projected(params) => MathTransform::Unproject(Projection::from_params(&params)?),
        CoordinateSystem::Engineering => {
            return Err(unavailable("source is an engineering CRS"));
        }
    };

    let from_geographic = match target.coordinate_system() {
        CoordinateSystem::Geographic => MathTransform::Identity,
        CoordinateSystem::Projected(params) => MathTransform::Project(Projection::from_params(&params)?),
        CoordinateSystem::Engineering => {
            return Err(unavailable("target is an engineering CRS"));
        }
    };

    if source.datum() != target.datum() {
        if !lenient {
            return Err(unavailable("datum shift requires Bursa-Wolf parameters"));
        }
        tracing::debug!(
            source = %source,
            target = %target,
            "Ignoring datum shift in lenient mode"
        );
    }

    Ok(MathTransform::concatenate([to_geographic, from_geographic]))
}

/// Axis-aligned bounds of a transformed box.
///
/// The corners and `densify` evenly spaced points along every edge are
/// transformed, so curved edges of non-linear transforms are followed.
/// An empty input yields an empty output.
pub fn transform_envelope(
    transform: &MathTransform,
    bbox: &BoundingBox,
    densify: usize,
) -> Result<BoundingBox> {
    if transform.is_identity() || bbox.width().is_nan() || bbox.height().is_nan() {
        return Ok(*bbox);
    }
    if bbox.max_x < bbox.min_x || bbox.max_y < bbox.min_y {
        return Ok(BoundingBox::empty());
    }

    let steps = densify.max(1);
    let mut out = BoundingBox::empty();

    for step in 0..=steps {
        let frac = step as f64 / steps as f64;
        let x = bbox.min_x + frac * bbox.width();
        let y = bbox.min_y + frac * bbox.height();

        for (px, py) in [
            (x, bbox.min_y),
            (x, bbox.max_y),
            (bbox.min_x, y),
            (bbox.max_x, y),
        ] {
            let (tx, ty) = transform.apply(px, py)?;
            out.include_point(tx, ty);
        }
    }

    Ok(out)
}

/// Transform every vertex of a geometry.
pub fn transform_geometry(transform: &MathTransform, geometry: &Geometry<f64>) -> Result<Geometry<f64>> {
    if transform.is_identity() {
        return Ok(geometry.clone());
    }
    geometry.try_map_coords(|c: Coord<f64>| {
        transform
            .apply(c.x, c.y)
            .map(|(x, y)| Coord { x, y })
    })
}
