//! Coordinate reference system transformations.
//!
//! Implements the CRS service from scratch: map projections, affine grid
//! transforms and transform discovery between [`hazard_common::Crs`] values.

pub mod affine;
pub mod error;
pub mod lambert;
pub mod mercator;
pub mod transform;

pub use affine::AffineTransform;
pub use error::{ProjectionError, Result};
pub use lambert::LambertConformal;
pub use mercator::WebMercator;
pub use transform::{
    find_transform, transform_envelope, transform_geometry, MathTransform, Projection,
    DEFAULT_ENVELOPE_DENSIFICATION,
};
