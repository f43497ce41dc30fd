//! Common types shared across the hazard statistics workspace.

pub mod bbox;
pub mod crs;

pub use bbox::{BoundingBox, ReferencedEnvelope};
pub use crs::{CoordinateSystem, Crs, CrsParseError, Datum, ProjectionParams, Unit};
