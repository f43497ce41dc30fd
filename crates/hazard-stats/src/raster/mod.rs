//! Raster reader trait and grid geometry types.

mod coverage;
mod memory;

pub use coverage::{Coverage, GeophysicalView, SampleDimension, ViewType};
pub use memory::{MemoryRaster, MemoryRasterBuilder};

use hazard_common::{BoundingBox, Crs, ReferencedEnvelope};
use projection::MathTransform;

use crate::error::SourceError;

/// Which point of a cell the grid-to-world transform maps integer indices to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelAnchor {
    /// Integer indices address the upper-left corner of a cell.
    CellCorner,
    /// Integer indices address the center of a cell.
    CellCenter,
}

/// Integer pixel rectangle. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridRange {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

/// Grid coordinates closer than this to an integer are snapped to it, so
/// rounding noise from the world-to-grid transform does not add a row.
const GRID_SNAP_TOLERANCE: f64 = 1e-9;

fn snap(v: f64) -> f64 {
    let rounded = v.round();
    if (v - rounded).abs() < GRID_SNAP_TOLERANCE {
        rounded
    } else {
        v
    }
}

impl GridRange {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest integer rectangle containing `bounds` (grid coordinates).
    pub fn bounding(bounds: &BoundingBox) -> Self {
        let min_x = snap(bounds.min_x).floor() as i64;
        let min_y = snap(bounds.min_y).floor() as i64;
        let max_x = snap(bounds.max_x).ceil() as i64;
        let max_y = snap(bounds.max_y).ceil() as i64;
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn max_x(&self) -> i64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> i64 {
        self.y + self.height
    }

    /// Overlap with another range, `None` when empty.
    pub fn intersection(&self, other: &GridRange) -> Option<GridRange> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let range = GridRange::new(
            x,
            y,
            self.max_x().min(other.max_x()) - x,
            self.max_y().min(other.max_y()) - y,
        );
        (!range.is_empty()).then_some(range)
    }

    /// Number of cells covered.
    pub fn cell_count(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.width * self.height) as usize
        }
    }
}

/// A pixel rectangle paired with the world envelope it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct GridGeometry {
    pub range: GridRange,
    pub envelope: ReferencedEnvelope,
}

impl GridGeometry {
    pub fn new(range: GridRange, envelope: ReferencedEnvelope) -> Self {
        Self { range, envelope }
    }
}

/// A tiled or gridded coverage source.
///
/// Implementations include in-memory grids ([`MemoryRaster`]), file backed
/// readers and mosaics. Readers are shared between invocations and must
/// tolerate concurrent reads.
pub trait RasterReader: Send + Sync {
    /// Human readable name for logging.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Native CRS of the grid.
    fn crs(&self) -> &Crs;

    /// World extent of the full grid in [`RasterReader::crs`].
    fn original_envelope(&self) -> ReferencedEnvelope;

    /// Grid-to-world transform of the full grid.
    fn original_grid_to_world(&self, anchor: PixelAnchor) -> MathTransform;

    /// Read the cells of `grid` at native resolution.
    ///
    /// `Ok(None)` means the reader found nothing to return for the request.
    fn read(&self, grid: &GridGeometry) -> Result<Option<Coverage>, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_floors_and_ceils() {
        let range = GridRange::bounding(&BoundingBox::new(0.45, 0.45, 0.55, 0.55));
        assert_eq!(range, GridRange::new(0, 0, 1, 1));

        let range = GridRange::bounding(&BoundingBox::new(0.5, 0.5, 1.5, 1.5));
        assert_eq!(range, GridRange::new(0, 0, 2, 2));
    }

    #[test]
    fn test_bounding_snaps_rounding_noise() {
        let range = GridRange::bounding(&BoundingBox::new(1.0 - 1e-12, 2.0, 3.0 + 1e-12, 4.0));
        assert_eq!(range, GridRange::new(1, 2, 2, 2));
    }

    #[test]
    fn test_range_intersection() {
        let a = GridRange::new(-2, -2, 5, 5);
        let b = GridRange::new(0, 0, 4, 4);
        assert_eq!(a.intersection(&b), Some(GridRange::new(0, 0, 3, 3)));

        let c = GridRange::new(10, 10, 1, 1);
        assert_eq!(a.intersection(&c), None);
    }

    #[test]
    fn test_cell_count() {
        assert_eq!(GridRange::new(0, 0, 3, 2).cell_count(), 6);
        assert_eq!(GridRange::new(0, 0, 0, 2).cell_count(), 0);
    }
}
