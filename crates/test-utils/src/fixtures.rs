//! Common test fixtures for hazard statistics tests.
//!
//! This module provides pre-defined extents and geometries for the
//! scenarios the test suites exercise.

use geo::{polygon, Polygon};
use hazard_common::BoundingBox;

/// Common extent definitions for testing, as `(min_x, min_y, max_x, max_y)`.
pub mod bbox {
    /// Twenty degree square centered on the origin
    pub const AROUND_ORIGIN: (f64, f64, f64, f64) = (-10.0, -10.0, 10.0, 10.0);

    /// Two degree square centered on the origin
    pub const UNIT_AROUND_ORIGIN: (f64, f64, f64, f64) = (-1.0, -1.0, 1.0, 1.0);

    /// Far from the origin, disjoint from the squares above
    pub const FAR_AWAY: (f64, f64, f64, f64) = (100.0, 100.0, 101.0, 101.0);

    /// Web Mercator metres around 10E 45N
    pub const MERCATOR_NORTHERN_ITALY: (f64, f64, f64, f64) =
        (1_000_000.0, 5_500_000.0, 1_200_000.0, 5_700_000.0);
}

/// Common grid specifications for testing.
pub mod grid {
    /// Simple 10x10 test grid over [`super::bbox::AROUND_ORIGIN`]
    pub const SIMPLE_10X10: GridSpec = GridSpec {
        width: 10,
        height: 10,
        min_x: -10.0,
        max_x: 10.0,
        min_y: -10.0,
        max_y: 10.0,
    };

    /// 1 km Web Mercator grid over northern Italy
    pub const MERCATOR_1KM: GridSpec = GridSpec {
        width: 200,
        height: 200,
        min_x: 1_000_000.0,
        max_x: 1_200_000.0,
        min_y: 5_500_000.0,
        max_y: 5_700_000.0,
    };

    /// Grid specification for testing.
    #[derive(Debug, Clone, Copy)]
    pub struct GridSpec {
        pub width: usize,
        pub height: usize,
        pub min_x: f64,
        pub max_x: f64,
        pub min_y: f64,
        pub max_y: f64,
    }

    impl GridSpec {
        /// Returns the total number of grid cells.
        pub fn size(&self) -> usize {
            self.width * self.height
        }

        /// Returns the cell size in CRS units.
        pub fn resolution(&self) -> (f64, f64) {
            let dx = (self.max_x - self.min_x) / self.width as f64;
            let dy = (self.max_y - self.min_y) / self.height as f64;
            (dx, dy)
        }

        /// Returns the extent as (min_x, min_y, max_x, max_y).
        pub fn bbox(&self) -> (f64, f64, f64, f64) {
            (self.min_x, self.min_y, self.max_x, self.max_y)
        }
    }
}

/// Political boundary fixtures.
pub mod political {
    /// Name and population of region "A", which overlaps the origin.
    pub const REGION_A: (&str, i64) = ("A", 125_000);

    /// Name and population of region "B", far from the origin.
    pub const REGION_B: (&str, i64) = ("B", 4_200);
}

/// Build a [`BoundingBox`] from a fixture tuple.
pub fn to_bbox(extent: (f64, f64, f64, f64)) -> BoundingBox {
    BoundingBox::new(extent.0, extent.1, extent.2, extent.3)
}

/// Axis-aligned rectangle polygon, counter-clockwise from the lower-left.
pub fn rectangle(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Polygon<f64> {
    polygon![
        (x: min_x, y: min_y),
        (x: max_x, y: min_y),
        (x: max_x, y: max_y),
        (x: min_x, y: max_y),
    ]
}

/// Boundary of region "A": a square straddling the origin.
pub fn region_a() -> Polygon<f64> {
    rectangle(-2.0, -2.0, 2.0, 2.0)
}

/// Boundary of region "B": a square disjoint from any small buffer around the origin.
pub fn region_b() -> Polygon<f64> {
    rectangle(40.0, 40.0, 45.0, 45.0)
}
