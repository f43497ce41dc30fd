//! 2-D affine transforms between grid (pixel) space and world space.
//!
//! The transform maps `(col, row)` to `(x, y)`:
//!
//! ```text
//! x = m00 * col + m01 * row + m02
//! y = m10 * col + m11 * row + m12
//! ```
//!
//! stored as the upper two rows of a homogeneous 3x3 matrix.

use hazard_common::BoundingBox;
use nalgebra::Matrix3;

use crate::error::{ProjectionError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    matrix: Matrix3<f64>,
}

impl AffineTransform {
    /// Build from the six affine coefficients.
    pub fn new(m00: f64, m01: f64, m02: f64, m10: f64, m11: f64, m12: f64) -> Self {
        Self {
            matrix: Matrix3::new(m00, m01, m02, m10, m11, m12, 0.0, 0.0, 1.0),
        }
    }

    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
        }
    }

    pub fn translation(dx: f64, dy: f64) -> Self {
        Self::new(1.0, 0.0, dx, 0.0, 1.0, dy)
    }

    /// North-up grid-to-world transform (cell corner anchored) for a grid of
    /// `width` x `height` cells covering `extent`. Row 0 is the northern edge.
    pub fn from_extent(extent: &BoundingBox, width: usize, height: usize) -> Self {
        let dx = extent.width() / width as f64;
        let dy = extent.height() / height as f64;
        Self::new(dx, 0.0, extent.min_x, 0.0, -dy, extent.max_y)
    }

    /// Exact identity check, no tolerance.
    pub fn is_identity(&self) -> bool {
        self.matrix == Matrix3::identity()
    }

    /// The six coefficients `(m00, m01, m02, m10, m11, m12)`.
    pub fn coefficients(&self) -> [f64; 6] {
        let m = &self.matrix;
        [m[(0, 0)], m[(0, 1)], m[(0, 2)], m[(1, 0)], m[(1, 1)], m[(1, 2)]]
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let m = &self.matrix;
        (
            m[(0, 0)] * x + m[(0, 1)] * y + m[(0, 2)],
            m[(1, 0)] * x + m[(1, 1)] * y + m[(1, 2)],
        )
    }

    /// Transform applying `first` and then `self`.
    pub fn after(&self, first: &AffineTransform) -> Self {
        Self {
            matrix: self.matrix * first.matrix,
        }
    }

    pub fn inverse(&self) -> Result<Self> {
        let det = self.matrix.determinant();
        if det == 0.0 || !det.is_finite() {
            return Err(ProjectionError::NonInvertible(format!(
                "affine transform {:?} has determinant {}",
                self.coefficients(),
                det
            )));
        }
        self.matrix
            .try_inverse()
            .map(|matrix| Self { matrix })
            .ok_or_else(|| {
                ProjectionError::NonInvertible(format!(
                    "affine transform {:?} is singular",
                    self.coefficients()
                ))
            })
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extent_maps_corners() {
        let extent = BoundingBox::new(-10.0, -10.0, 10.0, 10.0);
        let t = AffineTransform::from_extent(&extent, 4, 2);

        assert_eq!(t.apply(0.0, 0.0), (-10.0, 10.0));
        assert_eq!(t.apply(4.0, 2.0), (10.0, -10.0));
        assert_eq!(t.apply(2.0, 1.0), (0.0, 0.0));
    }

    #[test]
    fn test_inverse_roundtrip() {
        let t = AffineTransform::new(30.0, 0.0, 500000.0, 0.0, -30.0, 4200000.0);
        let inv = t.inverse().unwrap();

        let (x, y) = t.apply(12.5, 7.25);
        let (col, row) = inv.apply(x, y);
        assert!((col - 12.5).abs() < 1e-9);
        assert!((row - 7.25).abs() < 1e-9);
        assert!(inv.after(&t).coefficients().iter().zip([1.0, 0.0, 0.0, 0.0, 1.0, 0.0]).all(
            |(a, b)| (a - b).abs() < 1e-9
        ));
    }

    #[test]
    fn test_singular_is_not_invertible() {
        let t = AffineTransform::new(1.0, 2.0, 0.0, 2.0, 4.0, 0.0);
        assert!(matches!(t.inverse(), Err(ProjectionError::NonInvertible(_))));
    }

    #[test]
    fn test_identity() {
        assert!(AffineTransform::identity().is_identity());
        assert!(AffineTransform::translation(0.0, 0.0).is_identity());
        assert!(!AffineTransform::translation(0.5, 0.5).is_identity());
    }

    #[test]
    fn test_after_composes_in_order() {
        let scale = AffineTransform::new(2.0, 0.0, 0.0, 0.0, 2.0, 0.0);
        let shift = AffineTransform::translation(1.0, 1.0);
        // shift first, then scale
        assert_eq!(scale.after(&shift).apply(0.0, 0.0), (2.0, 2.0));
        // scale first, then shift
        assert_eq!(shift.after(&scale).apply(0.0, 0.0), (1.0, 1.0));
    }
}
