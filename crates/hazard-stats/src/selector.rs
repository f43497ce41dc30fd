//! Selection of the minimal sub-grid covering a request envelope.

use hazard_common::ReferencedEnvelope;
use projection::{find_transform, transform_envelope, DEFAULT_ENVELOPE_DENSIFICATION};

use crate::error::Result;
use crate::raster::{GridGeometry, GridRange, PixelAnchor, RasterReader};

/// Computes the grid geometry a reader must read to cover an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubGridSelector {
    /// Allow datum changes without shift parameters.
    pub lenient: bool,
    /// Points sampled per envelope edge when reprojecting.
    pub densify: usize,
}

impl Default for SubGridSelector {
    fn default() -> Self {
        Self {
            lenient: true,
            densify: DEFAULT_ENVELOPE_DENSIFICATION,
        }
    }
}

impl SubGridSelector {
    pub fn new(lenient: bool, densify: usize) -> Self {
        Self { lenient, densify }
    }

    /// Minimal grid geometry of `reader` covering `request`.
    ///
    /// Returns `Ok(None)` when the request does not overlap the raster.
    pub fn select(
        &self,
        reader: &dyn RasterReader,
        request: &ReferencedEnvelope,
    ) -> Result<Option<GridGeometry>> {
        let raster_crs = reader.crs();

        let mut bbox = request.bbox;
        if !request.crs.equals_ignore_metadata(raster_crs) {
            let transform = find_transform(&request.crs, raster_crs, self.lenient)?;
            if !transform.is_identity() {
                bbox = transform_envelope(&transform, &bbox, self.densify)?;
            }
        }

        let original = reader.original_envelope();
        let Some(clipped) = bbox.intersection(&original.bbox) else {
            tracing::debug!(
                raster = reader.name().unwrap_or("unnamed"),
                request = ?bbox,
                extent = ?original.bbox,
                "Request does not intersect raster"
            );
            return Ok(None);
        };
        let envelope = ReferencedEnvelope::new(clipped, raster_crs.clone());

        let world_to_grid = reader
            .original_grid_to_world(PixelAnchor::CellCorner)
            .inverse()?;
        let grid_bounds = transform_envelope(&world_to_grid, &envelope.bbox, self.densify)?;
        let range = GridRange::bounding(&grid_bounds);

        tracing::debug!(
            raster = reader.name().unwrap_or("unnamed"),
            x = range.x,
            y = range.y,
            width = range.width,
            height = range.height,
            "Selected sub-grid"
        );

        Ok(Some(GridGeometry::new(range, envelope)))
    }
}
