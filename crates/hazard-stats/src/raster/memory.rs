//! In-memory raster reader.

use std::sync::Mutex;

use hazard_common::{BoundingBox, Crs, ReferencedEnvelope};
use projection::{AffineTransform, MathTransform};

use super::{
    Coverage, GridGeometry, GridRange, PixelAnchor, RasterReader, SampleDimension, ViewType,
};
use crate::error::{HazardError, Result, SourceError};

/// A north-up grid held in memory.
///
/// Reads clip the requested range to the grid and return `None` when
/// nothing is left. Requests are recorded only when the builder asked for it.
#[derive(Debug)]
pub struct MemoryRaster {
    name: Option<String>,
    crs: Crs,
    extent: BoundingBox,
    grid_to_world: AffineTransform,
    data: Coverage,
    requests: Option<Mutex<Vec<GridGeometry>>>,
}

impl MemoryRaster {
    /// Start building a `width x height` grid covering `extent` in `crs`.
    pub fn builder(crs: Crs, extent: BoundingBox, width: usize, height: usize) -> MemoryRasterBuilder {
        MemoryRasterBuilder {
            name: None,
            crs,
            extent,
            width,
            height,
            bands: Vec::new(),
            sample_dimensions: Vec::new(),
            mask: None,
            view: ViewType::Packed,
            record_requests: false,
        }
    }

    pub fn width(&self) -> usize {
        self.data.width()
    }

    pub fn height(&self) -> usize {
        self.data.height()
    }

    /// Grid geometries passed to [`RasterReader::read`] so far.
    ///
    /// Always empty unless built with [`MemoryRasterBuilder::record_requests`].
    pub fn requests(&self) -> Vec<GridGeometry> {
        self.requests
            .as_ref()
            .and_then(|log| log.lock().ok().map(|log| log.clone()))
            .unwrap_or_default()
    }

    fn full_range(&self) -> GridRange {
        GridRange::new(0, 0, self.width() as i64, self.height() as i64)
    }

    fn range_envelope(&self, range: &GridRange) -> BoundingBox {
        let (x0, y0) = self.grid_to_world.apply(range.x as f64, range.y as f64);
        let (x1, y1) = self
            .grid_to_world
            .apply(range.max_x() as f64, range.max_y() as f64);
        BoundingBox::new(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
    }
}

impl RasterReader for MemoryRaster {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn crs(&self) -> &Crs {
        &self.crs
    }

    fn original_envelope(&self) -> ReferencedEnvelope {
        ReferencedEnvelope::new(self.extent, self.crs.clone())
    }

    fn original_grid_to_world(&self, anchor: PixelAnchor) -> MathTransform {
        match anchor {
            PixelAnchor::CellCorner => self.grid_to_world.into(),
            PixelAnchor::CellCenter => self
                .grid_to_world
                .after(&AffineTransform::translation(0.5, 0.5))
                .into(),
        }
    }

    fn read(&self, grid: &GridGeometry) -> std::result::Result<Option<Coverage>, SourceError> {
        if let Some(Ok(mut log)) = self.requests.as_ref().map(Mutex::lock) {
            log.push(grid.clone());
        }

        let Some(range) = grid.range.intersection(&self.full_range()) else {
            tracing::debug!(
                raster = self.name.as_deref().unwrap_or("memory"),
                requested = ?grid.range,
                "Requested range outside raster"
            );
            return Ok(None);
        };

        tracing::debug!(
            raster = self.name.as_deref().unwrap_or("memory"),
            x = range.x,
            y = range.y,
            width = range.width,
            height = range.height,
            "Reading window"
        );

        let envelope = ReferencedEnvelope::new(self.range_envelope(&range), self.crs.clone());
        self.data
            .window(
                range.x as usize,
                range.y as usize,
                range.width as usize,
                range.height as usize,
                envelope,
            )
            .map(Some)
            .map_err(|e| SourceError::backend(e.to_string()))
    }
}

/// Builder for [`MemoryRaster`].
#[derive(Debug, Clone)]
pub struct MemoryRasterBuilder {
    name: Option<String>,
    crs: Crs,
    extent: BoundingBox,
    width: usize,
    height: usize,
    bands: Vec<Vec<f64>>,
    sample_dimensions: Vec<SampleDimension>,
    mask: Option<Vec<bool>>,
    view: ViewType,
    record_requests: bool,
}

impl MemoryRasterBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append a band of row-major samples, top row first.
    pub fn band(mut self, values: Vec<f64>) -> Self {
        self.bands.push(values);
        self
    }

    /// Append a band with its sample dimension.
    pub fn band_with(mut self, values: Vec<f64>, dimension: SampleDimension) -> Self {
        self.sample_dimensions
            .resize_with(self.bands.len(), SampleDimension::default);
        self.bands.push(values);
        self.sample_dimensions.push(dimension);
        self
    }

    /// Cells set to `false` are excluded from every band.
    pub fn mask(mut self, mask: Vec<bool>) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Samples are already physical values.
    pub fn geophysics(mut self) -> Self {
        self.view = ViewType::Geophysics;
        self
    }

    /// Keep every read request for [`MemoryRaster::requests`].
    pub fn record_requests(mut self) -> Self {
        self.record_requests = true;
        self
    }

    pub fn build(self) -> Result<MemoryRaster> {
        if self.width == 0 || self.height == 0 {
            return Err(HazardError::invalid_input(format!(
                "raster size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.extent.is_empty() {
            return Err(HazardError::invalid_input("raster extent is empty"));
        }

        let envelope = ReferencedEnvelope::new(self.extent, self.crs.clone());
        let data = Coverage::new(
            self.width,
            self.height,
            self.bands,
            self.sample_dimensions,
            self.mask,
            self.view,
            envelope,
        )?;

        Ok(MemoryRaster {
            name: self.name,
            grid_to_world: AffineTransform::from_extent(&self.extent, self.width, self.height),
            crs: self.crs,
            extent: self.extent,
            data,
            requests: self.record_requests.then(|| Mutex::new(Vec::new())),
        })
    }
}
