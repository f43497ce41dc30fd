//! The hazard statistics operator.

use std::fmt;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::{json, Value};

use crate::config::OperatorConfig;
use crate::error::{HazardError, OperatorError};
use crate::geometry::ReferencedGeometry;
use crate::political::{self, PoliticalRecord};
use crate::progress::ProgressListener;
use crate::raster::RasterReader;
use crate::selector::SubGridSelector;
use crate::statistics::{self, LayerStatistics};
use crate::vector::FeatureSource;

/// Inputs of one operator invocation.
#[derive(Clone, Default)]
pub struct HazardInputs {
    pub geometry: Option<ReferencedGeometry>,
    pub radius: Option<f64>,
    pub datalayers: Vec<Arc<dyn RasterReader>>,
    pub political_layer: Option<Arc<dyn FeatureSource>>,
    pub political_attributes: Option<Vec<String>>,
}

impl HazardInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn geometry(mut self, geometry: ReferencedGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn datalayer(mut self, layer: Arc<dyn RasterReader>) -> Self {
        self.datalayers.push(layer);
        self
    }

    pub fn political_layer(mut self, layer: Arc<dyn FeatureSource>) -> Self {
        self.political_layer = Some(layer);
        self
    }

    pub fn political_attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.political_attributes = Some(names.into_iter().map(Into::into).collect());
        self
    }

    fn validate(&self) -> Result<(&ReferencedGeometry, f64), HazardError> {
        let geometry = self
            .geometry
            .as_ref()
            .ok_or_else(|| HazardError::invalid_input("geometry is required"))?;

        let radius = self
            .radius
            .ok_or_else(|| HazardError::invalid_input("radius is required"))?;
        if !radius.is_finite() || radius < 0.0 {
            return Err(HazardError::invalid_input(format!(
                "radius must be a finite non-negative number, got {}",
                radius
            )));
        }

        if self.datalayers.is_empty() {
            return Err(HazardError::invalid_input("at least one data layer is required"));
        }

        if self.political_layer.is_some()
            && self.political_attributes.as_ref().map_or(true, Vec::is_empty)
        {
            return Err(HazardError::invalid_input(
                "political attributes are required with a political layer",
            ));
        }

        Ok((geometry, radius))
    }
}

impl fmt::Debug for HazardInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HazardInputs")
            .field("geometry", &self.geometry)
            .field("radius", &self.radius)
            .field("datalayers", &self.datalayers.len())
            .field(
                "political_layer",
                &self.political_layer.as_ref().map(|l| l.name().to_string()),
            )
            .field("political_attributes", &self.political_attributes)
            .finish()
    }
}

/// Result of one operator invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct HazardReport {
    /// One slot per input layer, `None` when the layer misses the region.
    pub statistics: Vec<Option<LayerStatistics>>,
    pub political: Vec<PoliticalRecord>,
    pub buffer: ReferencedGeometry,
}

impl HazardReport {
    /// JSON rendering with the buffer as GeoJSON.
    ///
    /// Non-finite statistics become `null`.
    pub fn to_json(&self) -> Value {
        json!({
            "statistics": self.statistics,
            "political": self.political,
            "buffer": self.buffer.to_geojson(),
        })
    }
}

impl Serialize for HazardReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("HazardReport", 3)?;
        state.serialize_field("statistics", &self.statistics)?;
        state.serialize_field("political", &self.political)?;
        state.serialize_field("buffer", &self.buffer.to_geojson())?;
        state.end()
    }
}

/// Computes hazard statistics around a region of interest.
///
/// Holds only configuration; one instance can serve concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct HazardStatistics {
    config: OperatorConfig,
}

impl HazardStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: OperatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OperatorConfig {
        &self.config
    }

    /// Run the operator.
    ///
    /// Layers whose extent misses the buffered region get a `None` slot.
    /// Any other failure aborts the whole invocation.
    pub fn execute(
        &self,
        inputs: &HazardInputs,
        progress: &dyn ProgressListener,
    ) -> Result<HazardReport, OperatorError> {
        self.config.validate().map_err(HazardError::invalid_input)?;
        let (geometry, radius) = inputs.validate()?;

        let layers = inputs.datalayers.len();
        tracing::info!(
            layers,
            radius,
            crs = geometry.crs().map(|c| c.name()).unwrap_or("none"),
            political = inputs.political_layer.is_some(),
            "Computing hazard statistics"
        );
        progress.started();

        let buffer = geometry.buffer(radius);
        let selector =
            SubGridSelector::new(self.config.lenient_datum_shift, self.config.envelope_densification);
        let steps = layers + usize::from(inputs.political_layer.is_some());

        let mut stats = Vec::with_capacity(layers);
        for (index, reader) in inputs.datalayers.iter().enumerate() {
            if self.config.check_cancellation && progress.is_canceled() {
                tracing::info!(layer = index, "Cancelled");
                return Err(OperatorError::for_layer(index, HazardError::Cancelled));
            }

            let layer_stats = self
                .layer_statistics(&selector, reader.as_ref(), &buffer)
                .map_err(|e| OperatorError::for_layer(index, e))?;
            stats.push(layer_stats);
            progress.progress((index + 1) as f32 / steps as f32);
        }

        let political = match &inputs.political_layer {
            Some(layer) => {
                let attributes = inputs.political_attributes.as_deref().unwrap_or_default();
                let records = political::intersect(
                    layer.as_ref(),
                    attributes,
                    &buffer,
                    progress,
                    self.config.check_cancellation,
                )?;
                progress.progress(1.0);
                records
            }
            None => Vec::new(),
        };

        progress.complete();
        tracing::info!(
            populated = stats.iter().filter(|s| s.is_some()).count(),
            political = political.len(),
            "Hazard statistics complete"
        );

        Ok(HazardReport {
            statistics: stats,
            political,
            buffer,
        })
    }

    fn layer_statistics(
        &self,
        selector: &SubGridSelector,
        reader: &dyn RasterReader,
        buffer: &ReferencedGeometry,
    ) -> Result<Option<LayerStatistics>, HazardError> {
        let name = reader.name().unwrap_or("unnamed");
        let request = buffer.referenced_envelope(reader.crs());

        let Some(grid) = selector.select(reader, &request)? else {
            tracing::debug!(layer = name, "Layer does not intersect region");
            return Ok(None);
        };

        let coverage = reader
            .read(&grid)
            .map_err(|e| HazardError::from_source(format!("reading layer '{}' failed", name), e))?
            .ok_or_else(|| {
                HazardError::read_failed(format!(
                    "layer '{}' returned no coverage for {:?}",
                    name, grid.range
                ))
            })?;

        let stats = statistics::compute(&coverage.geophysics());
        tracing::debug!(
            layer = name,
            width = coverage.width(),
            height = coverage.height(),
            bands = stats.num_bands(),
            "Layer statistics computed"
        );
        Ok(Some(stats))
    }
}
