//! Coverage tiles and their geophysical view.

use hazard_common::ReferencedEnvelope;
use serde::{Deserialize, Serialize};

use crate::error::{HazardError, Result};

/// Whether coverage samples are raw storage values or physical units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewType {
    /// Raw samples, converted through the sample dimension on demand.
    #[default]
    Packed,
    /// Samples already in physical units.
    Geophysics,
}

/// Per-band metadata describing how raw samples become measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleDimension {
    pub description: String,
    /// Raw values that mark missing data.
    pub no_data: Vec<f64>,
    pub scale: f64,
    pub offset: f64,
    pub units: Option<String>,
}

impl SampleDimension {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_no_data(mut self, value: f64) -> Self {
        self.no_data.push(value);
        self
    }

    /// `physical = raw * scale + offset`
    pub fn with_scaling(mut self, scale: f64, offset: f64) -> Self {
        self.scale = scale;
        self.offset = offset;
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// Declared no-data check on a raw sample.
    pub fn is_no_data(&self, raw: f64) -> bool {
        self.no_data.iter().any(|nd| *nd == raw || (nd.is_nan() && raw.is_nan()))
    }

    pub fn to_physical(&self, raw: f64) -> f64 {
        raw * self.scale + self.offset
    }
}

impl Default for SampleDimension {
    fn default() -> Self {
        Self {
            description: String::new(),
            no_data: Vec::new(),
            scale: 1.0,
            offset: 0.0,
            units: None,
        }
    }
}

/// A 2-D block of cells, one row-major array per band.
#[derive(Debug, Clone)]
pub struct Coverage {
    width: usize,
    height: usize,
    bands: Vec<Vec<f64>>,
    sample_dimensions: Vec<SampleDimension>,
    /// `false` marks a cell excluded from analysis.
    mask: Option<Vec<bool>>,
    view: ViewType,
    envelope: ReferencedEnvelope,
}

impl Coverage {
    /// Create a coverage, checking that every array matches `width * height`.
    ///
    /// Missing sample dimensions default to identity scaling with no no-data.
    pub fn new(
        width: usize,
        height: usize,
        bands: Vec<Vec<f64>>,
        mut sample_dimensions: Vec<SampleDimension>,
        mask: Option<Vec<bool>>,
        view: ViewType,
        envelope: ReferencedEnvelope,
    ) -> Result<Self> {
        let cells = width * height;
        if bands.is_empty() {
            return Err(HazardError::invalid_input("coverage needs at least one band"));
        }
        if let Some(bad) = bands.iter().position(|b| b.len() != cells) {
            return Err(HazardError::invalid_input(format!(
                "band {} has {} samples, expected {}x{}",
                bad,
                bands[bad].len(),
                width,
                height
            )));
        }
        if sample_dimensions.len() > bands.len() {
            return Err(HazardError::invalid_input(format!(
                "{} sample dimensions for {} bands",
                sample_dimensions.len(),
                bands.len()
            )));
        }
        if let Some(mask) = &mask {
            if mask.len() != cells {
                return Err(HazardError::invalid_input(format!(
                    "mask has {} cells, expected {}",
                    mask.len(),
                    cells
                )));
            }
        }
        sample_dimensions.resize_with(bands.len(), SampleDimension::default);

        Ok(Self {
            width,
            height,
            bands,
            sample_dimensions,
            mask,
            view,
            envelope,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn num_bands(&self) -> usize {
        self.bands.len()
    }

    pub fn view_type(&self) -> ViewType {
        self.view
    }

    pub fn envelope(&self) -> &ReferencedEnvelope {
        &self.envelope
    }

    pub fn sample_dimensions(&self) -> &[SampleDimension] {
        &self.sample_dimensions
    }

    /// Raw sample of `band` at `(col, row)`.
    pub fn sample(&self, band: usize, col: usize, row: usize) -> Option<f64> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.bands.get(band)?.get(row * self.width + col).copied()
    }

    /// Copy of the `width x height` window starting at `(col, row)`.
    ///
    /// The window must lie inside the coverage.
    pub fn window(
        &self,
        col: usize,
        row: usize,
        width: usize,
        height: usize,
        envelope: ReferencedEnvelope,
    ) -> Result<Coverage> {
        if col + width > self.width || row + height > self.height {
            return Err(HazardError::invalid_input(format!(
                "window {}x{}+{}+{} outside {}x{} coverage",
                width, height, col, row, self.width, self.height
            )));
        }
        let cut = |values: &[f64]| -> Vec<f64> {
            (row..row + height)
                .flat_map(|r| values[r * self.width + col..r * self.width + col + width].iter().copied())
                .collect()
        };
        let bands = self.bands.iter().map(|b| cut(b.as_slice())).collect();
        let mask = self.mask.as_ref().map(|m| {
            (row..row + height)
                .flat_map(|r| m[r * self.width + col..r * self.width + col + width].iter().copied())
                .collect()
        });

        Coverage::new(
            width,
            height,
            bands,
            self.sample_dimensions.clone(),
            mask,
            self.view,
            envelope,
        )
    }

    /// View of this coverage in physical units.
    pub fn geophysics(&self) -> GeophysicalView<'_> {
        GeophysicalView { coverage: self }
    }
}

/// Coverage samples in physical units with masked cells removed.
#[derive(Debug, Clone, Copy)]
pub struct GeophysicalView<'a> {
    coverage: &'a Coverage,
}

impl<'a> GeophysicalView<'a> {
    pub fn num_bands(&self) -> usize {
        self.coverage.num_bands()
    }

    /// Physical values of `band`, `None` for masked cells.
    ///
    /// A cell is masked when the coverage mask excludes it, when its raw
    /// value is a declared no-data value, or when its physical value is NaN.
    pub fn band(&self, band: usize) -> impl Iterator<Item = Option<f64>> + 'a {
        let coverage = self.coverage;
        let dimension = &coverage.sample_dimensions[band];
        let scaled = coverage.view == ViewType::Packed;

        coverage.bands[band]
            .iter()
            .enumerate()
            .map(move |(idx, &raw)| {
                let masked = coverage.mask.as_ref().map_or(false, |m| !m[idx]);
                if masked || dimension.is_no_data(raw) {
                    return None;
                }
                let value = if scaled { dimension.to_physical(raw) } else { raw };
                (!value.is_nan()).then_some(value)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hazard_common::{BoundingBox, Crs};

    fn envelope() -> ReferencedEnvelope {
        ReferencedEnvelope::new(BoundingBox::new(0.0, 0.0, 2.0, 2.0), Crs::wgs84())
    }

    #[test]
    fn test_band_length_checked() {
        let result = Coverage::new(2, 2, vec![vec![1.0; 3]], vec![], None, ViewType::Packed, envelope());
        assert!(result.is_err());
    }

    #[test]
    fn test_geophysics_applies_scaling() {
        let dim = SampleDimension::new("depth").with_scaling(0.5, 10.0);
        let coverage = Coverage::new(
            2,
            1,
            vec![vec![0.0, 4.0]],
            vec![dim],
            None,
            ViewType::Packed,
            envelope(),
        )
        .unwrap();

        let values: Vec<_> = coverage.geophysics().band(0).collect();
        assert_eq!(values, vec![Some(10.0), Some(12.0)]);
    }

    #[test]
    fn test_geophysics_view_does_not_rescale() {
        let dim = SampleDimension::new("depth").with_scaling(0.5, 10.0);
        let coverage = Coverage::new(
            2,
            1,
            vec![vec![0.0, 4.0]],
            vec![dim],
            None,
            ViewType::Geophysics,
            envelope(),
        )
        .unwrap();

        let values: Vec<_> = coverage.geophysics().band(0).collect();
        assert_eq!(values, vec![Some(0.0), Some(4.0)]);
    }

    #[test]
    fn test_no_data_and_mask_excluded() {
        let dim = SampleDimension::new("wind").with_no_data(-9999.0);
        let coverage = Coverage::new(
            2,
            2,
            vec![vec![-9999.0, 1.0, 2.0, f64::NAN]],
            vec![dim],
            Some(vec![true, true, false, true]),
            ViewType::Packed,
            envelope(),
        )
        .unwrap();

        let values: Vec<_> = coverage.geophysics().band(0).collect();
        assert_eq!(values, vec![None, Some(1.0), None, None]);
    }

    #[test]
    fn test_zero_is_data_without_declaration() {
        let coverage = Coverage::new(1, 1, vec![vec![0.0]], vec![], None, ViewType::Packed, envelope())
            .unwrap();
        assert_eq!(coverage.sample_dimensions().len(), 1);
        assert_eq!(coverage.geophysics().band(0).collect::<Vec<_>>(), vec![Some(0.0)]);
    }

    #[test]
    fn test_window_copies_rows_and_mask() {
        let coverage = Coverage::new(
            3,
            2,
            vec![vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]],
            vec![],
            Some(vec![true, false, true, true, true, false]),
            ViewType::Packed,
            envelope(),
        )
        .unwrap();

        let window = coverage.window(1, 0, 2, 2, envelope()).unwrap();
        assert_eq!(window.width(), 2);
        assert_eq!(window.sample(0, 0, 1), Some(4.0));
        let values: Vec<_> = window.geophysics().band(0).collect();
        assert_eq!(values, vec![None, Some(2.0), Some(4.0), None]);

        assert!(coverage.window(2, 0, 2, 1, envelope()).is_err());
    }

    #[test]
    fn test_sample_lookup() {
        let coverage = Coverage::new(
            2,
            2,
            vec![vec![0.0, 1.0, 2.0, 3.0]],
            vec![],
            None,
            ViewType::Packed,
            envelope(),
        )
        .unwrap();
        assert_eq!(coverage.sample(0, 1, 1), Some(3.0));
        assert_eq!(coverage.sample(0, 2, 0), None);
        assert_eq!(coverage.sample(1, 0, 0), None);
    }
}
