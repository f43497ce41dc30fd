//! Hazard statistics around a buffered region of interest.
//!
//! Given a point or polygon, a radius, a list of raster hazard layers and an
//! optional political boundary layer, the operator reports per-band
//! statistics of every raster under the buffered region and the political
//! features the region touches.
//!
//! # Architecture
//!
//! ```text
//! HazardInputs
//!      │
//!      ▼
//! HazardStatistics::execute
//!      │
//!      ├─► ReferencedGeometry::buffer(radius)
//!      │
//!      ├─► for each RasterReader
//!      │         │
//!      │         ├─► SubGridSelector::select (reproject envelope, clip, world → grid)
//!      │         │
//!      │         ├─► RasterReader::read(grid)
//!      │         │
//!      │         └─► statistics::compute(coverage.geophysics())
//!      │
//!      └─► political::intersect (Intersects filter, requested attributes)
//!               │
//!               ▼
//!          HazardReport { statistics, political, buffer }
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use geo::point;
//! use hazard_common::{BoundingBox, Crs};
//! use hazard_stats::{
//!     HazardInputs, HazardStatistics, MemoryRaster, NullProgressListener, ReferencedGeometry,
//! };
//!
//! let raster = MemoryRaster::builder(Crs::wgs84(), BoundingBox::new(-10.0, -10.0, 10.0, 10.0), 1, 1)
//!     .band(vec![5.0])
//!     .build()?;
//!
//! let inputs = HazardInputs::new()
//!     .geometry(ReferencedGeometry::tagged(point!(x: 0.0, y: 0.0), Crs::wgs84()))
//!     .radius(1.0)
//!     .datalayer(Arc::new(raster));
//!
//! let report = HazardStatistics::new().execute(&inputs, &NullProgressListener)?;
//! assert_eq!(report.statistics[0].as_ref().map(|s| s.mean[0]), Some(5.0));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod operator;
pub mod political;
pub mod progress;
pub mod raster;
pub mod selector;
pub mod statistics;
pub mod vector;

// Re-export commonly used types at crate root
pub use config::OperatorConfig;
pub use error::{HazardError, HazardErrorKind, OperatorError, Result, SourceError};
pub use geometry::ReferencedGeometry;
pub use operator::{HazardInputs, HazardReport, HazardStatistics};
pub use political::PoliticalRecord;
pub use progress::{CancelFlag, NullProgressListener, ProgressListener};
pub use raster::{
    Coverage, GeophysicalView, GridGeometry, GridRange, MemoryRaster, MemoryRasterBuilder,
    PixelAnchor, RasterReader, SampleDimension, ViewType,
};
pub use selector::SubGridSelector;
pub use statistics::{LayerStatistics, STAT_KEYS};
pub use vector::{
    AttributeDescriptor, AttributeType, AttributeValue, Feature, FeatureIterator, FeatureQuery,
    FeatureSchema, FeatureSource, Filter, GeometryDescriptor, MemoryFeatureSource,
};
