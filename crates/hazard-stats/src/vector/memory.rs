//! In-memory feature source.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use geo::{Geometry, Intersects};
use hazard_common::Crs;
use projection::{find_transform, transform_geometry, MathTransform};

use super::{Feature, FeatureIterator, FeatureQuery, FeatureSchema, FeatureSource, Filter};
use crate::error::SourceError;
use crate::geometry::ReferencedGeometry;

/// Features held in memory, with geometries in the schema's native CRS.
///
/// A query's `coordinate_system` stands in for the native CRS only when the
/// schema declares none.
///
/// Tracks how many iterators are open so callers can check that every
/// query was closed.
#[derive(Debug)]
pub struct MemoryFeatureSource {
    name: String,
    schema: FeatureSchema,
    features: Vec<Feature>,
    open_iterators: Arc<AtomicUsize>,
    lenient: bool,
}

impl MemoryFeatureSource {
    pub fn new(name: impl Into<String>, schema: FeatureSchema) -> Self {
        Self {
            name: name.into(),
            schema,
            features: Vec::new(),
            open_iterators: Arc::new(AtomicUsize::new(0)),
            lenient: true,
        }
    }

    /// Refuse datum changes when reprojecting.
    pub fn strict(mut self) -> Self {
        self.lenient = false;
        self
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.push(feature);
        self
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    /// Iterators returned by [`FeatureSource::features`] not yet closed.
    pub fn open_iterators(&self) -> usize {
        self.open_iterators.load(Ordering::SeqCst)
    }

    fn native_crs(&self) -> Option<&Crs> {
        self.schema.geometry.as_ref().and_then(|g| g.crs.as_ref())
    }
}

impl FeatureSource for MemoryFeatureSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    fn features(&self, query: &FeatureQuery) -> Result<Box<dyn FeatureIterator + '_>, SourceError> {
        // Stored geometries keep their native CRS when the schema declares one
        let data_crs = self
            .native_crs()
            .cloned()
            .or_else(|| query.coordinate_system.clone());

        // Filter geometry expressed in the data CRS
        let filter = match &query.filter {
            Filter::Include => None,
            Filter::Intersects { geometry, .. } => {
                let geometry = match (geometry.crs(), &query.coordinate_system) {
                    (None, Some(crs)) => geometry.clone().with_crs(Some(crs.clone())),
                    _ => geometry.clone(),
                };
                Some(match &data_crs {
                    Some(crs) => geometry.to_crs(crs, self.lenient)?.into_parts().0,
                    None => geometry.into_parts().0,
                })
            }
        };

        let output_crs = query.reproject_to.clone().or_else(|| data_crs.clone());
        let reproject = match (&data_crs, &query.reproject_to) {
            (Some(from), Some(to)) => find_transform(from, to, self.lenient)?,
            _ => MathTransform::Identity,
        };

        tracing::debug!(
            source = %self.name,
            data_crs = data_crs.as_ref().map(Crs::name).unwrap_or("none"),
            output_crs = output_crs.as_ref().map(Crs::name).unwrap_or("none"),
            "Opening feature iterator"
        );

        self.open_iterators.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryFeatureIterator {
            features: self.features.iter(),
            property_names: query.property_names.clone(),
            filter,
            reproject,
            output_crs,
            open_iterators: Arc::clone(&self.open_iterators),
            closed: false,
        }))
    }
}

struct MemoryFeatureIterator<'a> {
    features: std::slice::Iter<'a, Feature>,
    property_names: Option<Vec<String>>,
    filter: Option<Geometry<f64>>,
    reproject: MathTransform,
    output_crs: Option<Crs>,
    open_iterators: Arc<AtomicUsize>,
    closed: bool,
}

impl MemoryFeatureIterator<'_> {
    fn project(&self, feature: &Feature) -> Result<Feature, SourceError> {
        let geometry = match &feature.geometry {
            Some(g) => Some(ReferencedGeometry::new(
                transform_geometry(&self.reproject, g.geometry())?,
                self.output_crs.clone(),
            )),
            None => None,
        };

        let properties = match &self.property_names {
            Some(names) => feature
                .properties
                .iter()
                .filter(|(key, _)| names.iter().any(|n| n == key))
                .cloned()
                .collect(),
            None => feature.properties.clone(),
        };

        Ok(Feature {
            id: feature.id.clone(),
            geometry,
            properties,
        })
    }
}

impl Iterator for MemoryFeatureIterator<'_> {
    type Item = Result<Feature, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.closed {
            return None;
        }
        loop {
            let feature = self.features.next()?;
            if let Some(filter) = &self.filter {
                let hit = feature
                    .geometry
                    .as_ref()
                    .map_or(false, |g| g.geometry().intersects(filter));
                if !hit {
                    continue;
                }
            }
            return Some(self.project(feature));
        }
    }
}

impl FeatureIterator for MemoryFeatureIterator<'_> {
    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.open_iterators.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::{AttributeType, AttributeValue};
    use geo::{point, polygon};

    fn square(min: f64, max: f64) -> geo::Polygon<f64> {
        polygon![
            (x: min, y: min),
            (x: max, y: min),
            (x: max, y: max),
            (x: min, y: max),
        ]
    }

    fn source() -> MemoryFeatureSource {
        let schema = FeatureSchema::new("regions")
            .with_attribute("name", AttributeType::String)
            .with_attribute("pop", AttributeType::Int)
            .with_geometry("the_geom", Some(Crs::wgs84()));
        MemoryFeatureSource::new("regions", schema)
            .with_feature(
                Feature::new("r.1", Some(ReferencedGeometry::untagged(square(-1.0, 1.0))))
                    .with_property("name", "A")
                    .with_property("pop", 100i64),
            )
            .with_feature(
                Feature::new("r.2", Some(ReferencedGeometry::untagged(square(50.0, 51.0))))
                    .with_property("name", "B")
                    .with_property("pop", 5i64),
            )
    }

    fn collect<I: FeatureIterator + ?Sized>(iter: &mut I) -> Vec<Feature> {
        iter.collect::<Result<Vec<_>, _>>().unwrap()
    }

    #[test]
    fn test_include_returns_everything() {
        let source = source();
        let mut iter = source.features(&FeatureQuery::new()).unwrap();
        assert_eq!(source.open_iterators(), 1);

        let features = collect(iter.as_mut());
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].geometry.as_ref().unwrap().crs(), Some(&Crs::wgs84()));

        iter.close();
        iter.close();
        assert_eq!(source.open_iterators(), 0);
    }

    #[test]
    fn test_intersects_filter_and_projection() {
        let source = source();
        let query = FeatureQuery::new().property_names(["pop"]).filter(Filter::Intersects {
            property: "the_geom".into(),
            geometry: ReferencedGeometry::tagged(point!(x: 0.5, y: 0.5), Crs::wgs84()),
        });
        let mut iter = source.features(&query).unwrap();
        let features = collect(iter.as_mut());
        iter.close();

        assert_eq!(features.len(), 1);
        assert_eq!(features[0].id, "r.1");
        assert_eq!(
            features[0].properties,
            vec![("pop".to_string(), AttributeValue::Int(100))]
        );
    }

    #[test]
    fn test_filter_geometry_reprojected_to_data_crs() {
        let source = source();
        // (0.5, 0.5) degrees in Web Mercator metres
        let query = FeatureQuery::new().filter(Filter::Intersects {
            property: "the_geom".into(),
            geometry: ReferencedGeometry::tagged(point!(x: 55659.745, y: 55660.406), Crs::web_mercator()),
        });
        let mut iter = source.features(&query).unwrap();
        let features = collect(iter.as_mut());
        iter.close();

        assert_eq!(features.len(), 1);
        assert_eq!(features[0].property("name"), Some(&AttributeValue::from("A")));
    }

    #[test]
    fn test_reproject_to_output_crs() {
        let source = source();
        let query = FeatureQuery::new()
            .coordinate_system(Some(Crs::wgs84()))
            .reproject_to(Some(Crs::web_mercator()));
        let mut iter = source.features(&query).unwrap();
        let features = collect(iter.as_mut());
        iter.close();

        let geometry = features[0].geometry.as_ref().unwrap();
        assert_eq!(geometry.crs(), Some(&Crs::web_mercator()));
        let env = geometry.envelope();
        assert!((env.max_x - 111319.49).abs() < 0.01);
    }

    #[test]
    fn test_native_crs_wins_over_query_crs() {
        let schema = FeatureSchema::new("metric").with_geometry("geom", Some(Crs::web_mercator()));
        let source = MemoryFeatureSource::new("metric", schema)
            .with_feature(Feature::new(
                "near",
                Some(ReferencedGeometry::untagged(square(-200_000.0, 200_000.0))),
            ))
            .with_feature(Feature::new(
                "far",
                Some(ReferencedGeometry::untagged(square(5_000_000.0, 5_100_000.0))),
            ));
        let query = FeatureQuery::new()
            .filter(Filter::Intersects {
                property: "geom".into(),
                geometry: ReferencedGeometry::untagged(point!(x: 1.0, y: 1.0)),
            })
            .coordinate_system(Some(Crs::wgs84()))
            .reproject_to(Some(Crs::wgs84()));
        let mut iter = source.features(&query).unwrap();
        let features = collect(iter.as_mut());
        iter.close();

        assert_eq!(features.len(), 1);
        assert_eq!(features[0].id, "near");
        let env = features[0].geometry.as_ref().unwrap().envelope();
        assert!(env.max_x > 1.7 && env.max_x < 1.9);
    }

    #[test]
    fn test_strict_source_rejects_datum_change() {
        let source = source().strict();
        let query = FeatureQuery::new().reproject_to(Some(Crs::nad83()));
        assert!(matches!(
            source.features(&query),
            Err(SourceError::Transform(_))
        ));
        assert_eq!(source.open_iterators(), 0);
    }
}
