//! Geometry kernel: geometries carrying an optional CRS tag.
//!
//! The CRS travels with the geometry as an explicit value. A geometry with
//! no tag is taken to already be in whatever CRS its consumer works in.

use geo::{BoundingRect, Buffer, Geometry};
use hazard_common::{BoundingBox, Crs, ReferencedEnvelope};
use projection::{find_transform, transform_geometry, ProjectionError};
use serde_json::{json, Value};

/// A geometry and the CRS its coordinates are expressed in, if known.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencedGeometry {
    geometry: Geometry<f64>,
    crs: Option<Crs>,
}

impl ReferencedGeometry {
    pub fn new(geometry: impl Into<Geometry<f64>>, crs: Option<Crs>) -> Self {
        Self {
            geometry: geometry.into(),
            crs,
        }
    }

    pub fn tagged(geometry: impl Into<Geometry<f64>>, crs: Crs) -> Self {
        Self::new(geometry, Some(crs))
    }

    pub fn untagged(geometry: impl Into<Geometry<f64>>) -> Self {
        Self::new(geometry, None)
    }

    pub fn geometry(&self) -> &Geometry<f64> {
        &self.geometry
    }

    pub fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    /// Replace the CRS tag. Coordinates are untouched.
    pub fn with_crs(self, crs: Option<Crs>) -> Self {
        Self {
            geometry: self.geometry,
            crs,
        }
    }

    pub fn into_parts(self) -> (Geometry<f64>, Option<Crs>) {
        (self.geometry, self.crs)
    }

    /// Planar buffer by `distance` in the geometry's own units.
    ///
    /// A zero distance returns the input geometry. Negative distances shrink
    /// polygons and may produce an empty geometry. The CRS tag is kept.
    pub fn buffer(&self, distance: f64) -> Self {
        let geometry = if distance == 0.0 {
            self.geometry.clone()
        } else {
            Geometry::MultiPolygon(self.geometry.buffer(distance))
        };
        Self {
            geometry,
            crs: self.crs.clone(),
        }
    }

    /// 2-D envelope; empty for an empty geometry.
    pub fn envelope(&self) -> BoundingBox {
        self.geometry
            .bounding_rect()
            .map(|rect| BoundingBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y))
            .unwrap_or_else(BoundingBox::empty)
    }

    /// Envelope tagged with this geometry's CRS, or `fallback` when untagged.
    pub fn referenced_envelope(&self, fallback: &Crs) -> ReferencedEnvelope {
        let crs = self.crs.clone().unwrap_or_else(|| fallback.clone());
        ReferencedEnvelope::new(self.envelope(), crs)
    }

    /// Express this geometry in `target`.
    ///
    /// Untagged geometries are assumed to be in `target` already and are only
    /// re-tagged.
    pub fn to_crs(&self, target: &Crs, lenient: bool) -> Result<Self, ProjectionError> {
        let geometry = match &self.crs {
            Some(source) => {
                let transform = find_transform(source, target, lenient)?;
                transform_geometry(&transform, &self.geometry)?
            }
            None => self.geometry.clone(),
        };
        Ok(Self::tagged(geometry, target.clone()))
    }

    /// GeoJSON geometry object with a `crs` member naming the tag.
    pub fn to_geojson(&self) -> Value {
        let mut value = geometry_to_geojson(&self.geometry);
        if let (Some(crs), Value::Object(map)) = (&self.crs, &mut value) {
            map.insert(
                "crs".to_string(),
                json!({ "type": "name", "properties": { "name": crs.name() } }),
            );
        }
        value
    }
}

fn line_coords(line: &geo::LineString<f64>) -> Value {
    Value::Array(line.coords().map(|c| json!([c.x, c.y])).collect())
}

fn polygon_coords(polygon: &geo::Polygon<f64>) -> Value {
    let mut rings = vec![line_coords(polygon.exterior())];
    rings.extend(polygon.interiors().iter().map(line_coords));
    Value::Array(rings)
}

fn geometry_to_geojson(geometry: &Geometry<f64>) -> Value {
    match geometry {
        Geometry::Point(p) => json!({ "type": "Point", "coordinates": [p.x(), p.y()] }),
        Geometry::Line(l) => json!({
            "type": "LineString",
            "coordinates": [[l.start.x, l.start.y], [l.end.x, l.end.y]],
        }),
        Geometry::LineString(ls) => json!({ "type": "LineString", "coordinates": line_coords(ls) }),
        Geometry::Polygon(p) => json!({ "type": "Polygon", "coordinates": polygon_coords(p) }),
        Geometry::MultiPoint(mp) => json!({
            "type": "MultiPoint",
            "coordinates": mp.iter().map(|p| json!([p.x(), p.y()])).collect::<Vec<_>>(),
        }),
        Geometry::MultiLineString(mls) => json!({
            "type": "MultiLineString",
            "coordinates": mls.iter().map(line_coords).collect::<Vec<_>>(),
        }),
        Geometry::MultiPolygon(mp) => json!({
            "type": "MultiPolygon",
            "coordinates": mp.iter().map(polygon_coords).collect::<Vec<_>>(),
        }),
        Geometry::GeometryCollection(gc) => json!({
            "type": "GeometryCollection",
            "geometries": gc.iter().map(geometry_to_geojson).collect::<Vec<_>>(),
        }),
        Geometry::Rect(r) => geometry_to_geojson(&Geometry::Polygon(r.to_polygon())),
        Geometry::Triangle(t) => geometry_to_geojson(&Geometry::Polygon(t.to_polygon())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{point, polygon, Area, Contains, MultiPolygon};
    use std::f64::consts::PI;

    fn area(geometry: &Geometry<f64>) -> f64 {
        geometry.unsigned_area()
    }

    #[test]
    fn test_point_buffer_approximates_disk() {
        let roi = ReferencedGeometry::tagged(point!(x: 0.0, y: 0.0), Crs::wgs84());
        let buffered = roi.buffer(1.0);

        assert_eq!(buffered.crs(), Some(&Crs::wgs84()));
        let error = (area(buffered.geometry()) - PI).abs() / PI;
        assert!(error < 0.1, "disk area off by {:.3}%", error * 100.0);

        // Polygonal approximation of the unit circle
        let env = buffered.envelope();
        assert!(env.min_x > -1.05 && env.min_x < -0.9);
        assert!(env.max_y < 1.05 && env.max_y > 0.9);
    }

    #[test]
    fn test_buffer_contains_input() {
        let square = polygon![
            (x: 0.0, y: 0.0),
            (x: 4.0, y: 0.0),
            (x: 4.0, y: 4.0),
            (x: 0.0, y: 4.0),
        ];
        let roi = ReferencedGeometry::untagged(square.clone());
        let buffered = roi.buffer(0.5);

        match buffered.geometry() {
            Geometry::MultiPolygon(mp) => assert!(mp.contains(&square)),
            other => panic!("expected a multipolygon, got {:?}", other),
        }
        assert!(buffered.crs().is_none());
    }

    #[test]
    fn test_zero_buffer_is_identity() {
        let roi = ReferencedGeometry::tagged(point!(x: 3.0, y: 4.0), Crs::web_mercator());
        assert_eq!(roi.buffer(0.0), roi);
    }

    #[test]
    fn test_negative_buffer_can_empty_geometry() {
        let small = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
        ];
        let roi = ReferencedGeometry::tagged(small, Crs::wgs84());
        let shrunk = roi.buffer(-2.0);

        assert_eq!(shrunk.crs(), Some(&Crs::wgs84()));
        assert!(shrunk.envelope().is_empty());
        if let Geometry::MultiPolygon(mp) = shrunk.geometry() {
            assert_eq!(mp, &MultiPolygon::<f64>::new(vec![]));
        }
    }

    #[test]
    fn test_to_crs_reprojects_tagged_geometry() {
        let roi = ReferencedGeometry::tagged(point!(x: 10.0, y: 45.0), Crs::wgs84());
        let projected = roi.to_crs(&Crs::web_mercator(), true).unwrap();

        assert_eq!(projected.crs(), Some(&Crs::web_mercator()));
        let env = projected.envelope();
        assert!((env.min_x - 1113194.9079).abs() < 0.01);
    }

    #[test]
    fn test_to_crs_only_retags_untagged_geometry() {
        let roi = ReferencedGeometry::untagged(point!(x: 10.0, y: 45.0));
        let tagged = roi.to_crs(&Crs::web_mercator(), true).unwrap();
        assert_eq!(tagged.geometry(), roi.geometry());
        assert_eq!(tagged.crs(), Some(&Crs::web_mercator()));
    }

    #[test]
    fn test_geojson_carries_crs_name() {
        let roi = ReferencedGeometry::tagged(point!(x: 1.0, y: 2.0), Crs::wgs84());
        let value = roi.to_geojson();
        assert_eq!(value["type"], "Point");
        assert_eq!(value["coordinates"], json!([1.0, 2.0]));
        assert_eq!(value["crs"]["properties"]["name"], "EPSG:4326");
    }
}
