//! Vector feature source interface.

mod memory;

pub use memory::MemoryFeatureSource;

use hazard_common::Crs;
use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::geometry::ReferencedGeometry;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeType {
    Bool,
    Int,
    Float,
    String,
}

/// A non-geometry attribute of a feature type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDescriptor {
    pub name: String,
    pub binding: AttributeType,
}

impl AttributeDescriptor {
    pub fn new(name: impl Into<String>, binding: AttributeType) -> Self {
        Self {
            name: name.into(),
            binding,
        }
    }
}

/// The designated geometry attribute of a feature type.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryDescriptor {
    pub name: String,
    /// Native CRS of stored geometries.
    pub crs: Option<Crs>,
}

impl GeometryDescriptor {
    pub fn new(name: impl Into<String>, crs: Option<Crs>) -> Self {
        Self {
            name: name.into(),
            crs,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    pub type_name: String,
    pub attributes: Vec<AttributeDescriptor>,
    pub geometry: Option<GeometryDescriptor>,
}

impl FeatureSchema {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            attributes: Vec::new(),
            geometry: None,
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, binding: AttributeType) -> Self {
        self.attributes.push(AttributeDescriptor::new(name, binding));
        self
    }

    pub fn with_geometry(mut self, name: impl Into<String>, crs: Option<Crs>) -> Self {
        self.geometry = Some(GeometryDescriptor::new(name, crs));
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// A feature as returned by a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: String,
    pub geometry: Option<ReferencedGeometry>,
    /// Attribute values in schema order.
    pub properties: Vec<(String, AttributeValue)>,
}

impl Feature {
    pub fn new(id: impl Into<String>, geometry: Option<ReferencedGeometry>) -> Self {
        Self {
            id: id.into(),
            geometry,
            properties: Vec::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.properties.push((name.into(), value.into()));
        self
    }

    pub fn property(&self, name: &str) -> Option<&AttributeValue> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

/// Spatial predicate applied by a feature source.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Filter {
    /// Every feature.
    #[default]
    Include,
    /// Features whose `property` geometry intersects `geometry`.
    Intersects {
        property: String,
        geometry: ReferencedGeometry,
    },
}

/// Parameters of a feature query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureQuery {
    /// Attributes to return; `None` returns all.
    pub property_names: Option<Vec<String>>,
    pub filter: Filter,
    /// CRS the caller works in. Untagged filter geometries are taken to be
    /// in it, and sources without a native CRS assume their data is too.
    pub coordinate_system: Option<Crs>,
    /// CRS returned geometries are reprojected to.
    pub reproject_to: Option<Crs>,
}

impl FeatureQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.property_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn coordinate_system(mut self, crs: Option<Crs>) -> Self {
        self.coordinate_system = crs;
        self
    }

    pub fn reproject_to(mut self, crs: Option<Crs>) -> Self {
        self.reproject_to = crs;
        self
    }
}

/// Iterator over query results.
///
/// Holds resources on the source until [`FeatureIterator::close`] is called.
/// Callers must close it on every exit path.
pub trait FeatureIterator: Iterator<Item = Result<Feature, SourceError>> {
    fn close(&mut self);
}

/// A queryable collection of features.
pub trait FeatureSource: Send + Sync {
    fn name(&self) -> &str;

    fn schema(&self) -> &FeatureSchema;

    fn features(&self, query: &FeatureQuery) -> Result<Box<dyn FeatureIterator + '_>, SourceError>;
}
