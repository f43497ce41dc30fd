//! Intersection of the buffered region with a political boundary layer.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{HazardError, Result};
use crate::geometry::ReferencedGeometry;
use crate::progress::ProgressListener;
use crate::vector::{AttributeValue, FeatureIterator, FeatureQuery, FeatureSource, Filter};

/// Requested attributes of one intersecting feature, in request order.
///
/// Serializes as a map. Attributes the feature lacks serialize as `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct PoliticalRecord {
    entries: Vec<(String, Option<AttributeValue>)>,
}

impl PoliticalRecord {
    pub fn entries(&self) -> &[(String, Option<AttributeValue>)] {
        &self.entries
    }

    /// Value of `name`; `None` when unresolved or not requested.
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .and_then(|(_, value)| value.as_ref())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }
}

impl Serialize for PoliticalRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Closes the wrapped iterator when dropped.
struct CloseGuard<'a> {
    iter: Box<dyn FeatureIterator + 'a>,
}

impl Drop for CloseGuard<'_> {
    fn drop(&mut self) {
        self.iter.close();
    }
}

/// Features of `source` intersecting `buffer`, projected onto `attributes`.
///
/// The query runs in the buffer's CRS, or in the layer's native CRS when
/// the buffer is untagged. Cancellation is polled before each feature when
/// `check_cancel` is set.
pub fn intersect(
    source: &dyn FeatureSource,
    attributes: &[String],
    buffer: &ReferencedGeometry,
    progress: &dyn ProgressListener,
    check_cancel: bool,
) -> Result<Vec<PoliticalRecord>> {
    let schema = source.schema();
    let geometry_attr = schema.geometry.as_ref().ok_or_else(|| {
        HazardError::schema_error(format!(
            "feature type '{}' has no geometry attribute",
            schema.type_name
        ))
    })?;

    let request_crs = buffer.crs().or(geometry_attr.crs.as_ref()).cloned();
    let query = FeatureQuery::new()
        .property_names(attributes.iter().cloned())
        .filter(Filter::Intersects {
            property: geometry_attr.name.clone(),
            geometry: buffer.clone(),
        })
        .coordinate_system(request_crs.clone())
        .reproject_to(request_crs.clone());

    tracing::debug!(
        source = source.name(),
        geometry = %geometry_attr.name,
        crs = request_crs.as_ref().map(|c| c.name()).unwrap_or("none"),
        attributes = ?attributes,
        "Querying political layer"
    );

    let iter = source
        .features(&query)
        .map_err(|e| HazardError::from_source(format!("querying '{}' failed", source.name()), e))?;
    let mut guard = CloseGuard { iter };

    let mut records = Vec::new();
    loop {
        if check_cancel && progress.is_canceled() {
            return Err(HazardError::Cancelled);
        }
        let Some(next) = guard.iter.next() else {
            break;
        };
        let feature = next.map_err(|e| {
            HazardError::from_source(format!("reading feature from '{}' failed", source.name()), e)
        })?;

        let entries = attributes
            .iter()
            .map(|name| (name.clone(), feature.property(name).cloned()))
            .collect();
        records.push(PoliticalRecord { entries });
    }

    tracing::debug!(source = source.name(), matched = records.len(), "Political query done");
    Ok(records)
}
