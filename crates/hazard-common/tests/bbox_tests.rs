//! Tests for BoundingBox and ReferencedEnvelope operations.

use hazard_common::{BoundingBox, Crs, ReferencedEnvelope};

// ============================================================================
// Constructor tests
// ============================================================================

#[test]
fn test_bbox_new() {
    let bbox = BoundingBox::new(-180.0, -90.0, 180.0, 90.0);
    assert_eq!(bbox.min_x, -180.0);
    assert_eq!(bbox.min_y, -90.0);
    assert_eq!(bbox.max_x, 180.0);
    assert_eq!(bbox.max_y, 90.0);
}

#[test]
fn test_bbox_default_is_empty() {
    assert!(BoundingBox::default().is_empty());
}

// ============================================================================
// Dimension tests
// ============================================================================

#[test]
fn test_bbox_width_crossing_zero() {
    let bbox = BoundingBox::new(-10.0, -5.0, 10.0, 5.0);
    assert_eq!(bbox.width(), 20.0);
    assert_eq!(bbox.height(), 10.0);
}

#[test]
fn test_bbox_zero_dimensions_is_empty() {
    let bbox = BoundingBox::new(5.0, 5.0, 5.0, 5.0);
    assert_eq!(bbox.width(), 0.0);
    assert_eq!(bbox.height(), 0.0);
    assert!(bbox.is_empty());
}

#[test]
fn test_bbox_inverted_is_empty() {
    let bbox = BoundingBox::new(10.0, 10.0, 5.0, 5.0);
    assert!(bbox.is_empty());
}

// ============================================================================
// Intersection tests
// ============================================================================

#[test]
fn test_bbox_intersects_contains() {
    let outer = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
    let inner = BoundingBox::new(25.0, 25.0, 75.0, 75.0);
    assert!(outer.intersects(&inner));
    assert!(inner.intersects(&outer));
    assert_eq!(outer.intersection(&inner), Some(inner));
}

#[test]
fn test_bbox_intersects_adjacent_edge() {
    let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    let b = BoundingBox::new(10.0, 0.0, 20.0, 10.0);
    // Sharing an edge has no area
    assert!(!a.intersects(&b));
    assert!(a.intersection(&b).is_none());
}

#[test]
fn test_bbox_intersection_with_self() {
    let bbox = BoundingBox::new(-5.0, -5.0, 5.0, 5.0);
    assert_eq!(bbox.intersection(&bbox), Some(bbox));
}

#[test]
fn test_bbox_intersection_disjoint() {
    let a = BoundingBox::new(-1.0, -1.0, 1.0, 1.0);
    let b = BoundingBox::new(100.0, 100.0, 101.0, 101.0);
    assert!(a.intersection(&b).is_none());
}

#[test]
fn test_bbox_intersection_with_empty() {
    let a = BoundingBox::new(-1.0, -1.0, 1.0, 1.0);
    assert!(a.intersection(&BoundingBox::empty()).is_none());
}

#[test]
fn test_bbox_intersection_is_within_both() {
    let a = BoundingBox::new(-3.0, -1.0, 2.0, 4.0);
    let b = BoundingBox::new(0.5, -2.0, 7.0, 1.5);
    let overlap = a.intersection(&b).unwrap();
    assert!(a.contains(&overlap));
    assert!(b.contains(&overlap));
}

// ============================================================================
// Containment tests
// ============================================================================

#[test]
fn test_bbox_contains_point_on_edge() {
    let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    assert!(bbox.contains_point(0.0, 5.0));
    assert!(bbox.contains_point(10.0, 10.0));
    assert!(!bbox.contains_point(10.0001, 5.0));
}

#[test]
fn test_bbox_corners_order() {
    let bbox = BoundingBox::new(0.0, 1.0, 2.0, 3.0);
    assert_eq!(
        bbox.corners(),
        [(0.0, 1.0), (2.0, 1.0), (2.0, 3.0), (0.0, 3.0)]
    );
}

// ============================================================================
// Referenced envelope tests
// ============================================================================

#[test]
fn test_referenced_envelope_restamp_keeps_coordinates() {
    let env = ReferencedEnvelope::new(BoundingBox::new(0.0, 0.0, 1.0, 1.0), Crs::wgs84());
    let restamped = env.clone().with_crs(Crs::web_mercator());
    assert_eq!(restamped.bbox, env.bbox);
    assert_eq!(restamped.crs, Crs::web_mercator());
}

#[test]
fn test_referenced_envelope_crs_name() {
    let env = ReferencedEnvelope::new(BoundingBox::new(0.0, 0.0, 1.0, 1.0), Crs::wgs84());
    assert!(!env.is_empty());
    let crs = env.crs.clone();
    assert_eq!(crs.name(), "EPSG:4326");
}
