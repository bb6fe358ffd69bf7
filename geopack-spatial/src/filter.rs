//! The bounds predicate evaluated against geometry index rows.

use geopack::{BoundingBox, GeometryEnvelope};

use crate::entities::GeometryIndexEntry;

/// Default query tolerance, absorbing floating point round trip error from
/// reprojection and encoding.
pub const DEFAULT_TOLERANCE: f64 = 1e-14;

/// A range query over stored envelope bounds.
///
/// Per enabled axis the predicate is
/// `stored_min <= query_max + tolerance && stored_max >= query_min - tolerance`,
/// for X and Y always and for Z and M when the query envelope carries them.
/// A row that has no stored Z (or M) bound does not match a query that
/// constrains Z (or M), matching SQL comparison semantics for NULL columns
/// so a SQL-backed store and the in-memory store agree.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundsQuery {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
    z: Option<(f64, f64)>,
    m: Option<(f64, f64)>,
    tolerance: f64,
}

impl BoundsQuery {
    /// Builds the predicate for a query envelope.
    pub fn from_envelope(envelope: &GeometryEnvelope, tolerance: f64) -> Self {
        let z = match (envelope.min_z, envelope.max_z) {
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        };
        let m = match (envelope.min_m, envelope.max_m) {
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        };
        BoundsQuery {
            min_x: envelope.min_x,
            max_x: envelope.max_x,
            min_y: envelope.min_y,
            max_y: envelope.max_y,
            z,
            m,
            tolerance,
        }
    }

    /// Builds the predicate for a 2D query bounding box.
    pub fn from_bounding_box(bounding_box: &BoundingBox, tolerance: f64) -> Self {
        Self::from_envelope(&bounding_box.to_envelope(), tolerance)
    }

    /// The tolerance this predicate was built with.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Evaluates the predicate against a stored index row.
    pub fn matches(&self, entry: &GeometryIndexEntry) -> bool {
        let t = self.tolerance;

        let x = entry.min_x <= self.max_x + t && entry.max_x >= self.min_x - t;
        let y = entry.min_y <= self.max_y + t && entry.max_y >= self.min_y - t;
        if !(x && y) {
            return false;
        }

        if let Some((query_min, query_max)) = self.z {
            match (entry.min_z, entry.max_z) {
                (Some(min_z), Some(max_z)) => {
                    if !(min_z <= query_max + t && max_z >= query_min - t) {
                        return false;
                    }
                }
                _ => return false,
            }
        }

        if let Some((query_min, query_max)) = self.m {
            match (entry.min_m, entry.max_m) {
                (Some(min_m), Some(max_m)) => {
                    if !(min_m <= query_max + t && max_m >= query_min - t) {
                        return false;
                    }
                }
                _ => return false,
            }
        }

        true
    }
}
