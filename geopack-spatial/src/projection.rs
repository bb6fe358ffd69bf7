//! The projection transform seam.
//!
//! Reprojection mathematics belong to an external transform library; the
//! index only needs bounding boxes and envelopes moved between a foreign
//! coordinate system and the feature table's native one.

use geopack::{BoundingBox, GeoPackageResult, GeometryEnvelope};

/// Transforms boxes and envelopes between two coordinate systems.
///
/// A transform is directional: queries take a transform from the query's
/// projection into the feature table's native projection, and
/// `table_bounds` takes one from the native projection outward.
pub trait ProjectionTransform: Send + Sync {
    /// Transforms a 2D bounding box.
    fn transform_bounding_box(&self, bounding_box: &BoundingBox)
        -> GeoPackageResult<BoundingBox>;

    /// Transforms an envelope. The default transforms the X/Y ranges as a
    /// bounding box and leaves Z/M ranges unchanged.
    fn transform_envelope(
        &self,
        envelope: &GeometryEnvelope,
    ) -> GeoPackageResult<GeometryEnvelope> {
        let bounding_box = self.transform_bounding_box(&envelope.to_bounding_box())?;
        let mut transformed = bounding_box.to_envelope();
        transformed.min_z = envelope.min_z;
        transformed.max_z = envelope.max_z;
        transformed.min_m = envelope.min_m;
        transformed.max_m = envelope.max_m;
        Ok(transformed)
    }
}

/// The no-op transform for queries already in the table's projection.
pub struct IdentityTransform;

impl ProjectionTransform for IdentityTransform {
    fn transform_bounding_box(
        &self,
        bounding_box: &BoundingBox,
    ) -> GeoPackageResult<BoundingBox> {
        Ok(bounding_box.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ScaleTransform(f64);

    impl ProjectionTransform for ScaleTransform {
        fn transform_bounding_box(
            &self,
            bounding_box: &BoundingBox,
        ) -> GeoPackageResult<BoundingBox> {
            Ok(BoundingBox::new(
                bounding_box.min_x * self.0,
                bounding_box.min_y * self.0,
                bounding_box.max_x * self.0,
                bounding_box.max_y * self.0,
            ))
        }
    }

    #[test]
    fn test_identity() {
        let bbox = BoundingBox::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(IdentityTransform.transform_bounding_box(&bbox).unwrap(), bbox);
    }

    #[test]
    fn test_envelope_default_preserves_zm() {
        let mut envelope = GeometryEnvelope::new(1.0, 2.0, 3.0, 4.0);
        envelope.min_z = Some(-1.0);
        envelope.max_z = Some(1.0);

        let transformed = ScaleTransform(10.0).transform_envelope(&envelope).unwrap();
        assert_eq!(transformed.min_x, 10.0);
        assert_eq!(transformed.max_x, 20.0);
        assert_eq!(transformed.min_y, 30.0);
        assert_eq!(transformed.max_y, 40.0);
        assert_eq!(transformed.min_z, Some(-1.0));
        assert_eq!(transformed.max_z, Some(1.0));
    }
}
