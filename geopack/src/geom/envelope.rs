use geo::BoundingRect;
use geo_types::Geometry;

use crate::bounding_box::BoundingBox;
use crate::errors::{ErrorKind, GeoPackageError, GeoPackageResult};

/// An axis-aligned geometry envelope over X/Y with optional Z and M ranges.
///
/// Envelopes are produced while decoding a geometry blob header, attached to
/// a blob before encoding, and stored per feature by the geometry index. The
/// envelope indicator code in the blob's flags byte records which ranges are
/// present:
///
/// | Indicator | Ranges | Header doubles |
/// |---|---|---|
/// | 0 | none | 0 |
/// | 1 | X/Y | 4 |
/// | 2 | X/Y/Z | 6 |
/// | 3 | X/Y/M | 6 |
/// | 4 | X/Y/Z/M | 8 |
#[derive(Clone, Default, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct GeometryEnvelope {
    /// Minimum X
    pub min_x: f64,
    /// Maximum X
    pub max_x: f64,
    /// Minimum Y
    pub min_y: f64,
    /// Maximum Y
    pub max_y: f64,
    /// Minimum Z, when the envelope carries a Z range
    pub min_z: Option<f64>,
    /// Maximum Z, when the envelope carries a Z range
    pub max_z: Option<f64>,
    /// Minimum M, when the envelope carries an M range
    pub min_m: Option<f64>,
    /// Maximum M, when the envelope carries an M range
    pub max_m: Option<f64>,
}

impl GeometryEnvelope {
    /// Creates an XY envelope.
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> GeometryEnvelope {
        GeometryEnvelope {
            min_x,
            max_x,
            min_y,
            max_y,
            ..Default::default()
        }
    }

    /// Computes the XY envelope of a geometry, `None` for an empty geometry.
    pub fn from_geometry(geometry: &Geometry<f64>) -> Option<GeometryEnvelope> {
        let rect = geometry.bounding_rect()?;
        Some(GeometryEnvelope::new(
            rect.min().x,
            rect.max().x,
            rect.min().y,
            rect.max().y,
        ))
    }

    /// True when the envelope carries a Z range.
    pub fn has_z(&self) -> bool {
        self.min_z.is_some() && self.max_z.is_some()
    }

    /// True when the envelope carries an M range.
    pub fn has_m(&self) -> bool {
        self.min_m.is_some() && self.max_m.is_some()
    }

    /// The envelope indicator code written into a geometry blob's flags
    /// byte: 1 for XY, 2 for XYZ, 3 for XYM, 4 for XYZM.
    pub fn indicator(&self) -> u8 {
        match (self.has_z(), self.has_m()) {
            (false, false) => 1,
            (true, false) => 2,
            (false, true) => 3,
            (true, true) => 4,
        }
    }

    /// The number of header bytes an envelope with the given indicator
    /// occupies. Indicator 0 means no envelope.
    pub fn byte_len_for_indicator(indicator: u8) -> GeoPackageResult<usize> {
        match indicator {
            0 => Ok(0),
            1 => Ok(32),
            2 | 3 => Ok(48),
            4 => Ok(64),
            _ => Err(GeoPackageError::new(
                &format!("Unsupported envelope indicator: {}", indicator),
                ErrorKind::MalformedGeometry,
            )),
        }
    }

    /// The 2D bounding box of this envelope.
    pub fn to_bounding_box(&self) -> BoundingBox {
        BoundingBox::from_envelope(self)
    }

    /// True when every present bound is finite and each range is ordered
    /// `min <= max`. Only such envelopes are indexable.
    pub fn is_valid(&self) -> bool {
        let xy_finite = self.min_x.is_finite()
            && self.max_x.is_finite()
            && self.min_y.is_finite()
            && self.max_y.is_finite();
        let xy_ordered = self.min_x <= self.max_x && self.min_y <= self.max_y;
        let z_ok = match (self.min_z, self.max_z) {
            (Some(min), Some(max)) => min.is_finite() && max.is_finite() && min <= max,
            (None, None) => true,
            _ => false,
        };
        let m_ok = match (self.min_m, self.max_m) {
            (Some(min), Some(max)) => min.is_finite() && max.is_finite() && min <= max,
            (None, None) => true,
            _ => false,
        };
        xy_finite && xy_ordered && z_ok && m_ok
    }

    /// Checks if this envelope intersects another on the X/Y ranges.
    pub fn intersects(&self, other: &GeometryEnvelope) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }
}
