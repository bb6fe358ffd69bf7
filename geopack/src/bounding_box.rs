use std::hash::Hash;

use crate::geom::envelope::GeometryEnvelope;

/// Half the width of the world in WGS84 longitude degrees.
pub const WGS84_HALF_WORLD_LON_WIDTH: f64 = 180.0;

/// Half the width of the world in Web Mercator projected meters.
pub const WEB_MERCATOR_HALF_WORLD_WIDTH: f64 = 20037508.342789244;

/// A 2D bounding box represented by minimum and maximum coordinates.
///
/// `BoundingBox` defines a rectangular area in 2D space using the minimum
/// (min_x, min_y) and maximum (max_x, max_y) corners, in longitude/latitude
/// degrees or projected units. It is the query and aggregation currency of
/// the feature table index.
///
/// A box that has been wrapped with [`BoundingBox::bound_coordinates`] may
/// carry `max_x < min_x`; that inverted ordering marks a box spanning the
/// antimeridian and is repaired by [`BoundingBox::expand_coordinates`].
///
/// Equality and hashing compare the IEEE-754 bit patterns of the four
/// bounds, so `-0.0 != 0.0` and two NaN payloads of the same bits are equal.
///
/// # Examples
///
/// ```rust,ignore
/// use geopack::BoundingBox;
///
/// let bbox = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
/// if bbox.contains_point(50.0, 50.0) {
///     println!("Point is inside the bounding box");
/// }
/// ```
#[derive(Clone, Default, Debug, serde::Deserialize, serde::Serialize)]
pub struct BoundingBox {
    /// Minimum X coordinate (longitude)
    pub min_x: f64,
    /// Minimum Y coordinate (latitude)
    pub min_y: f64,
    /// Maximum X coordinate (longitude)
    pub max_x: f64,
    /// Maximum Y coordinate (latitude)
    pub max_y: f64,
}

impl PartialEq for BoundingBox {
    fn eq(&self, other: &Self) -> bool {
        self.min_x.to_bits() == other.min_x.to_bits()
            && self.min_y.to_bits() == other.min_y.to_bits()
            && self.max_x.to_bits() == other.max_x.to_bits()
            && self.max_y.to_bits() == other.max_y.to_bits()
    }
}

impl Eq for BoundingBox {}

impl PartialOrd for BoundingBox {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BoundingBox {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.min_x
            .total_cmp(&other.min_x)
            .then(self.min_y.total_cmp(&other.min_y))
            .then(self.max_x.total_cmp(&other.max_x))
            .then(self.max_y.total_cmp(&other.max_y))
    }
}

impl Hash for BoundingBox {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.min_x.to_bits().hash(state);
        self.min_y.to_bits().hash(state);
        self.max_x.to_bits().hash(state);
        self.max_y.to_bits().hash(state);
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BoundingBox({}, {}, {}, {})",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

/// Distance between a finite double and its next representable neighbor away
/// from zero.
fn ulp(value: f64) -> f64 {
    let magnitude = value.abs();
    magnitude.next_up() - magnitude
}

impl BoundingBox {
    /// Creates a new bounding box with the specified coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> BoundingBox {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Creates a bounding box from the X/Y ranges of an envelope.
    pub fn from_envelope(envelope: &GeometryEnvelope) -> BoundingBox {
        BoundingBox::new(
            envelope.min_x,
            envelope.min_y,
            envelope.max_x,
            envelope.max_y,
        )
    }

    /// Converts this bounding box to an XY envelope.
    pub fn to_envelope(&self) -> GeometryEnvelope {
        GeometryEnvelope::new(self.min_x, self.max_x, self.min_y, self.max_y)
    }

    /// Returns the width of the bounding box.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounding box.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Returns the center point of the bounding box.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Checks if this bounding box is a point (zero width and height).
    pub fn is_point(&self) -> bool {
        self.min_x == self.max_x && self.min_y == self.max_y
    }

    /// Checks if this bounding box contains a point.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Checks if this bounding box contains another bounding box, inclusive
    /// on all four bounds.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    /// Returns the overlapping region of this bounding box with another, or
    /// `None` when the boxes do not strictly overlap on both axes.
    pub fn overlap(&self, other: &BoundingBox) -> Option<BoundingBox> {
        self.overlap_allow_empty(other, false)
    }

    /// Returns the overlapping region of this bounding box with another.
    ///
    /// When `allow_empty` is set, a shared edge or corner counts as an
    /// overlap and a zero-area box is returned for it.
    pub fn overlap_allow_empty(&self, other: &BoundingBox, allow_empty: bool) -> Option<BoundingBox> {
        let min_x = self.min_x.max(other.min_x);
        let max_x = self.max_x.min(other.max_x);
        let min_y = self.min_y.max(other.min_y);
        let max_y = self.max_y.min(other.max_y);

        let overlaps = (min_x < max_x && min_y < max_y)
            || (allow_empty && min_x <= max_x && min_y <= max_y);
        if overlaps {
            Some(BoundingBox::new(min_x, min_y, max_x, max_y))
        } else {
            None
        }
    }

    /// Checks if this bounding box strictly intersects another.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.overlap(other).is_some()
    }

    /// Checks if this bounding box intersects another, counting shared
    /// edges and corners.
    pub fn intersects_allow_empty(&self, other: &BoundingBox) -> bool {
        self.overlap_allow_empty(other, true).is_some()
    }

    /// Returns the union of this bounding box with another, or `None` when
    /// the combined box would be degenerate.
    pub fn union(&self, other: &BoundingBox) -> Option<BoundingBox> {
        let min_x = self.min_x.min(other.min_x);
        let max_x = self.max_x.max(other.max_x);
        let min_y = self.min_y.min(other.min_y);
        let max_y = self.max_y.max(other.max_y);

        if min_x < max_x && min_y < max_y {
            Some(BoundingBox::new(min_x, min_y, max_x, max_y))
        } else {
            None
        }
    }

    /// Returns the complementary bounding box on the opposite side of the
    /// antimeridian, or `None` when this box does not cross it.
    ///
    /// `max_projection_longitude` is the half-world width of the projection,
    /// e.g. 180 for WGS84 degrees.
    pub fn complementary(&self, max_projection_longitude: f64) -> Option<BoundingBox> {
        let mut adjust = None;
        if self.max_x > max_projection_longitude {
            if self.min_x >= -max_projection_longitude {
                adjust = Some(-2.0 * max_projection_longitude);
            }
        } else if self.min_x < -max_projection_longitude && self.max_x <= max_projection_longitude {
            adjust = Some(2.0 * max_projection_longitude);
        }

        adjust.map(|adjustment| {
            BoundingBox::new(
                self.min_x + adjustment,
                self.min_y,
                self.max_x + adjustment,
                self.max_y,
            )
        })
    }

    /// [`BoundingBox::complementary`] for WGS84 degree coordinates.
    pub fn complementary_wgs84(&self) -> Option<BoundingBox> {
        self.complementary(WGS84_HALF_WORLD_LON_WIDTH)
    }

    /// [`BoundingBox::complementary`] for Web Mercator meter coordinates.
    pub fn complementary_web_mercator(&self) -> Option<BoundingBox> {
        self.complementary(WEB_MERCATOR_HALF_WORLD_WIDTH)
    }

    /// Wraps each longitude bound independently into
    /// `[-max_projection_longitude, max_projection_longitude)`.
    ///
    /// The wrap can leave `max_x` numerically less than `min_x`; that is the
    /// signal of an antimeridian-spanning box, not an error, and
    /// [`BoundingBox::expand_coordinates`] is its inverse repair.
    pub fn bound_coordinates(&self, max_projection_longitude: f64) -> BoundingBox {
        let world_width = 2.0 * max_projection_longitude;
        let min_x =
            (self.min_x + max_projection_longitude).rem_euclid(world_width) - max_projection_longitude;
        let max_x =
            (self.max_x + max_projection_longitude).rem_euclid(world_width) - max_projection_longitude;
        BoundingBox::new(min_x, self.min_y, max_x, self.max_y)
    }

    /// [`BoundingBox::bound_coordinates`] for WGS84 degree coordinates.
    pub fn bound_wgs84_coordinates(&self) -> BoundingBox {
        self.bound_coordinates(WGS84_HALF_WORLD_LON_WIDTH)
    }

    /// [`BoundingBox::bound_coordinates`] for Web Mercator meter coordinates.
    pub fn bound_web_mercator_coordinates(&self) -> BoundingBox {
        self.bound_coordinates(WEB_MERCATOR_HALF_WORLD_WIDTH)
    }

    /// Restores conventional `min_x <= max_x` ordering on a wrapped,
    /// antimeridian-spanning box by growing `max_x` past the meridian in
    /// whole world widths.
    pub fn expand_coordinates(&self, max_projection_longitude: f64) -> BoundingBox {
        let mut expanded = self.clone();
        if expanded.min_x > expanded.max_x {
            let world_width = 2.0 * max_projection_longitude;
            let worlds = 1.0 + ((expanded.min_x - expanded.max_x) / world_width).floor();
            expanded.max_x += worlds * world_width;
        }
        expanded
    }

    /// [`BoundingBox::expand_coordinates`] for WGS84 degree coordinates.
    pub fn expand_wgs84_coordinates(&self) -> BoundingBox {
        self.expand_coordinates(WGS84_HALF_WORLD_LON_WIDTH)
    }

    /// [`BoundingBox::expand_coordinates`] for Web Mercator meter coordinates.
    pub fn expand_web_mercator_coordinates(&self) -> BoundingBox {
        self.expand_coordinates(WEB_MERCATOR_HALF_WORLD_WIDTH)
    }

    /// Expands the shorter axis of this bounding box into a square about its
    /// center.
    pub fn square_expand(&self) -> BoundingBox {
        self.square_expand_with_buffer(0.0)
    }

    /// Expands the shorter axis of this bounding box into a square about its
    /// center, then buffers all four sides.
    ///
    /// `buffer_percentage` is a fraction of the final square range on each
    /// side, computed as `((range / (1 - 2 * buffer)) - range) / 2`. A point
    /// box with a requested buffer is first nudged outward by one unit in
    /// the last place on each axis so the square has a nonzero range.
    pub fn square_expand_with_buffer(&self, buffer_percentage: f64) -> BoundingBox {
        let mut bbox = self.clone();

        if bbox.is_point() && buffer_percentage > 0.0 {
            let lon_expand = ulp(bbox.min_x);
            bbox.min_x -= lon_expand;
            bbox.max_x += lon_expand;
            let lat_expand = ulp(bbox.min_y);
            bbox.min_y -= lat_expand;
            bbox.max_y += lat_expand;
        }

        let lon_range = bbox.width();
        let lat_range = bbox.height();
        if lon_range < lat_range {
            let mid = (bbox.min_x + bbox.max_x) / 2.0;
            bbox.min_x = mid - lat_range / 2.0;
            bbox.max_x = mid + lat_range / 2.0;
        } else if lat_range < lon_range {
            let mid = (bbox.min_y + bbox.max_y) / 2.0;
            bbox.min_y = mid - lon_range / 2.0;
            bbox.max_y = mid + lon_range / 2.0;
        }

        let range = bbox.width().max(bbox.height()).max(f64::MIN_POSITIVE);
        let buffer = ((range / (1.0 - 2.0 * buffer_percentage)) - range) / 2.0;
        bbox.min_x -= buffer;
        bbox.max_x += buffer;
        bbox.min_y -= buffer;
        bbox.max_y += buffer;

        bbox
    }
}
