//! Well-known binary bridge to the external geometry library.
//!
//! Geometry payloads are opaque WKB handled by the `wkb` crate; decoded
//! values are `geo_types::Geometry<f64>`. Decoding applies a point
//! finiteness filter: a payload carrying a NaN or infinite coordinate is
//! rejected here rather than surfacing later as unindexable bounds.

use geo_traits::to_geo::ToGeoGeometry;
use geo_types::{Coord, Geometry, LineString, Polygon};
use wkb::reader::read_wkb;

use crate::errors::{ErrorKind, GeoPackageError, GeoPackageResult};

/// Decodes a WKB payload into a geometry, rejecting non-finite coordinates.
pub fn read_geometry(bytes: &[u8]) -> GeoPackageResult<Geometry<f64>> {
    let wkb = read_wkb(bytes).map_err(|e| {
        GeoPackageError::new(
            &format!("Failed to read WKB geometry: {}", e),
            ErrorKind::MalformedGeometry,
        )
    })?;
    let geometry = wkb.try_to_geometry().ok_or_else(|| {
        GeoPackageError::new(
            "WKB geometry type is not supported",
            ErrorKind::MalformedGeometry,
        )
    })?;
    ensure_finite(&geometry)?;
    Ok(geometry)
}

/// Encodes a geometry into a WKB payload.
pub fn write_geometry(geometry: &Geometry<f64>) -> GeoPackageResult<Vec<u8>> {
    let mut buf = Vec::new();
    wkb::writer::write_geometry(&mut buf, geometry, Default::default()).map_err(|e| {
        GeoPackageError::new(
            &format!("Failed to write WKB geometry: {}", e),
            ErrorKind::EncodingError,
        )
    })?;
    Ok(buf)
}

/// The point finiteness filter: every coordinate of the geometry must be a
/// finite double.
pub fn ensure_finite(geometry: &Geometry<f64>) -> GeoPackageResult<()> {
    if geometry_is_finite(geometry) {
        Ok(())
    } else {
        Err(GeoPackageError::new(
            "Geometry contains a non-finite coordinate",
            ErrorKind::MalformedGeometry,
        ))
    }
}

fn coord_is_finite(coord: &Coord<f64>) -> bool {
    coord.x.is_finite() && coord.y.is_finite()
}

fn line_string_is_finite(line_string: &LineString<f64>) -> bool {
    line_string.coords().all(coord_is_finite)
}

fn polygon_is_finite(polygon: &Polygon<f64>) -> bool {
    line_string_is_finite(polygon.exterior())
        && polygon.interiors().iter().all(line_string_is_finite)
}

fn geometry_is_finite(geometry: &Geometry<f64>) -> bool {
    match geometry {
        Geometry::Point(point) => coord_is_finite(&point.0),
        Geometry::Line(line) => coord_is_finite(&line.start) && coord_is_finite(&line.end),
        Geometry::LineString(line_string) => line_string_is_finite(line_string),
        Geometry::Polygon(polygon) => polygon_is_finite(polygon),
        Geometry::MultiPoint(points) => points.iter().all(|p| coord_is_finite(&p.0)),
        Geometry::MultiLineString(line_strings) => {
            line_strings.iter().all(line_string_is_finite)
        }
        Geometry::MultiPolygon(polygons) => polygons.iter().all(polygon_is_finite),
        Geometry::GeometryCollection(collection) => collection.iter().all(geometry_is_finite),
        Geometry::Rect(rect) => coord_is_finite(&rect.min()) && coord_is_finite(&rect.max()),
        Geometry::Triangle(triangle) => triangle.to_array().iter().all(coord_is_finite),
    }
}
